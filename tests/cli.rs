use std::fs;
use std::path::{Path, PathBuf};
use std::process::Output;

use assert_cmd::Command;
use tempfile::TempDir;

/// Temporary tree with a history listing and a few real directories.
struct Fixture {
    _temp_dir: TempDir,
    root: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("test expectation should hold");
        let root = fs::canonicalize(temp_dir.path()).expect("test expectation should hold");
        for dir in ["alpha", "beta", "hidden", "odd:name", "work/proj1/sub"] {
            fs::create_dir_all(root.join(dir)).expect("test expectation should hold");
        }

        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    fn path(&self, relative: &str) -> String {
        self.root.join(relative).to_string_lossy().to_string()
    }

    fn write_listing(&self, lines: &[String]) -> PathBuf {
        let listing = self.root.join("dirs.txt");
        fs::write(&listing, lines.join("\n")).expect("test expectation should hold");

        listing
    }

    fn command(&self, cwd: &Path) -> Command {
        let mut command = Command::cargo_bin("hcd").expect("test expectation should hold");
        command
            .current_dir(cwd)
            .env("HOME", "/nonexistent-home")
            .env_remove("HCD_HISTORY")
            .env_remove("HCD_PINNED")
            .env_remove("HCD_HIDDEN")
            .env_remove("HCD_WORKSPACES")
            .env_remove("HCD_LOG");

        command
    }
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_list_puts_pinned_first_and_skips_hidden_and_cwd() {
    // Arrange
    let fixture = Fixture::new();
    let listing = fixture.write_listing(&[
        format!("30 {}", fixture.path("alpha")),
        format!("20 {}", fixture.path("hidden")),
        format!("10 {}", fixture.path("work")),
    ]);

    // Act
    let output = fixture
        .command(&fixture.root.join("work"))
        .arg("--history")
        .arg(&listing)
        .arg("--pin")
        .arg(fixture.path("beta"))
        .arg("--hide")
        .arg(fixture.path("hidden"))
        .arg("--list")
        .output()
        .expect("test expectation should hold");

    // Assert
    assert!(output.status.success());
    assert_eq!(
        stdout_lines(&output),
        vec![
            format!("  * {}", fixture.path("beta")),
            format!(" 30 {}", fixture.path("alpha")),
        ]
    );
}

#[test]
fn test_list_applies_query() {
    // Arrange
    let fixture = Fixture::new();
    let listing = fixture.write_listing(&[
        format!("5 {}", fixture.path("alpha")),
        format!("4 {}", fixture.path("beta")),
    ]);

    // Act
    let output = fixture
        .command(&fixture.root)
        .arg("--history")
        .arg(&listing)
        .arg("--list")
        .arg("BET")
        .output()
        .expect("test expectation should hold");

    // Assert
    assert!(output.status.success());
    assert_eq!(
        stdout_lines(&output),
        vec![format!("  4 {}", fixture.path("beta"))]
    );
}

#[test]
fn test_pick_prints_selected_directory() {
    // Arrange
    let fixture = Fixture::new();
    let listing = fixture.write_listing(&[
        format!("5 {}", fixture.path("alpha")),
        format!("4 {}", fixture.path("beta")),
    ]);

    // Act
    let output = fixture
        .command(&fixture.root)
        .arg("--history")
        .arg(&listing)
        .args(["--pick", "1"])
        .output()
        .expect("test expectation should hold");

    // Assert
    assert!(output.status.success());
    assert_eq!(stdout_lines(&output), vec![fixture.path("beta")]);
}

#[test]
fn test_pick_expands_workspace_entry() {
    // Arrange
    let fixture = Fixture::new();
    let listing = fixture.write_listing(&[
        "9 proj/sub".to_string(),
        "8 proj2/sub".to_string(),
    ]);
    let workspace = format!("proj={}/[^/]+", regex::escape(&fixture.path("work")));

    // Act
    let output = fixture
        .command(&fixture.root.join("work/proj1"))
        .arg("--history")
        .arg(&listing)
        .arg("--workspace")
        .arg(&workspace)
        .args(["--pick", "0"])
        .output()
        .expect("test expectation should hold");

    // Assert
    assert!(output.status.success());
    assert_eq!(stdout_lines(&output), vec![fixture.path("work/proj1/sub")]);
}

#[test]
fn test_pick_missing_directory_reports_and_fails() {
    // Arrange
    let fixture = Fixture::new();
    let listing = fixture.write_listing(&[format!("5 {}", fixture.path("gone"))]);

    // Act
    let output = fixture
        .command(&fixture.root)
        .arg("--history")
        .arg(&listing)
        .args(["--pick", "0"])
        .output()
        .expect("test expectation should hold");

    // Assert
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("hcd: cd "));
}

#[test]
fn test_without_history_does_not_open() {
    // Arrange
    let fixture = Fixture::new();

    // Act
    let output = fixture
        .command(&fixture.root)
        .arg("--list")
        .output()
        .expect("test expectation should hold");

    // Assert
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no dir history store"));
}

#[test]
fn test_unreadable_history_falls_back_to_pinned() {
    // Arrange
    let fixture = Fixture::new();

    // Act
    let output = fixture
        .command(&fixture.root)
        .arg("--history")
        .arg(fixture.root.join("missing.txt"))
        .arg("--pin")
        .arg(fixture.path("alpha"))
        .arg("--list")
        .output()
        .expect("test expectation should hold");

    // Assert
    assert!(output.status.success());
    assert_eq!(
        stdout_lines(&output),
        vec![format!("  * {}", fixture.path("alpha"))]
    );
    assert!(String::from_utf8_lossy(&output.stderr).contains("hcd: db error: "));
}

#[test]
fn test_workspace_without_pattern_is_rejected() {
    // Arrange
    let fixture = Fixture::new();

    // Act
    let output = fixture
        .command(&fixture.root)
        .args(["--workspace", "proj", "--list"])
        .output()
        .expect("test expectation should hold");

    // Assert
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("KIND=PATTERN"));
}

#[test]
fn test_pin_keeps_colon_in_directory_name() {
    // Arrange
    let fixture = Fixture::new();
    let listing = fixture.write_listing(&[format!("5 {}", fixture.path("alpha"))]);

    // Act
    let output = fixture
        .command(&fixture.root)
        .arg("--history")
        .arg(&listing)
        .arg("--pin")
        .arg(fixture.path("odd:name"))
        .arg("--list")
        .output()
        .expect("test expectation should hold");

    // Assert
    assert!(output.status.success());
    assert_eq!(
        stdout_lines(&output),
        vec![
            format!("  * {}", fixture.path("odd:name")),
            format!("  5 {}", fixture.path("alpha")),
        ]
    );
}

#[test]
fn test_pinned_env_is_split_on_colon() {
    // Arrange
    let fixture = Fixture::new();
    let listing = fixture.write_listing(&[format!("5 {}", fixture.path("hidden"))]);

    // Act
    let output = fixture
        .command(&fixture.root)
        .env(
            "HCD_PINNED",
            format!("{}::{}:", fixture.path("alpha"), fixture.path("beta")),
        )
        .env("HCD_HIDDEN", fixture.path("hidden"))
        .arg("--history")
        .arg(&listing)
        .arg("--list")
        .output()
        .expect("test expectation should hold");

    // Assert
    assert!(output.status.success());
    assert_eq!(
        stdout_lines(&output),
        vec![
            format!("  * {}", fixture.path("alpha")),
            format!("  * {}", fixture.path("beta")),
        ]
    );
}

#[test]
fn test_empty_workspaces_env_still_opens() {
    // Arrange
    let fixture = Fixture::new();
    let listing = fixture.write_listing(&[format!("5 {}", fixture.path("alpha"))]);

    // Act
    let output = fixture
        .command(&fixture.root)
        .env("HCD_WORKSPACES", "")
        .arg("--history")
        .arg(&listing)
        .arg("--list")
        .output()
        .expect("test expectation should hold");

    // Assert
    assert!(output.status.success());
    assert_eq!(
        stdout_lines(&output),
        vec![format!("  5 {}", fixture.path("alpha"))]
    );
}

#[test]
fn test_workspaces_env_skips_malformed_items() {
    // Arrange
    let fixture = Fixture::new();
    let listing = fixture.write_listing(&["9 proj/sub".to_string()]);
    let workspaces = format!(
        "broken;p=/x;proj={}/[^/]+;",
        regex::escape(&fixture.path("work"))
    );

    // Act
    let output = fixture
        .command(&fixture.root.join("work/proj1"))
        .env("HCD_WORKSPACES", workspaces)
        .arg("--history")
        .arg(&listing)
        .args(["--pick", "0"])
        .output()
        .expect("test expectation should hold");

    // Assert
    assert!(output.status.success());
    assert_eq!(stdout_lines(&output), vec![fixture.path("work/proj1/sub")]);
}
