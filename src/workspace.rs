//! Workspaces: directory trees whose history is recorded relative to the
//! workspace root, as `<kind>/sub/path`, so entries follow the user across
//! checkouts of the same kind.

use std::path::MAIN_SEPARATOR;
use std::str::FromStr;

use regex::Regex;
use tracing::debug;

/// One configured kind of workspace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkspaceDef {
    /// Prefix used in place of the root for relative history entries.
    pub kind: String,
    /// Expression matched at the start of an absolute path. The matched
    /// span is the workspace root.
    pub pattern: String,
}

impl WorkspaceDef {
    pub fn new(kind: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            pattern: pattern.into(),
        }
    }

    /// Returns the root of this workspace containing `path`, if any.
    ///
    /// Patterns are anchored at the start of `path`. A pattern that fails to
    /// compile or only matches the empty string never yields a root.
    fn root_of<'a>(&self, path: &'a str) -> Option<&'a str> {
        let anchored = if self.pattern.starts_with('^') {
            self.pattern.clone()
        } else {
            format!("^{}", self.pattern)
        };
        let re = match Regex::new(&anchored) {
            Ok(re) => re,
            Err(err) => {
                debug!(kind = %self.kind, pattern = %self.pattern, %err, "skipping workspace");
                return None;
            }
        };

        re.find(path)
            .filter(|found| found.start() == 0 && !found.is_empty())
            .map(|found| found.as_str())
    }
}

/// Parses `KIND=PATTERN`.
impl FromStr for WorkspaceDef {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.split_once('=') {
            Some((kind, pattern)) if !kind.is_empty() && !pattern.is_empty() => {
                Ok(Self::new(kind, pattern))
            }
            _ => Err(format!("expected KIND=PATTERN, got {value:?}")),
        }
    }
}

/// Workspace the current directory belongs to.
///
/// The default value means the current directory is in no workspace.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkspaceMatch {
    pub kind: String,
    pub root: String,
}

impl WorkspaceMatch {
    pub fn is_none(&self) -> bool {
        self.kind.is_empty()
    }

    /// Whether `path` is a history entry recorded relative to this workspace.
    pub fn contains(&self, path: &str) -> bool {
        !self.is_none() && has_path_prefix(path, &self.kind)
    }

    /// Turns a workspace-relative entry back into an absolute path. Paths
    /// that are not relative to this workspace are returned unchanged.
    pub fn expand(&self, path: &str) -> String {
        if self.contains(path) {
            format!("{}{}", self.root, &path[self.kind.len()..])
        } else {
            path.to_string()
        }
    }
}

/// Resolves `cwd` against `defs`; the first definition with a root wins.
pub fn resolve(cwd: &str, defs: &[WorkspaceDef]) -> WorkspaceMatch {
    defs.iter()
        .find_map(|def| {
            def.root_of(cwd).map(|root| WorkspaceMatch {
                kind: def.kind.clone(),
                root: root.to_string(),
            })
        })
        .unwrap_or_default()
}

/// Whether `path` is `prefix` or lies below it. `ws2/x` is not below `ws`.
pub fn has_path_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with(MAIN_SEPARATOR),
        None => false,
    }
}
