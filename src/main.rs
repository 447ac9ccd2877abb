use std::{cell::RefCell, env, io, path::PathBuf, process};

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use hcd::{
    tui, Config, ListingSource, ListingStore, Notifier, Picker, Store, TildeAbbr, WorkspaceDef,
};

/// Pick a directory from your history and go there.
///
/// Prints the chosen directory on stdout; wrap it in a shell function that
/// runs `cd "$(hcd ...)"`.
#[derive(Debug, Parser)]
#[command(name = "hcd", version)]
struct Cli {
    /// Initial filter text. `a/b` matches `a`, then a separator, then `b`.
    query: Option<String>,

    /// Directory listing exported from the history store, one
    /// `<score> <path>` per line. `-` reads stdin.
    #[arg(long, value_name = "FILE", env = "HCD_HISTORY")]
    history: Option<PathBuf>,

    /// Directory always listed first. Without any `--pin`, read from
    /// `HCD_PINNED` (`:`-separated).
    #[arg(long = "pin", value_name = "DIR")]
    pinned: Vec<String>,

    /// Directory never listed. Without any `--hide`, read from `HCD_HIDDEN`
    /// (`:`-separated).
    #[arg(long = "hide", value_name = "DIR")]
    hidden: Vec<String>,

    /// Workspace kind and the pattern matching its root, tried in order.
    /// Without any `--workspace`, read from `HCD_WORKSPACES` (`;`-separated);
    /// malformed items there are skipped.
    #[arg(long = "workspace", value_name = "KIND=PATTERN")]
    workspaces: Vec<WorkspaceDef>,

    /// Print the filtered rows and exit.
    #[arg(long, conflicts_with = "pick")]
    list: bool,

    /// Accept row INDEX of the filtered list without opening the picker.
    #[arg(long, value_name = "INDEX")]
    pick: Option<usize>,
}

/// Holds notifications until the terminal is back to normal.
#[derive(Default)]
struct BufferedNotifier {
    messages: RefCell<Vec<String>>,
}

impl Notifier for BufferedNotifier {
    fn notify(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}

impl BufferedNotifier {
    fn flush(&self) {
        for message in self.messages.borrow_mut().drain(..) {
            eprintln!("hcd: {message}");
        }
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let notifier = BufferedNotifier::default();

    let config = Config {
        store: cli.history.as_deref().map(|path| {
            Box::new(ListingStore::new(ListingSource::from(path))) as Box<dyn Store>
        }),
        pinned: or_env(cli.pinned, "HCD_PINNED", |value| split_list(value, ':')),
        hidden: or_env(cli.hidden, "HCD_HIDDEN", |value| split_list(value, ':')),
        workspaces: or_env(cli.workspaces, "HCD_WORKSPACES", parse_workspaces),
        abbr: TildeAbbr::from_env(),
    };

    let Some(mut picker) = Picker::start(&notifier, config) else {
        notifier.flush();
        process::exit(1);
    };
    if let Some(query) = &cli.query {
        picker.set_filter(query);
    }

    if cli.list {
        let rows = picker.len();
        for index in 0..rows {
            if let Some(row) = picker.show(index) {
                println!("{row}");
            }
        }
        picker.cancel();
        notifier.flush();
        if rows == 0 {
            process::exit(1);
        }
        return;
    }

    let changed = match cli.pick {
        Some(index) => picker.accept(&notifier, index),
        None => match tui::run(&mut picker, &notifier) {
            Ok(changed) => changed,
            Err(e) => {
                notifier.flush();
                eprintln!("Error: terminal: {}", e);
                process::exit(1);
            }
        },
    };
    notifier.flush();

    match changed {
        Some(dir) => println!("{dir}"),
        None => process::exit(1),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("HCD_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Command-line values, or else the parsed value of environment variable
/// `var` when no value was given.
fn or_env<T>(values: Vec<T>, var: &str, parse: impl FnOnce(&str) -> Vec<T>) -> Vec<T> {
    if !values.is_empty() {
        return values;
    }

    env::var(var).map(|value| parse(&value)).unwrap_or_default()
}

/// Splits an environment list, dropping empty items.
fn split_list(value: &str, separator: char) -> Vec<String> {
    value
        .split(separator)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses `;`-separated `KIND=PATTERN` items, skipping malformed ones.
fn parse_workspaces(value: &str) -> Vec<WorkspaceDef> {
    split_list(value, ';')
        .into_iter()
        .filter_map(|item| match item.parse::<WorkspaceDef>() {
            Ok(def) => Some(def),
            Err(err) => {
                debug!(%err, "skipping workspace");
                None
            }
        })
        .collect()
}
