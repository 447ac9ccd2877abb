//! Location picker lifecycle.
//!
//! A picker is started from a [`Config`], lets the host narrow its list by
//! filter text, and closes after one accept or cancel. Failures never leave
//! this module as errors; they are reported through a [`Notifier`].

use tracing::debug;

use crate::abbr::TildeAbbr;
use crate::candidates::{self, DirList};
use crate::store::Store;
use crate::workspace::{WorkspaceDef, WorkspaceMatch};

/// Host channel for single-line user notifications.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier {
    fn notify(&self, message: &str);
}

/// Everything needed to start a picker.
#[derive(Default)]
pub struct Config {
    /// Directory history and working-directory access. Without a store the
    /// picker does not open.
    pub store: Option<Box<dyn Store>>,
    /// Always listed first, never duplicated from history.
    pub pinned: Vec<String>,
    /// Never listed.
    pub hidden: Vec<String>,
    /// Tried in order; the first one containing the working directory wins.
    pub workspaces: Vec<WorkspaceDef>,
    pub abbr: TildeAbbr,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickerState {
    Open,
    Closed,
}

pub struct Picker {
    store: Box<dyn Store>,
    abbr: TildeAbbr,
    workspace: WorkspaceMatch,
    all: DirList,
    shown: DirList,
    filter: String,
    state: PickerState,
}

impl Picker {
    /// Builds the candidate list and opens the picker.
    ///
    /// Returns `None`, after notifying, when no store is configured or when
    /// the history cannot be read and nothing is pinned.
    pub fn start(notifier: &dyn Notifier, config: Config) -> Option<Self> {
        let Some(store) = config.store else {
            notifier.notify("no dir history store");
            return None;
        };

        let built = candidates::build(
            store.as_ref(),
            &config.pinned,
            &config.hidden,
            &config.workspaces,
        );
        let candidates = match built {
            Ok(candidates) => candidates,
            Err(err) => {
                notifier.notify(&format!("db error: {err}"));
                return None;
            }
        };
        if let Some(err) = &candidates.warning {
            notifier.notify(&format!("db error: {err}"));
        }
        debug!(
            candidates = candidates.list.len(),
            workspace = %candidates.workspace.kind,
            "location picker opened"
        );

        Some(Self {
            store,
            abbr: config.abbr,
            workspace: candidates.workspace,
            shown: candidates.list.clone(),
            all: candidates.list,
            filter: String::new(),
            state: PickerState::Open,
        })
    }

    pub fn state(&self) -> PickerState {
        self.state
    }

    pub fn filter_text(&self) -> &str {
        &self.filter
    }

    pub fn len(&self) -> usize {
        self.shown.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shown.is_empty()
    }

    /// Display text of shown row `index`.
    pub fn show(&self, index: usize) -> Option<String> {
        self.shown.show(index, &self.abbr)
    }

    /// Recomputes the shown rows from the full candidate list.
    pub fn set_filter(&mut self, filter: &str) {
        if self.state == PickerState::Closed {
            return;
        }
        filter.clone_into(&mut self.filter);
        self.shown = self.all.filter(filter, &self.abbr);
    }

    /// Changes into the directory of shown row `index` and closes the picker.
    ///
    /// Workspace-relative rows are expanded against the root of the current
    /// workspace first. The picker closes whether or not the change succeeds.
    /// Returns the directory changed into.
    pub fn accept(&mut self, notifier: &dyn Notifier, index: usize) -> Option<String> {
        if self.state == PickerState::Closed {
            return None;
        }
        self.state = PickerState::Closed;

        let Some(entry) = self.shown.get(index) else {
            debug!(index, rows = self.shown.len(), "accepted row out of range");
            return None;
        };
        let path = self.workspace.expand(&entry.path);

        match self.store.chdir(&path) {
            Ok(()) => Some(path),
            Err(err) => {
                notifier.notify(&err.to_string());
                None
            }
        }
    }

    pub fn cancel(&mut self) {
        self.state = PickerState::Closed;
    }
}
