//! Candidate list construction, filtering and row rendering.

use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use crate::abbr::TildeAbbr;
use crate::pattern;
use crate::store::{Store, StoreError};
use crate::workspace::{self, WorkspaceDef, WorkspaceMatch};

/// Ranking of a candidate. Pinned directories outrank every scored one.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub enum Score {
    Ranked(f64),
    Pinned,
}

impl Score {
    /// Three-column score cell: the rounded score, or `*` for pinned rows.
    pub fn show(self) -> String {
        match self {
            Self::Ranked(score) => format!("{score:3.0}"),
            Self::Pinned => "  *".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DirEntry {
    pub path: String,
    pub score: Score,
}

/// Ordered candidates, or a filtered view of them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DirList {
    dirs: Vec<DirEntry>,
}

impl DirList {
    pub fn new(dirs: Vec<DirEntry>) -> Self {
        Self { dirs }
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DirEntry> {
        self.dirs.get(index)
    }

    /// Keeps the entries whose abbreviated path matches `filter`. An empty
    /// filter returns the list as is.
    pub fn filter(&self, filter: &str, abbr: &TildeAbbr) -> DirList {
        if filter.is_empty() {
            return self.clone();
        }

        let matcher = pattern::compile(filter);
        let dirs = self
            .dirs
            .iter()
            .filter(|dir| matcher.matches(&abbr.abbreviate(&dir.path)))
            .cloned()
            .collect();

        DirList { dirs }
    }

    /// Renders row `index` as `<score> <abbreviated path>`.
    pub fn show(&self, index: usize, abbr: &TildeAbbr) -> Option<String> {
        self.dirs
            .get(index)
            .map(|dir| format!("{} {}", dir.score.show(), abbr.abbreviate(&dir.path)))
    }
}

/// Result of [`build`].
#[derive(Debug)]
pub struct Candidates {
    pub list: DirList,
    /// Workspace of the current directory; used again when a row is accepted.
    pub workspace: WorkspaceMatch,
    /// Store failure that was survived because pinned entries exist.
    pub warning: Option<StoreError>,
}

/// Builds the candidate list: pinned directories first, then history
/// entries in store order.
///
/// Pinned, hidden and current directories are excluded from the history
/// query. Relative history entries are kept only when they belong to the
/// workspace of the current directory.
///
/// # Errors
/// Returns the store error when the history query fails and there are no
/// pinned directories to fall back on.
pub fn build(
    store: &dyn Store,
    pinned: &[String],
    hidden: &[String],
    workspaces: &[WorkspaceDef],
) -> Result<Candidates, StoreError> {
    let mut dirs = Vec::with_capacity(pinned.len());
    let mut blacklist = HashSet::new();

    for path in pinned {
        blacklist.insert(path.clone());
        dirs.push(DirEntry {
            path: path.clone(),
            score: Score::Pinned,
        });
    }
    blacklist.extend(hidden.iter().cloned());

    let workspace = match store.getwd() {
        Ok(cwd) => {
            let workspace = workspace::resolve(&cwd, workspaces);
            blacklist.insert(cwd);
            workspace
        }
        Err(err) => {
            debug!(%err, "building candidates without current directory");
            WorkspaceMatch::default()
        }
    };

    let mut warning = None;
    match store.dirs(&blacklist) {
        Ok(stored) => dirs.extend(
            stored
                .into_iter()
                .filter(|dir| {
                    Path::new(&dir.path).is_absolute() || workspace.contains(&dir.path)
                })
                .map(|dir| DirEntry {
                    path: dir.path,
                    score: Score::Ranked(dir.score),
                }),
        ),
        Err(err) if dirs.is_empty() => return Err(err),
        Err(err) => {
            debug!(%err, pinned = dirs.len(), "history unavailable, showing pinned only");
            warning = Some(err);
        }
    }

    Ok(Candidates {
        list: DirList::new(dirs),
        workspace,
        warning,
    })
}
