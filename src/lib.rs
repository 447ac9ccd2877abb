//! Directory history picker.
//!
//! Candidates come from a history [`Store`], pinned and hidden directory
//! lists, and workspace definitions that let history entries be recorded
//! relative to a checkout. A [`Picker`] filters them by path segments and
//! changes directory on accept.

pub mod abbr;
pub mod candidates;
pub mod pattern;
pub mod picker;
pub mod store;
pub mod tui;
pub mod workspace;

pub use abbr::TildeAbbr;
pub use candidates::{build, Candidates, DirEntry, DirList, Score};
pub use pattern::{compile, Matcher};
pub use picker::{Config, Notifier, Picker, PickerState};
pub use store::{Dir, ListingSource, ListingStore, Store, StoreError};
pub use workspace::{has_path_prefix, resolve, WorkspaceDef, WorkspaceMatch};
