use std::collections::HashSet;
use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

/// A directory known to the history store.
#[derive(Clone, Debug, PartialEq)]
pub struct Dir {
    pub score: f64,
    pub path: String,
}

impl Dir {
    pub fn new(score: f64, path: impl Into<String>) -> Self {
        Self {
            score,
            path: path.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("line {line}: malformed entry {content:?}")]
    Malformed { line: usize, content: String },
    #[error("cd {path}: {source}")]
    Chdir {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("cannot get working directory: {0}")]
    Getwd(#[source] io::Error),
}

/// Directory history plus the process working directory it navigates.
#[cfg_attr(test, mockall::automock)]
pub trait Store {
    /// Lists known directories, best first, skipping every path in
    /// `blacklist`.
    ///
    /// # Errors
    /// Returns an error when the history cannot be read.
    fn dirs(&self, blacklist: &HashSet<String>) -> Result<Vec<Dir>, StoreError>;

    /// Changes the working directory to `dir`.
    ///
    /// # Errors
    /// Returns an error when `dir` is not an accessible directory.
    fn chdir(&mut self, dir: &str) -> Result<(), StoreError>;

    /// Returns the current working directory.
    ///
    /// # Errors
    /// Returns an error when the working directory cannot be determined.
    fn getwd(&self) -> Result<String, StoreError>;
}

/// Where a [`ListingStore`] reads its listing from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListingSource {
    File(PathBuf),
    Stdin,
}

impl From<&Path> for ListingSource {
    fn from(path: &Path) -> Self {
        if path == Path::new("-") {
            Self::Stdin
        } else {
            Self::File(path.to_path_buf())
        }
    }
}

/// Store backed by a score listing exported from a history database, one
/// `<score> <path>` entry per line, best first.
///
/// Directory changes act on the process working directory.
#[derive(Debug)]
pub struct ListingStore {
    source: ListingSource,
}

impl ListingStore {
    pub fn new(source: ListingSource) -> Self {
        Self { source }
    }

    fn read_listing(&self) -> Result<String, StoreError> {
        match &self.source {
            ListingSource::File(path) => fs::read_to_string(path).map_err(|source| {
                StoreError::Read {
                    path: path.clone(),
                    source,
                }
            }),
            ListingSource::Stdin => {
                let mut listing = String::new();
                io::stdin()
                    .read_to_string(&mut listing)
                    .map_err(|source| StoreError::Read {
                        path: PathBuf::from("-"),
                        source,
                    })?;

                Ok(listing)
            }
        }
    }
}

impl Store for ListingStore {
    fn dirs(&self, blacklist: &HashSet<String>) -> Result<Vec<Dir>, StoreError> {
        let listing = self.read_listing()?;
        let dirs = parse_listing(&listing)?;

        Ok(dirs
            .into_iter()
            .filter(|dir| !blacklist.contains(&dir.path))
            .collect())
    }

    fn chdir(&mut self, dir: &str) -> Result<(), StoreError> {
        env::set_current_dir(dir).map_err(|source| StoreError::Chdir {
            path: dir.to_string(),
            source,
        })?;
        info!(dir, "changed directory");

        Ok(())
    }

    fn getwd(&self) -> Result<String, StoreError> {
        let cwd = env::current_dir().map_err(StoreError::Getwd)?;

        Ok(cwd.to_string_lossy().to_string())
    }
}

/// Parses a listing; blank lines and `#` comments are skipped.
fn parse_listing(listing: &str) -> Result<Vec<Dir>, StoreError> {
    let mut dirs = Vec::new();

    for (index, line) in listing.lines().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let malformed = || StoreError::Malformed {
            line: index + 1,
            content: line.to_string(),
        };
        let (score, path) = trimmed.split_once(char::is_whitespace).ok_or_else(malformed)?;
        let score = score.parse::<f64>().map_err(|_| malformed())?;
        let path = path.trim_start();
        if path.is_empty() || !score.is_finite() {
            return Err(malformed());
        }

        dirs.push(Dir::new(score, path));
    }

    Ok(dirs)
}
