use crate::error::StoreError;
use crate::types::{RepoId, RepoSet};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// File name of the repo list inside the config directory.
pub const DEFAULT_FILE_NAME: &str = "syncrepos";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    Duplicate,
}

/// Line-delimited list of repositories, one `owner/name` per line.
pub struct RepoList {
    path: PathBuf,
}

impl RepoList {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location: `<config dir>/syncrepos`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(DEFAULT_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create an empty list (and its parent directory) if none exists yet.
    /// Returns whether a file was created.
    pub fn create_if_missing(&self) -> Result<bool, StoreError> {
        if self.path.exists() {
            return Ok(false);
        }

        let create_err = |source| StoreError::Create {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(create_err)?;
        }

        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .map_err(create_err)?;

        Ok(true)
    }

    /// Non-blank lines of the list, trimmed, in file order.
    pub fn entries(&self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .read()?
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ToString::to_string)
            .collect())
    }

    /// Load the list as a set of identifiers. A malformed line fails the whole load.
    pub fn load(&self) -> Result<RepoSet, StoreError> {
        let contents = self.read()?;
        let mut repos = RepoSet::new();

        for (idx, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let repo = RepoId::parse(line).map_err(|e| StoreError::Malformed {
                path: self.path.clone(),
                line: idx + 1,
                value: e.value,
            })?;
            repos.insert(repo);
        }

        Ok(repos)
    }

    /// Append `repo` unless it is already listed.
    pub fn add(&self, repo: &RepoId) -> Result<AddOutcome, StoreError> {
        let contents = self.read()?;

        let exists = contents
            .lines()
            .map(str::trim)
            .any(|line| line == repo.as_str());
        if exists {
            return Ok(AddOutcome::Duplicate);
        }

        let mut record = String::new();
        if !contents.is_empty() && !contents.ends_with('\n') {
            record.push('\n');
        }
        record.push_str(repo.as_str());
        record.push('\n');

        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(write_err)?;
        file.write_all(record.as_bytes()).map_err(write_err)?;

        Ok(AddOutcome::Added)
    }

    /// Delete the list file.
    pub fn remove(&self) -> Result<(), StoreError> {
        fs::remove_file(&self.path).map_err(|source| StoreError::Remove {
            path: self.path.clone(),
            source,
        })
    }

    fn read(&self) -> Result<String, StoreError> {
        fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                StoreError::Missing {
                    path: self.path.clone(),
                }
            } else {
                StoreError::Read {
                    path: self.path.clone(),
                    source,
                }
            }
        })
    }
}
