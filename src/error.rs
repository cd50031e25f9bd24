use crate::types::RepoId;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Exit status when at least one repository failed to sync.
pub const EXIT_SYNC_FAILED: u8 = 1;
/// Exit status when the configuration could not be resolved.
pub const EXIT_CONFIG: u8 = 2;
/// Exit status when some supplied identifiers were rejected.
pub const EXIT_REJECTED: u8 = 3;
/// Exit status for repo list I/O problems (`EX_IOERR`).
pub const EXIT_STORE: u8 = 74;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("repositories must be owner/name but found {value:?}")]
pub struct InvalidRepoId {
    pub value: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("repo list {} does not exist (create it with --createrepolist)", .path.display())]
    Missing { path: PathBuf },

    #[error("failed to create repo list {}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read repo list {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write repo list {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove repo list {}", .path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}:{line}: {value:?} is not an owner/name identifier", .path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        value: String,
    },
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to launch {program} for {repo}")]
    Launch {
        repo: RepoId,
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} failed to sync {repo} ({})", describe_exit(.code.as_ref()))]
    Exit {
        repo: RepoId,
        program: String,
        code: Option<i32>,
    },
}

impl SyncError {
    pub fn repo(&self) -> &RepoId {
        match self {
            Self::Launch { repo, .. } | Self::Exit { repo, .. } => repo,
        }
    }
}

fn describe_exit(code: Option<&i32>) -> String {
    match code {
        Some(code) => format!("exit status {code}"),
        None => "terminated by signal".to_string(),
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] anyhow::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("{count} repository identifier(s) rejected")]
    Rejected { count: usize },
}

impl AppError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Sync(_) => EXIT_SYNC_FAILED,
            Self::Config(_) => EXIT_CONFIG,
            Self::Rejected { .. } => EXIT_REJECTED,
            Self::Store(_) => EXIT_STORE,
        }
    }
}

/// Render an error with its `source()` chain, one cause per segment.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
