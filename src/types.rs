use crate::error::{InvalidRepoId, SyncError};
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;

// ============================================================
// SYNC RUNNER TRAIT
// ============================================================

/// Runs the external sync operation for one repository.
/// The dispatcher calls this from many threads at once.
pub trait SyncRunner: Send + Sync {
    /// Sync `repo` with its upstream, passing the force directive when `force` is set.
    fn sync(&self, repo: &RepoId, force: bool) -> Result<(), SyncError>;
}

// ============================================================
// REPOSITORY IDENTIFIERS
// ============================================================

const REPO_PATTERN: &str =
    r"^[a-zA-Z0-9]([a-zA-Z0-9_-]*[a-zA-Z0-9])?/[a-zA-Z0-9]([a-zA-Z0-9_-]*[a-zA-Z0-9])?$";

fn repo_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(REPO_PATTERN).expect("repository pattern compiles"))
}

/// A validated `owner/name` repository identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RepoId(String);

impl RepoId {
    pub fn parse(value: &str) -> Result<Self, InvalidRepoId> {
        if repo_regex().is_match(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(InvalidRepoId {
                value: value.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RepoId {
    type Err = InvalidRepoId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifiers of one batch, iterated in lexical order.
pub type RepoSet = BTreeSet<RepoId>;

// ============================================================
// SYNC OUTCOMES
// ============================================================

#[derive(Debug)]
pub enum SyncOutcome {
    Success,
    Failure(SyncError),
}

impl SyncOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<Result<(), SyncError>> for SyncOutcome {
    fn from(result: Result<(), SyncError>) -> Self {
        match result {
            Ok(()) => Self::Success,
            Err(e) => Self::Failure(e),
        }
    }
}

/// Every outcome of one batch, sorted by repository.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<(RepoId, SyncOutcome)>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn new(mut outcomes: Vec<(RepoId, SyncOutcome)>, elapsed: Duration) -> Self {
        outcomes.sort_by(|a, b| a.0.cmp(&b.0));
        Self { outcomes, elapsed }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &SyncError> {
        self.outcomes.iter().filter_map(|(_, o)| match o {
            SyncOutcome::Failure(e) => Some(e),
            SyncOutcome::Success => None,
        })
    }

    /// Collapse the batch into its aggregate outcome: the number of synced
    /// repositories, or the first failure in identifier order.
    pub fn into_result(self) -> Result<usize, SyncError> {
        let total = self.outcomes.len();
        for (_, outcome) in self.outcomes {
            if let SyncOutcome::Failure(e) = outcome {
                return Err(e);
            }
        }
        Ok(total)
    }
}
