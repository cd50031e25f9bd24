use crate::types::{BatchReport, RepoId, RepoSet, SyncOutcome, SyncRunner};
use std::num::NonZeroUsize;
use std::sync::{mpsc, Mutex, PoisonError};
use std::thread;
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Pass the force directive to every invocation in the batch.
    pub force: bool,
    /// Cap on concurrent invocations. `None` runs one thread per repository.
    pub jobs: Option<NonZeroUsize>,
}

/// Sync every repository in `repos` concurrently and wait for all of them.
///
/// A failure never cancels the other invocations; each repository's outcome is
/// recorded in the returned report.
pub fn synchronize<R>(runner: &R, repos: &RepoSet, options: SyncOptions) -> BatchReport
where
    R: SyncRunner + ?Sized,
{
    if repos.is_empty() {
        return BatchReport::default();
    }

    let started = Instant::now();
    let workers = options
        .jobs
        .map_or(repos.len(), |jobs| jobs.get().min(repos.len()));
    debug!(repos = repos.len(), workers, force = options.force, "starting batch");

    let queue = Mutex::new(repos.iter());
    let (tx, rx) = mpsc::sync_channel::<(RepoId, SyncOutcome)>(repos.len());
    let force = options.force;

    thread::scope(|scope| {
        // The calling thread is the last worker, so the batch drains even if
        // the OS refuses to start any more threads.
        for idx in 1..workers {
            let tx = tx.clone();
            let queue = &queue;
            let spawned = thread::Builder::new()
                .name(format!("sync-{idx}"))
                .spawn_scoped(scope, move || drain(runner, queue, force, &tx));
            if let Err(e) = spawned {
                warn!(error = %e, started = idx - 1, "could not start sync worker");
                break;
            }
        }
        drain(runner, &queue, force, &tx);
    });
    drop(tx);

    BatchReport::new(rx.into_iter().collect(), started.elapsed())
}

/// Work through `queue` until it is empty, publishing one outcome per repository.
fn drain<'a, R>(
    runner: &R,
    queue: &Mutex<impl Iterator<Item = &'a RepoId>>,
    force: bool,
    tx: &mpsc::SyncSender<(RepoId, SyncOutcome)>,
) where
    R: SyncRunner + ?Sized,
{
    while let Some(repo) = next_repo(queue) {
        let outcome = sync_single_repo(runner, repo, force);
        // The receiver outlives the scope, so this cannot fail.
        let _ = tx.send((repo.clone(), outcome));
    }
}

fn next_repo<'a>(queue: &Mutex<impl Iterator<Item = &'a RepoId>>) -> Option<&'a RepoId> {
    queue.lock().unwrap_or_else(PoisonError::into_inner).next()
}

/// Sync one repository, bracketed by progress markers.
fn sync_single_repo<R>(runner: &R, repo: &RepoId, force: bool) -> SyncOutcome
where
    R: SyncRunner + ?Sized,
{
    info!("STARTED {repo}");
    let outcome = SyncOutcome::from(runner.sync(repo, force));
    info!("DONE {repo}");
    outcome
}

#[cfg(test)]
pub mod testing {
    use crate::error::SyncError;
    use crate::types::{RepoId, SyncRunner};
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use std::thread::{self, ThreadId};
    use std::time::Duration;

    /// Records every call and fails the repositories it is told to fail.
    #[derive(Default)]
    pub struct FakeRunner {
        pub failing: Vec<&'static str>,
        pub delays: HashMap<&'static str, Duration>,
        pub calls: Mutex<Vec<(String, bool)>>,
        pub threads: Mutex<HashSet<ThreadId>>,
    }

    impl FakeRunner {
        pub fn failing(repos: &[&'static str]) -> Self {
            Self {
                failing: repos.to_vec(),
                ..Self::default()
            }
        }

        pub fn calls(&self) -> Vec<(String, bool)> {
            let mut calls = self.calls.lock().unwrap().clone();
            calls.sort();
            calls
        }
    }

    impl SyncRunner for FakeRunner {
        fn sync(&self, repo: &RepoId, force: bool) -> Result<(), SyncError> {
            if let Some(delay) = self.delays.get(repo.as_str()) {
                thread::sleep(*delay);
            }
            self.calls
                .lock()
                .unwrap()
                .push((repo.to_string(), force));
            self.threads.lock().unwrap().insert(thread::current().id());
            if self.failing.iter().any(|f| *f == repo.as_str()) {
                return Err(SyncError::Exit {
                    repo: repo.clone(),
                    program: "gh".to_string(),
                    code: Some(1),
                });
            }
            Ok(())
        }
    }
}
