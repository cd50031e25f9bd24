mod cli;
mod error;
mod github;
mod logging;
mod output;
mod store;
mod sync;
mod types;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};

use cli::Args;
use error::{error_chain, AppError, EXIT_CONFIG};
use github::{GhCli, StderrMode};
use output::{Console, Silent, Sink};
use store::{AddOutcome, RepoList};
use sync::{synchronize, SyncOptions};
use types::{BatchReport, RepoId, SyncRunner};

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let sink = sink_for(wants_quiet(std::env::args_os()));
            return ExitCode::from(report_parse_error(&err, sink.as_ref()));
        }
    };

    let sink = sink_for(args.quiet);

    if let Err(e) = logging::init(args.quiet) {
        sink.err(&format!("Warning: {e:#}"));
    }

    let stderr = if args.quiet {
        StderrMode::Discard
    } else {
        StderrMode::Inherit
    };
    let gh = GhCli::new(&args.gh, stderr);

    match run(&args, sink.as_ref(), &gh) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            sink.err(&format!("Error: {}", error_chain(&err)));
            ExitCode::from(err.exit_code())
        }
    }
}

fn sink_for(quiet: bool) -> Box<dyn Sink> {
    if quiet {
        Box::new(Silent)
    } else {
        Box::new(Console)
    }
}

/// Look for `-q`/`--quiet` in arguments clap refused to parse.
fn wants_quiet<I>(argv: I) -> bool
where
    I: IntoIterator,
    I::Item: Into<OsString>,
{
    for arg in argv.into_iter().skip(1).map(Into::into) {
        let Some(arg) = arg.to_str() else {
            continue;
        };
        if arg == "--" {
            break;
        }
        if arg == "--quiet" {
            return true;
        }
        if let Some(shorts) = arg.strip_prefix('-').filter(|s| !s.starts_with('-')) {
            for c in shorts.chars() {
                match c {
                    'q' => return true,
                    // The rest of the cluster is a value.
                    'r' | 'j' => break,
                    _ => {}
                }
            }
        }
    }
    false
}

/// Print a clap error through the sink and pick the exit status.
/// Help and version output is always shown.
fn report_parse_error(err: &clap::Error, sink: &dyn Sink) -> u8 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = err.print();
        }
        _ => sink.err(err.to_string().trim_end()),
    }
    u8::try_from(err.exit_code()).unwrap_or(EXIT_CONFIG)
}

fn resolve_repo_list(arg: Option<&PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(path) = arg {
        return Ok(path.clone());
    }
    RepoList::default_path()
        .context("could not determine the config directory; pass --repolist")
}

/// Run every requested operation against the resolved repo list.
fn run(args: &Args, sink: &dyn Sink, runner: &dyn SyncRunner) -> Result<(), AppError> {
    let list = RepoList::new(resolve_repo_list(args.repolist.as_ref())?);
    debug!(path = %list.path().display(), "using repo list");

    let result = run_operations(args, &list, sink, runner);

    if !args.temp {
        return result;
    }
    // A temporary list goes away whatever happened above.
    let removed = list.remove();
    result?;
    removed?;
    Ok(())
}

fn run_operations(
    args: &Args,
    list: &RepoList,
    sink: &dyn Sink,
    runner: &dyn SyncRunner,
) -> Result<(), AppError> {
    if args.createrepolist && list.create_if_missing()? {
        info!("created repo list {}", list.path().display());
    }

    let mut rejected = 0;
    if args.repos.is_empty() {
        for entry in list.entries()? {
            sink.out(&entry);
        }
    } else {
        for raw in &args.repos {
            let repo = match RepoId::parse(raw) {
                Ok(repo) => repo,
                Err(e) => {
                    sink.err(&e.to_string());
                    rejected += 1;
                    continue;
                }
            };
            match list.add(&repo)? {
                AddOutcome::Added => sink.out(&format!("Repository added: {repo}")),
                AddOutcome::Duplicate => {
                    sink.out(&format!("Repository already exists in the list: {repo}"));
                }
            }
        }
    }

    if args.sync {
        sync_all(args, list, sink, runner)?;
    }

    if rejected > 0 {
        return Err(AppError::Rejected { count: rejected });
    }
    Ok(())
}

fn sync_all(
    args: &Args,
    list: &RepoList,
    sink: &dyn Sink,
    runner: &dyn SyncRunner,
) -> Result<(), AppError> {
    // Load before spawning anything: an unreadable list means an unknown batch.
    let repos = list.load()?;
    if repos.is_empty() {
        sink.out("No repositories to sync.");
        return Ok(());
    }

    let options = SyncOptions {
        force: args.force,
        jobs: args.jobs,
    };
    let report = synchronize(runner, &repos, options);
    print_summary(&report, sink);

    report.into_result()?;
    Ok(())
}

fn print_summary(report: &BatchReport, sink: &dyn Sink) {
    if report.is_empty() {
        return;
    }
    sink.out(&format!(
        "\nSummary ({:.1}s):",
        report.elapsed.as_secs_f64()
    ));
    sink.out(&format!("  Synced: {}", report.succeeded()));
    if !report.is_success() {
        sink.out(&format!("  Failed: {}", report.failed()));
        for e in report.failures() {
            sink.err(&format!("  {}: {}", e.repo(), error_chain(e)));
        }
    }
}
