use clap::Parser;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::github::DEFAULT_PROGRAM;

#[derive(Parser, Debug)]
#[command(name = "syncrepos", version)]
#[command(about = "Keep a list of GitHub repositories and sync them with their upstreams")]
#[command(
    long_about = "Without REPOS the list is printed. With REPOS each one is validated and appended \
                  to the list. --sync then runs `gh repo sync` for every listed repository in parallel."
)]
pub struct Args {
    /// Repositories (owner/name) to add to the list
    #[arg(value_name = "REPOS")]
    pub repos: Vec<String>,

    /// Get all the repos in the list and sync them using gh repo sync
    #[arg(long, short = 's')]
    pub sync: bool,

    /// Append the --force flag to gh repo sync
    #[arg(long, short = 'f')]
    pub force: bool,

    /// Repo list to read and write (default: syncrepos in the user config directory)
    #[arg(long, short = 'r', env = "SYNCREPOS_LIST", value_name = "PATH")]
    pub repolist: Option<PathBuf>,

    /// Create the repo list if it's not present
    #[arg(long, short = 'c')]
    pub createrepolist: bool,

    /// Suppress all output, including errors
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Delete the repo list once everything else is done
    #[arg(long, short = 't')]
    pub temp: bool,

    /// Maximum number of concurrent syncs (default: one per repository)
    #[arg(long, short = 'j', env = "SYNCREPOS_JOBS", value_name = "N")]
    pub jobs: Option<NonZeroUsize>,

    /// Program used to run `repo sync`
    #[arg(long, env = "SYNCREPOS_GH", default_value = DEFAULT_PROGRAM, value_name = "PROGRAM")]
    pub gh: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_short_flags() {
        let args = Args::try_parse_from([
            "syncrepos", "-s", "-f", "-c", "-q", "-t", "-j", "4", "-r", "/tmp/list", "octo/hello",
        ])
        .unwrap();

        assert!(args.sync && args.force && args.createrepolist && args.quiet && args.temp);
        assert_eq!(args.jobs.map(NonZeroUsize::get), Some(4));
        assert_eq!(args.repolist, Some(PathBuf::from("/tmp/list")));
        assert_eq!(args.repos, vec!["octo/hello"]);
    }

    #[test]
    fn test_zero_jobs_is_rejected() {
        assert!(Args::try_parse_from(["syncrepos", "--jobs", "0"]).is_err());
    }
}
