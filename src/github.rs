use crate::error::SyncError;
use crate::types::{RepoId, SyncRunner};
use std::ffi::OsString;
use std::process::{Command, Stdio};

pub const DEFAULT_PROGRAM: &str = "gh";

/// Where the tool's stderr goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StderrMode {
    Inherit,
    Discard,
}

/// Syncs repositories by shelling out to `gh repo sync`.
pub struct GhCli {
    program: OsString,
    stderr: StderrMode,
}

impl GhCli {
    pub fn new(program: impl Into<OsString>, stderr: StderrMode) -> Self {
        Self {
            program: program.into(),
            stderr,
        }
    }

    fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}

/// Arguments for one `gh repo sync` invocation.
pub fn sync_args(repo: &RepoId, force: bool) -> Vec<&str> {
    let mut args = vec!["repo", "sync", repo.as_str()];
    if force {
        args.push("--force");
    }
    args
}

impl SyncRunner for GhCli {
    fn sync(&self, repo: &RepoId, force: bool) -> Result<(), SyncError> {
        let stderr = match self.stderr {
            StderrMode::Inherit => Stdio::inherit(),
            StderrMode::Discard => Stdio::null(),
        };

        let status = Command::new(&self.program)
            .args(sync_args(repo, force))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(stderr)
            .status()
            .map_err(|source| SyncError::Launch {
                repo: repo.clone(),
                program: self.program_name(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(SyncError::Exit {
                repo: repo.clone(),
                program: self.program_name(),
                code: status.code(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> RepoId {
        RepoId::parse("octo/hello").unwrap()
    }

    #[test]
    fn test_sync_args() {
        assert_eq!(sync_args(&repo(), false), ["repo", "sync", "octo/hello"]);
        assert_eq!(
            sync_args(&repo(), true),
            ["repo", "sync", "octo/hello", "--force"]
        );
    }

    #[test]
    fn test_missing_program_is_launch_failure() {
        let gh = GhCli::new("/definitely/not/a/real/gh", StderrMode::Discard);
        match gh.sync(&repo(), false) {
            Err(SyncError::Launch { repo, program, .. }) => {
                assert_eq!(repo.as_str(), "octo/hello");
                assert_eq!(program, "/definitely/not/a/real/gh");
            }
            other => panic!("expected launch failure, got {other:?}"),
        }
    }

    #[cfg(unix)]
    mod script {
        use super::*;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use std::path::{Path, PathBuf};
        use tempfile::TempDir;

        /// A stand-in for `gh` that records its arguments and fails for `octo/broken`.
        fn fake_gh(dir: &Path) -> PathBuf {
            let script = dir.join("gh");
            let log = dir.join("calls.log");
            fs::write(
                &script,
                format!(
                    "#!/bin/sh\necho \"$@\" >> '{}'\necho 'gh: noisy stderr' >&2\n[ \"$3\" = \"octo/broken\" ] && exit 7\nexit 0\n",
                    log.display()
                ),
            )
            .unwrap();
            fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
            script
        }

        #[test]
        fn test_zero_exit_is_success() {
            let dir = TempDir::new().unwrap();
            let gh = GhCli::new(fake_gh(dir.path()), StderrMode::Discard);

            gh.sync(&repo(), true).unwrap();

            let calls = fs::read_to_string(dir.path().join("calls.log")).unwrap();
            assert_eq!(calls, "repo sync octo/hello --force\n");
        }

        #[test]
        fn test_nonzero_exit_is_failure() {
            let dir = TempDir::new().unwrap();
            let gh = GhCli::new(fake_gh(dir.path()), StderrMode::Discard);
            let broken = RepoId::parse("octo/broken").unwrap();

            match gh.sync(&broken, false) {
                Err(SyncError::Exit { repo, code, .. }) => {
                    assert_eq!(repo, broken);
                    assert_eq!(code, Some(7));
                }
                other => panic!("expected exit failure, got {other:?}"),
            }
        }
    }
}
