//! `GitBackend` implementation that shells out to the `git` binary

use std::path::Path;
use std::process::Output;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::infrastructure::traits::{CommandRunner, GitBackend};
use crate::infrastructure::{InfraError, InfraResult};

const GIT: &str = "git";

/// Runs `git -C <dir> ...` through a [`CommandRunner`].
pub struct GitCli {
    cmd: Arc<dyn CommandRunner>,
}

impl GitCli {
    pub fn new(cmd: Arc<dyn CommandRunner>) -> Self {
        Self { cmd }
    }

    /// Run git in `dir` and return the raw output, whatever the exit status.
    fn output(&self, dir: &Path, args: &[&str]) -> InfraResult<Output> {
        let dir_arg = dir.to_string_lossy();
        let mut full_args: Vec<&str> = vec!["-C", dir_arg.as_ref()];
        full_args.extend_from_slice(args);

        debug!("git: dir={}, args={:?}", dir.display(), args);
        let output = self
            .cmd
            .run(GIT, &full_args)
            .map_err(|e| InfraError::io(format!("run git {}", args.join(" ")), e))?;
        trace!(
            "git: status={}, stdout={:?}, stderr={:?}",
            output.status,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        Ok(output)
    }

    /// Run git in `dir`, failing on a non-zero exit status.
    fn run(&self, dir: &Path, args: &[&str]) -> InfraResult<String> {
        let output = self.output(dir, args)?;
        if !output.status.success() {
            return Err(InfraError::git(
                subcommand(args),
                failure_message(&output),
                output.status.code(),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Diagnostics of a failed command: stderr, then stdout.
///
/// Merge conflicts (`CONFLICT ...`) and "nothing to commit" are reported on stdout.
fn failure_message(output: &Output) -> String {
    [&output.stderr, &output.stdout]
        .into_iter()
        .map(|bytes| String::from_utf8_lossy(bytes).trim().to_string())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// First non-flag argument, used to label errors (`push`, `rev-list`, ...).
fn subcommand(args: &[&str]) -> String {
    args.iter()
        .find(|a| !a.starts_with('-'))
        .copied()
        .unwrap_or_default()
        .to_string()
}

/// Parse `git rev-list --left-right --count` output: `"<ahead>\t<behind>"`.
pub fn parse_left_right_count(output: &str) -> Option<(u32, u32)> {
    let mut parts = output.split_whitespace();
    let ahead = parts.next()?.parse().ok()?;
    let behind = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((ahead, behind))
}

impl GitBackend for GitCli {
    fn init(&self, dir: &Path) -> InfraResult<()> {
        self.run(dir, &["init", "--quiet"]).map(|_| ())
    }

    fn status_porcelain(&self, dir: &Path) -> InfraResult<String> {
        self.run(dir, &["status", "--porcelain"])
    }

    fn add_paths(&self, dir: &Path, paths: &[&str]) -> InfraResult<()> {
        let mut args = vec!["add", "--"];
        args.extend_from_slice(paths);
        self.run(dir, &args).map(|_| ())
    }

    fn add_all(&self, dir: &Path) -> InfraResult<()> {
        self.run(dir, &["add", "-A"]).map(|_| ())
    }

    fn commit(&self, dir: &Path, message: &str) -> InfraResult<()> {
        self.run(dir, &["commit", "--quiet", "-m", message]).map(|_| ())
    }

    fn has_commits(&self, dir: &Path) -> InfraResult<bool> {
        let output = self.output(dir, &["rev-parse", "--verify", "--quiet", "HEAD"])?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            code => Err(InfraError::git("rev-parse", failure_message(&output), code)),
        }
    }

    fn current_branch(&self, dir: &Path) -> InfraResult<String> {
        let stdout = self.run(dir, &["symbolic-ref", "--quiet", "--short", "HEAD"])?;
        let branch = stdout.trim();
        if branch.is_empty() {
            return Err(InfraError::UnexpectedOutput {
                command: "symbolic-ref".into(),
                output: stdout,
            });
        }
        Ok(branch.to_string())
    }

    fn remote_has_branch(&self, dir: &Path, remote: &str, branch: &str) -> InfraResult<bool> {
        let refname = format!("refs/heads/{branch}");
        let output = self.output(dir, &["ls-remote", "--exit-code", "--heads", remote, &refname])?;
        // --exit-code: 2 means the remote has no matching ref
        match output.status.code() {
            Some(0) => Ok(true),
            Some(2) => Ok(false),
            code => Err(InfraError::git("ls-remote", failure_message(&output), code)),
        }
    }

    fn push(&self, dir: &Path, remote: &str, branch: &str) -> InfraResult<()> {
        self.run(dir, &["push", "--quiet", remote, branch]).map(|_| ())
    }

    fn pull(&self, dir: &Path, remote: &str, branch: &str) -> InfraResult<()> {
        self.run(
            dir,
            &["pull", "--no-rebase", "--no-edit", remote, branch],
        )
        .map(|_| ())
    }

    fn fetch(&self, dir: &Path, remote: &str) -> InfraResult<()> {
        self.run(dir, &["fetch", "--quiet", remote]).map(|_| ())
    }

    fn ahead_behind(&self, dir: &Path, upstream: &str) -> InfraResult<(u32, u32)> {
        let range = format!("HEAD...{upstream}");
        let stdout = self.run(dir, &["rev-list", "--left-right", "--count", &range])?;
        parse_left_right_count(&stdout).ok_or_else(|| InfraError::UnexpectedOutput {
            command: "rev-list".into(),
            output: stdout,
        })
    }

    fn remote_url(&self, dir: &Path, remote: &str) -> InfraResult<Option<String>> {
        let output = self.output(dir, &["remote", "get-url", remote])?;
        if !output.status.success() {
            return Ok(None);
        }
        let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((!url.is_empty()).then_some(url))
    }

    fn add_remote(&self, dir: &Path, remote: &str, url: &str) -> InfraResult<()> {
        self.run(dir, &["remote", "add", remote, url]).map(|_| ())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::io;
    use std::os::unix::process::ExitStatusExt;
    use std::process::ExitStatus;
    use std::sync::Mutex;

    /// Records invocations and replays a canned output.
    struct ScriptedRunner {
        calls: Mutex<Vec<Vec<String>>>,
        status: i32,
        stdout: &'static str,
        stderr: &'static str,
    }

    impl ScriptedRunner {
        fn new(status: i32, stdout: &'static str, stderr: &'static str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                status,
                stdout,
                stderr,
            }
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, cmd: &str, args: &[&str]) -> io::Result<Output> {
            let mut call = vec![cmd.to_string()];
            call.extend(args.iter().map(|a| a.to_string()));
            self.calls.lock().unwrap().push(call);
            Ok(Output {
                status: ExitStatus::from_raw(self.status << 8),
                stdout: self.stdout.as_bytes().to_vec(),
                stderr: self.stderr.as_bytes().to_vec(),
            })
        }
    }

    #[test]
    fn given_rev_list_output_when_parsing_then_returns_counts() {
        assert_eq!(parse_left_right_count("3\t1\n"), Some((3, 1)));
        assert_eq!(parse_left_right_count("0 0"), Some((0, 0)));
        assert_eq!(parse_left_right_count(""), None);
        assert_eq!(parse_left_right_count("x\t1"), None);
        assert_eq!(parse_left_right_count("1\t2\t3"), None);
    }

    #[test]
    fn given_push_when_running_then_targets_directory_with_dash_c() {
        let runner = Arc::new(ScriptedRunner::new(0, "", ""));
        let git = GitCli::new(runner.clone());

        git.push(Path::new("/tmp/catalog"), "origin", "main").unwrap();

        let calls = runner.calls.lock().unwrap();
        assert_eq!(
            calls[0],
            vec!["git", "-C", "/tmp/catalog", "push", "--quiet", "origin", "main"]
        );
    }

    #[test]
    fn given_failing_command_when_running_then_git_error_carries_stderr() {
        let runner = Arc::new(ScriptedRunner::new(1, "", "fatal: no such ref\n"));
        let git = GitCli::new(runner);

        let err = git
            .pull(Path::new("/tmp/catalog"), "origin", "main")
            .unwrap_err();

        match err {
            InfraError::Git {
                command,
                message,
                exit_code,
            } => {
                assert_eq!(command, "pull");
                assert_eq!(message, "fatal: no such ref");
                assert_eq!(exit_code, Some(1));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn given_conflict_on_stdout_when_pulling_then_message_keeps_it() {
        let runner = Arc::new(ScriptedRunner::new(
            1,
            "Auto-merging metadata.parquet\nCONFLICT (content): Merge conflict in metadata.parquet\n",
            "",
        ));
        let git = GitCli::new(runner);

        let err = git
            .pull(Path::new("/tmp/catalog"), "origin", "main")
            .unwrap_err();

        assert!(err.to_string().contains("CONFLICT (content)"), "{err}");
    }

    #[test]
    fn given_ls_remote_exit_two_when_checking_branch_then_absent() {
        let runner = Arc::new(ScriptedRunner::new(2, "", ""));
        let git = GitCli::new(runner.clone());

        let found = git
            .remote_has_branch(Path::new("/tmp/catalog"), "origin", "main")
            .unwrap();

        assert!(!found);
        let calls = runner.calls.lock().unwrap();
        assert_eq!(
            calls[0][3..].to_vec(),
            vec!["ls-remote", "--exit-code", "--heads", "origin", "refs/heads/main"]
        );
    }

    #[test]
    fn given_unreachable_remote_when_checking_branch_then_error() {
        let runner = Arc::new(ScriptedRunner::new(128, "", "fatal: could not read from remote"));
        let git = GitCli::new(runner);

        let result = git.remote_has_branch(Path::new("/tmp/catalog"), "origin", "main");

        assert!(matches!(result, Err(InfraError::Git { exit_code: Some(128), .. })));
    }

    #[test]
    fn given_unborn_head_when_checking_commits_then_false() {
        let runner = Arc::new(ScriptedRunner::new(1, "", ""));
        let git = GitCli::new(runner);

        assert!(!git.has_commits(Path::new("/tmp/catalog")).unwrap());
    }

    #[test]
    fn given_missing_remote_when_querying_url_then_none() {
        let runner = Arc::new(ScriptedRunner::new(2, "", "error: No such remote 'origin'"));
        let git = GitCli::new(runner);

        let url = git.remote_url(Path::new("/tmp/catalog"), "origin").unwrap();

        assert_eq!(url, None);
    }

    #[test]
    fn given_garbled_rev_list_when_counting_then_unexpected_output() {
        let runner = Arc::new(ScriptedRunner::new(0, "garbage", ""));
        let git = GitCli::new(runner);

        let err = git
            .ahead_behind(Path::new("/tmp/catalog"), "origin/main")
            .unwrap_err();

        assert!(matches!(err, InfraError::UnexpectedOutput { .. }));
    }
}
