//! `VersionControlPublisher` that shells out to `git`.
//!
//! Each step runs as its own process in the project root (`git -C <root> ...`)
//! with stdout and stderr appended to the transcript. Steps are bounded by a
//! timeout and a failing step ends the sequence, except for the two whose
//! failure is expected (removing a missing `origin`, committing nothing).
//! The global `safe.directory` entry is only added when git does not already
//! list the project root, so repeated publishes leave the global config alone.

use super::{PublishTranscript, VersionControlPublisher};
use async_trait::async_trait;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

const COMMITTER_NAME: &str = "Web Admin";
const COMMITTER_EMAIL: &str = "admin@cursos.com";
const COMMIT_MESSAGE: &str = "Backup Auto";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GitStep {
    pub(crate) args: Vec<String>,
    pub(crate) tolerate_failure: bool,
}

impl GitStep {
    fn new(args: &[&str]) -> Self {
        GitStep {
            args: args.iter().map(|a| a.to_string()).collect(),
            tolerate_failure: false,
        }
    }

    fn tolerated(args: &[&str]) -> Self {
        GitStep {
            tolerate_failure: true,
            ..GitStep::new(args)
        }
    }
}

pub struct GitPublisher {
    program: String,
    /// Added with `git add -f` so they are pushed even when ignored.
    forced_paths: Vec<PathBuf>,
    step_timeout: Duration,
}

impl GitPublisher {
    pub fn new(forced_paths: Vec<PathBuf>, step_timeout: Duration) -> Self {
        Self::with_program("git", forced_paths, step_timeout)
    }

    pub fn with_program(program: &str, forced_paths: Vec<PathBuf>, step_timeout: Duration) -> Self {
        GitPublisher {
            program: program.to_string(),
            forced_paths,
            step_timeout,
        }
    }

    pub(crate) fn steps(
        &self,
        repo_path: &Path,
        remote_url: &str,
        branch: &str,
        trusted: bool,
    ) -> Vec<GitStep> {
        let mut steps = Vec::new();
        if !repo_path.join(".git").exists() {
            steps.push(GitStep::new(&["init"]));
        }
        if !trusted {
            let repo = repo_path.to_string_lossy();
            steps.push(GitStep::new(&["config", "--global", "--add", "safe.directory", &*repo]));
        }
        steps.push(GitStep::new(&["config", "user.email", COMMITTER_EMAIL]));
        steps.push(GitStep::new(&["config", "user.name", COMMITTER_NAME]));
        steps.push(GitStep::tolerated(&["remote", "remove", "origin"]));
        steps.push(GitStep::new(&["remote", "add", "origin", remote_url]));
        steps.push(GitStep::new(&["branch", "-M", branch]));
        steps.push(GitStep::new(&["add", "."]));
        for path in &self.forced_paths {
            let relative = path.strip_prefix(repo_path).unwrap_or(path).to_string_lossy();
            steps.push(GitStep::new(&["add", "-f", &*relative]));
        }
        steps.push(GitStep::tolerated(&["commit", "-m", COMMIT_MESSAGE]));
        steps.push(GitStep::new(&["push", "-f", "origin", branch]));
        steps
    }

    /// Whether the global `safe.directory` list already names `repo_path` (or `*`).
    /// Any failure to ask counts as "not listed".
    async fn is_trusted(&self, repo_path: &Path) -> bool {
        let mut command = Command::new(&self.program);
        command
            .args(["config", "--global", "--get-all", "safe.directory"])
            .stdin(Stdio::null())
            .kill_on_drop(true);

        match timeout(self.step_timeout, command.output()).await {
            Ok(Ok(output)) if output.status.success() => {
                let listed = String::from_utf8_lossy(&output.stdout);
                listed_as_safe(&listed, repo_path)
            }
            Ok(Ok(_)) => false,
            Ok(Err(e)) => {
                debug!("Could not read safe.directory: {}", e);
                false
            }
            Err(_) => false,
        }
    }

    /// Runs one step, appending its output to `transcript`. Returns whether it exited cleanly.
    async fn run_step(&self, repo_path: &Path, step: &GitStep, transcript: &mut String) -> bool {
        transcript.push_str(&format!("$ {} {}\n", self.program, step.args.join(" ")));
        debug!("Running {} {}", self.program, step.args[0]);

        let mut command = Command::new(&self.program);
        command
            .arg("-C")
            .arg(repo_path)
            .args(&step.args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .kill_on_drop(true);

        match timeout(self.step_timeout, command.output()).await {
            Ok(Ok(output)) => {
                transcript.push_str(&String::from_utf8_lossy(&output.stdout));
                transcript.push_str(&String::from_utf8_lossy(&output.stderr));
                output.status.success()
            }
            Ok(Err(e)) => {
                transcript.push_str(&format!("error: could not run {}: {}\n", self.program, e));
                false
            }
            Err(_) => {
                transcript.push_str(&format!(
                    "error: {} {} timed out after {}s\n",
                    self.program,
                    step.args[0],
                    self.step_timeout.as_secs()
                ));
                false
            }
        }
    }
}

#[async_trait]
impl VersionControlPublisher for GitPublisher {
    async fn publish(&self, repo_path: &Path, remote_url: &str, branch: &str) -> PublishTranscript {
        let mut output = String::new();
        let trusted = self.is_trusted(repo_path).await;
        for step in self.steps(repo_path, remote_url, branch, trusted) {
            let ok = self.run_step(repo_path, &step, &mut output).await;
            if !ok && !step.tolerate_failure {
                warn!("{} {} failed, stopping publish sequence", self.program, step.args[0]);
                return PublishTranscript {
                    output,
                    exit_success: Some(false),
                };
            }
        }
        PublishTranscript {
            output,
            exit_success: Some(true),
        }
    }
}

fn listed_as_safe(listed: &str, repo_path: &Path) -> bool {
    let repo = repo_path.to_string_lossy();
    listed
        .lines()
        .map(str::trim)
        .any(|entry| entry == "*" || entry == repo.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn publisher(program: &str, root: &Path) -> GitPublisher {
        GitPublisher::with_program(
            program,
            vec![root.join("backup_cursos.json")],
            Duration::from_secs(10),
        )
    }

    fn first_args(steps: &[GitStep]) -> Vec<String> {
        steps.iter().map(|s| s.args.join(" ")).collect()
    }

    #[test]
    fn sequence_for_a_fresh_directory() {
        let dir = tempfile::tempdir().unwrap();
        let git = publisher("git", dir.path());
        let steps = git.steps(dir.path(), "https://u:t@github.com/u/r.git", "main", false);
        let repo = dir.path().to_string_lossy();

        assert_eq!(
            first_args(&steps),
            vec![
                "init".to_string(),
                format!("config --global --add safe.directory {}", repo),
                "config user.email admin@cursos.com".to_string(),
                "config user.name Web Admin".to_string(),
                "remote remove origin".to_string(),
                "remote add origin https://u:t@github.com/u/r.git".to_string(),
                "branch -M main".to_string(),
                "add .".to_string(),
                "add -f backup_cursos.json".to_string(),
                "commit -m Backup Auto".to_string(),
                "push -f origin main".to_string(),
            ]
        );
        let tolerated: Vec<_> = steps
            .iter()
            .filter(|s| s.tolerate_failure)
            .map(|s| s.args[0].as_str())
            .collect();
        assert_eq!(tolerated, vec!["remote", "commit"]);
    }

    #[test]
    fn skips_init_when_repository_exists() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        let steps = publisher("git", dir.path()).steps(dir.path(), "url", "main", false);
        assert_ne!(steps[0].args[0], "init");
    }

    #[test]
    fn listed_directory_is_not_added_again() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        let steps = publisher("git", dir.path()).steps(dir.path(), "url", "main", true);
        assert!(steps.iter().all(|s| !s.args.iter().any(|a| a == "safe.directory")));
        assert_eq!(steps[0].args.join(" "), "config user.email admin@cursos.com");
    }

    #[test]
    fn reads_the_safe_directory_list() {
        let repo = Path::new("/srv/cursos");
        assert!(listed_as_safe("/home/x\n/srv/cursos\n", repo));
        assert!(listed_as_safe("*\n", repo));
        assert!(!listed_as_safe("/srv/cursos-old\n/srv\n", repo));
        assert!(!listed_as_safe("", repo));
    }

    #[tokio::test]
    async fn empty_safe_directory_list_is_not_trusted() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!publisher("true", dir.path()).is_trusted(dir.path()).await);
        assert!(!publisher("false", dir.path()).is_trusted(dir.path()).await);
    }

    #[tokio::test]
    async fn clean_run_reports_success() {
        let dir = tempfile::tempdir().unwrap();
        let transcript = publisher("true", dir.path())
            .publish(dir.path(), "https://u:t@github.com/u/r.git", "main")
            .await;
        assert_eq!(transcript.exit_success, Some(true));
        assert!(transcript.output.contains("$ true push -f origin main"));
    }

    #[tokio::test]
    async fn failing_step_stops_the_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let transcript = publisher("false", dir.path())
            .publish(dir.path(), "https://u:t@github.com/u/r.git", "main")
            .await;
        assert_eq!(transcript.exit_success, Some(false));
        assert!(transcript.output.contains("$ false init"));
        assert!(!transcript.output.contains("push"));
    }

    #[tokio::test]
    async fn missing_program_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let transcript = publisher("definitely-not-a-git-binary", dir.path())
            .publish(dir.path(), "url", "main")
            .await;
        assert_eq!(transcript.exit_success, Some(false));
        assert!(transcript.output.contains("error: could not run"));
    }
}
