//! # Publish Workflow
//!
//! Exports the whole catalog to the backup file and force-pushes the project
//! directory to the configured remote repository.
//!
//! ## Steps
//!
//! 1.  **Export**: every course is encoded with `backup::codec` and written to the
//!     backup file through a temporary file and a rename, so readers never see a
//!     half-written backup. A failure here ends the workflow with `CatalogError::Export`.
//!
//! 2.  **Credentials**: without a user name and token the workflow stops with a
//!     `MissingCredentials` result. The backup file is still written.
//!
//! 3.  **Push**: a `VersionControlPublisher` (`git::GitPublisher` in production)
//!     runs the push sequence against the project root and returns its transcript.
//!
//! 4.  **Redaction**: the token, raw and percent-encoded, is masked in the transcript before it is logged or
//!     returned.
//!
//! 5.  **Classification**: the publisher's exit status decides success when it
//!     reports one; otherwise the transcript is scanned for `error:` / `fatal:`.
//!
//! Only one publish runs at a time; concurrent callers queue on an async mutex.

#[cfg(test)]
pub(crate) mod fake;
pub mod git;

use crate::backup::codec;
use crate::config::PublishSettings;
use crate::error::CatalogError;
use crate::store::CourseStore;
use async_trait::async_trait;
use log::{error, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

pub const MASK: &str = "******";
const FAILURE_MARKERS: [&str; 2] = ["error:", "fatal:"];

/// What a publisher hands back after running its push sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishTranscript {
    /// Combined stdout and stderr of the whole sequence.
    pub output: String,
    /// `Some` when the publisher knows the real exit status of the sequence.
    pub exit_success: Option<bool>,
}

#[async_trait]
pub trait VersionControlPublisher: Send + Sync {
    async fn publish(&self, repo_path: &Path, remote_url: &str, branch: &str) -> PublishTranscript;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Published,
    MissingCredentials,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishResult {
    pub success: bool,
    /// Always redacted.
    pub transcript: String,
    pub outcome: PublishOutcome,
}

impl PublishResult {
    fn missing_credentials(backup_path: &Path) -> Self {
        PublishResult {
            success: false,
            transcript: format!(
                "Missing credentials: GITHUB_USER and GITHUB_TOKEN must be set. \
                 The backup was written to {} but nothing was pushed.",
                backup_path.display()
            ),
            outcome: PublishOutcome::MissingCredentials,
        }
    }

    /// The redacted transcript on success, the matching `CatalogError` otherwise.
    pub fn into_result(self) -> Result<String, CatalogError> {
        match self.outcome {
            PublishOutcome::Published => Ok(self.transcript),
            PublishOutcome::MissingCredentials => Err(CatalogError::MissingCredentials),
            PublishOutcome::Failed => Err(CatalogError::PublishFailed {
                transcript: self.transcript,
            }),
        }
    }
}

/// Replaces every literal occurrence of `secret` with `MASK`.
pub fn redact(text: &str, secret: &str) -> String {
    if secret.is_empty() {
        return text.to_string();
    }
    text.replace(secret, MASK)
}

/// Decides whether a push sequence succeeded.
pub fn classify(exit_success: Option<bool>, output: &str) -> bool {
    match exit_success {
        Some(ok) => ok,
        None => !FAILURE_MARKERS.iter().any(|marker| output.contains(marker)),
    }
}

/// Percent-encodes everything outside the URL "unreserved" set.
pub fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for b in input.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

/// Credentials are percent-encoded so `@`, `:` or `/` in a token cannot break the URL.
pub fn remote_url(settings: &PublishSettings, username: &str, token: &str) -> String {
    let user = percent_encode(username);
    format!(
        "https://{}:{}@{}/{}/{}.git",
        user,
        percent_encode(token),
        settings.host,
        user,
        settings.repository
    )
}

/// Writes the whole catalog to `path` and returns how many courses were written.
pub fn export_backup(store: &dyn CourseStore, path: &Path) -> Result<usize, CatalogError> {
    let courses = store
        .list()
        .map_err(|e| CatalogError::Export(format!("cannot read courses: {e}")))?;
    let json = codec::to_pretty_json(&codec::encode(&courses))
        .map_err(|e| CatalogError::Export(e.to_string()))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let write_err = |e: std::io::Error| {
        CatalogError::Export(format!("cannot write {}: {e}", path.display()))
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(json.as_bytes()).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(courses.len())
}

pub struct PublishWorkflow {
    store: Arc<dyn CourseStore>,
    backup_path: PathBuf,
    repo_root: PathBuf,
    settings: PublishSettings,
    publisher: Arc<dyn VersionControlPublisher>,
    running: Mutex<()>,
}

impl PublishWorkflow {
    pub fn new(
        store: Arc<dyn CourseStore>,
        backup_path: PathBuf,
        repo_root: PathBuf,
        settings: PublishSettings,
        publisher: Arc<dyn VersionControlPublisher>,
    ) -> Self {
        PublishWorkflow {
            store,
            backup_path,
            repo_root,
            settings,
            publisher,
            running: Mutex::new(()),
        }
    }

    pub async fn publish(&self) -> Result<PublishResult, CatalogError> {
        let _running = self.running.lock().await;

        let store = self.store.clone();
        let backup_path = self.backup_path.clone();
        let exported = tokio::task::spawn_blocking(move || export_backup(store.as_ref(), &backup_path))
            .await
            .map_err(|e| CatalogError::Export(format!("join error: {e}")))??;
        info!("Exported {} courses to {}", exported, self.backup_path.display());

        let (username, token) = match (&self.settings.username, &self.settings.token) {
            (Some(user), Some(token)) if !user.is_empty() && !token.is_empty() => (user, token),
            _ => {
                warn!("Publish refused: missing GITHUB_USER or GITHUB_TOKEN");
                return Ok(PublishResult::missing_credentials(&self.backup_path));
            }
        };

        let url = remote_url(&self.settings, username, token);
        let raw = self
            .publisher
            .publish(&self.repo_root, &url, &self.settings.branch)
            .await;

        // git may echo either spelling of the token back
        let transcript = redact(&redact(&raw.output, &percent_encode(token)), token);
        let success = classify(raw.exit_success, &raw.output);
        if success {
            info!(
                "Published {} to {}/{}",
                self.repo_root.display(),
                username,
                self.settings.repository
            );
        } else {
            error!("Publish failed:\n{}", transcript);
        }

        Ok(PublishResult {
            success,
            transcript,
            outcome: if success {
                PublishOutcome::Published
            } else {
                PublishOutcome::Failed
            },
        })
    }
}
