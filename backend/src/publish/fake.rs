//! Test double that returns a canned transcript and records its calls.

use super::{PublishTranscript, VersionControlPublisher};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

pub(crate) struct FakePublisher {
    transcript: PublishTranscript,
    calls: StdMutex<Vec<(PathBuf, String, String)>>,
    in_flight: AtomicUsize,
    pub(crate) max_in_flight: AtomicUsize,
}

impl FakePublisher {
    pub(crate) fn new(output: &str, exit_success: Option<bool>) -> Arc<Self> {
        Arc::new(FakePublisher {
            transcript: PublishTranscript {
                output: output.to_string(),
                exit_success,
            },
            calls: StdMutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        })
    }

    pub(crate) fn calls(&self) -> Vec<(PathBuf, String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl VersionControlPublisher for FakePublisher {
    async fn publish(&self, repo_path: &Path, remote_url: &str, branch: &str) -> PublishTranscript {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.calls.lock().unwrap().push((
            repo_path.to_path_buf(),
            remote_url.to_string(),
            branch.to_string(),
        ));
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.transcript.clone()
    }
}
