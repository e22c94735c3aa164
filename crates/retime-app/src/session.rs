//! One-build-at-a-time session.
//!
//! A new request cancels whatever build is still running and clears the
//! published timeline. A build publishes its result only if it is still the
//! latest request when it finishes; anything older is dropped.

use anyhow::{bail, Result};
use parking_lot::Mutex;
use retime_core::Error;
use retime_timeline::{BuildCancel, BuildStrategy, SourceClip, Timeline, TimelineBuilder};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// A timeline that survived to publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub generation: u64,
    pub strategy: BuildStrategy,
    pub timeline: Timeline,
}

#[derive(Default)]
struct SessionState {
    generation: u64,
    cancel: Option<BuildCancel>,
    task: Option<JoinHandle<()>>,
    current: Option<Published>,
    failure: Option<String>,
}

/// Runs builds on tokio's blocking pool, keeping only the latest.
pub struct BuildSession {
    builder: Arc<TimelineBuilder>,
    source: Arc<SourceClip>,
    state: Arc<Mutex<SessionState>>,
}

impl BuildSession {
    pub fn new(builder: TimelineBuilder, source: SourceClip) -> Self {
        Self {
            builder: Arc::new(builder),
            source: Arc::new(source),
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    /// Start a build, superseding any in flight. Returns its generation.
    ///
    /// Must be called from within a tokio runtime.
    pub fn request(&self, strategy: BuildStrategy) -> u64 {
        let mut state = self.state.lock();
        if let Some(previous) = state.cancel.take() {
            previous.cancel();
            debug!(generation = state.generation, "Cancelled previous build");
        }

        state.generation += 1;
        state.current = None;
        state.failure = None;
        let generation = state.generation;

        let cancel = BuildCancel::new();
        state.cancel = Some(cancel.clone());

        let builder = Arc::clone(&self.builder);
        let source = Arc::clone(&self.source);
        let shared = Arc::clone(&self.state);
        info!(generation, %strategy, "Build requested");

        state.task = Some(tokio::task::spawn_blocking(move || {
            let result = builder.build(strategy, &source, &cancel);
            let mut state = shared.lock();
            let latest = should_publish(state.generation, generation, &cancel);
            match result {
                Ok(timeline) if latest => {
                    state.cancel = None;
                    state.current = Some(Published {
                        generation,
                        strategy,
                        timeline,
                    });
                }
                Ok(_) | Err(Error::Cancelled) => {
                    debug!(generation, "Discarded superseded build");
                }
                Err(e) => {
                    warn!(generation, error = %e, "Build failed");
                    if latest {
                        state.cancel = None;
                        state.failure = Some(e.to_string());
                    }
                }
            }
        }));

        generation
    }

    /// Wait for the latest request to settle and return what it published.
    pub async fn wait(&self) -> Result<Option<Published>> {
        loop {
            // lock released before awaiting
            let task = self.state.lock().task.take();
            match task {
                Some(task) => {
                    if let Err(e) = task.await {
                        warn!(error = %e, "Build task did not complete");
                    }
                }
                None => break,
            }
        }

        let state = self.state.lock();
        if let Some(failure) = &state.failure {
            bail!("build {} failed: {}", state.generation, failure);
        }
        Ok(state.current.clone())
    }

    /// The published timeline, if the latest build has finished.
    pub fn current(&self) -> Option<Published> {
        self.state.lock().current.clone()
    }

    /// Generation of the latest request.
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }
}

/// A finished build may publish only if nothing superseded or cancelled it.
fn should_publish(current_generation: u64, generation: u64, cancel: &BuildCancel) -> bool {
    current_generation == generation && !cancel.is_cancelled()
}

#[cfg(test)]
mod tests {
    use super::*;
    use retime_core::MediaTime;

    fn session(duration: MediaTime) -> BuildSession {
        BuildSession::new(TimelineBuilder::default(), SourceClip::audio("Sound.aac", duration))
    }

    #[tokio::test]
    async fn test_single_request_publishes() {
        let session = session(MediaTime::new(10, 1));
        let generation = session.request(BuildStrategy::TotalSpeed);

        let published = session.wait().await.unwrap().unwrap();
        assert_eq!(published.generation, generation);
        assert_eq!(published.strategy, BuildStrategy::TotalSpeed);
        assert_eq!(published.timeline.duration(), MediaTime::new(10, 1));
        assert_eq!(session.current(), Some(published));
    }

    #[tokio::test]
    async fn test_newer_request_supersedes_older() {
        let session = session(MediaTime::new(441_001, 44100));
        session.request(BuildStrategy::SequentialSpeed);
        let latest = session.request(BuildStrategy::TotalSpeed);

        let published = session.wait().await.unwrap().unwrap();
        assert_eq!(published.generation, latest);
        assert_eq!(published.strategy, BuildStrategy::TotalSpeed);
        assert_eq!(session.generation(), 2);
    }

    #[tokio::test]
    async fn test_request_clears_published_timeline() {
        let session = session(MediaTime::new(10, 1));
        session.request(BuildStrategy::TotalSpeed);
        session.wait().await.unwrap();
        assert!(session.current().is_some());

        session.request(BuildStrategy::SequentialSpeed);
        let published = session.wait().await.unwrap().unwrap();
        assert_eq!(published.strategy, BuildStrategy::SequentialSpeed);
    }

    #[test]
    fn test_should_publish_latest_uncancelled_only() {
        let cancel = BuildCancel::new();
        assert!(should_publish(2, 2, &cancel));
        // superseded by a newer request
        assert!(!should_publish(3, 2, &cancel));

        cancel.cancel();
        assert!(!should_publish(2, 2, &cancel));
    }

    #[tokio::test]
    async fn test_superseded_build_does_not_overwrite() {
        let session = session(MediaTime::new(441_001, 44100));
        let first = session.request(BuildStrategy::SequentialSpeed);
        let latest = session.request(BuildStrategy::TotalSpeed);
        let published = session.wait().await.unwrap().unwrap();

        // let the superseded build finish on the blocking pool, whenever it runs
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let current = session.current().unwrap();
        assert_ne!(current.generation, first);
        assert_eq!(current.generation, latest);
        assert_eq!(current, published);
    }

    #[tokio::test]
    async fn test_failure_is_reported() {
        let session = session(MediaTime::new(-5, 1));
        session.request(BuildStrategy::SequentialSpeed);
        assert!(session.wait().await.is_err());
        assert!(session.current().is_none());
    }

    #[tokio::test]
    async fn test_missing_track_publishes_empty_timeline() {
        let session = BuildSession::new(
            TimelineBuilder::default(),
            SourceClip::without_audio("video.mov", MediaTime::new(10, 1)),
        );
        session.request(BuildStrategy::TotalSpeed);
        let published = session.wait().await.unwrap().unwrap();
        assert!(published.timeline.is_empty());
    }
}
