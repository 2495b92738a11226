//! Session progress publication.
//!
//! The pipeline is the only writer. Every update replaces the whole
//! [`SessionState`] snapshot, so pollers always read a consistent record.

use std::sync::Arc;

use tokio::sync::watch;

use dwell_models::SessionState;

/// Shared handle for publishing and reading session progress.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    tx: Arc<watch::Sender<SessionState>>,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter {
    /// New reporter in the idle state.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionState::default());
        Self { tx: Arc::new(tx) }
    }

    /// Start a new session with the given frame count. Counters are zeroed.
    pub fn reset(&self, total_frames: u64) {
        self.tx.send_replace(SessionState::started(total_frames));
    }

    /// Record that `frame_index` (1-based) has been written.
    pub fn advance(&self, frame_index: u64) {
        self.tx.send_modify(|state| *state = state.advanced(frame_index));
    }

    /// Mark the session completed with progress at 100.
    pub fn complete(&self) {
        self.tx.send_modify(|state| *state = state.completed());
    }

    /// Mark the session failed. Counters keep their last values.
    pub fn fail(&self) {
        self.tx.send_modify(|state| *state = state.failed());
    }

    /// Copy of the latest published state.
    pub fn snapshot(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    /// Receiver that is notified of every published state.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dwell_models::SessionStatus;

    #[test]
    fn test_initial_state_is_idle() {
        let reporter = ProgressReporter::new();
        let state = reporter.snapshot();
        assert_eq!(state.status, SessionStatus::Idle);
        assert_eq!(state.progress, 0.0);
    }

    #[test]
    fn test_lifecycle() {
        let reporter = ProgressReporter::new();
        reporter.reset(200);
        reporter.advance(50);
        let state = reporter.snapshot();
        assert_eq!(state.status, SessionStatus::Processing);
        assert_eq!(state.current_frame, 50);
        assert_eq!(state.progress, 25.0);

        reporter.complete();
        let state = reporter.snapshot();
        assert_eq!(state.status, SessionStatus::Completed);
        assert_eq!(state.progress, 100.0);
    }

    #[test]
    fn test_unknown_total_keeps_progress_at_zero() {
        let reporter = ProgressReporter::new();
        reporter.reset(0);
        reporter.advance(12);
        assert_eq!(reporter.snapshot().progress, 0.0);
        assert_eq!(reporter.snapshot().current_frame, 12);
    }

    #[test]
    fn test_reset_after_failure() {
        let reporter = ProgressReporter::new();
        reporter.reset(10);
        reporter.advance(3);
        reporter.fail();
        assert_eq!(reporter.snapshot().status, SessionStatus::Error);

        reporter.reset(20);
        let state = reporter.snapshot();
        assert_eq!(state.status, SessionStatus::Processing);
        assert_eq!(state.current_frame, 0);
        assert_eq!(state.total_frames, 20);
    }

    #[tokio::test]
    async fn test_polling_reader_sees_non_decreasing_frames() {
        let reporter = ProgressReporter::new();
        let mut rx = reporter.subscribe();
        reporter.reset(1_000);

        let writer = {
            let reporter = reporter.clone();
            tokio::spawn(async move {
                for frame in 1..=1_000 {
                    reporter.advance(frame);
                    if frame % 100 == 0 {
                        tokio::task::yield_now().await;
                    }
                }
                reporter.complete();
            })
        };

        let mut last = 0;
        loop {
            let state = rx.borrow_and_update().clone();
            assert!(state.current_frame >= last);
            last = state.current_frame;
            if state.is_terminal() {
                break;
            }
            if rx.changed().await.is_err() {
                break;
            }
        }

        writer.await.unwrap();
        assert_eq!(reporter.snapshot().current_frame, 1_000);
    }
}
