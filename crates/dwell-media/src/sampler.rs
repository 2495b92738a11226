//! Sample-or-reuse scheduling of tracking queries.
//!
//! The tracking oracle is only queried on sample frames (frame 1 and every
//! `frame_skip`-th frame). Between samples the last render list is drawn again
//! unchanged, stale boxes and frozen durations included.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use dwell_models::{Detection, TrackedObject};

use crate::dwell::{DwellLedger, ViolationRegistry};
use crate::error::MediaResult;
use crate::oracle::TrackingOracle;
use crate::Frame;

/// `frame_index % frame_skip == 0 || frame_index == 1` for 1-based indices.
pub fn is_sample_frame(frame_index: u64, frame_skip: u64) -> bool {
    frame_index == 1 || frame_index % frame_skip.max(1) == 0
}

/// Outcome of one controller step.
#[derive(Debug, Clone)]
pub struct FrameStep {
    /// Whether the oracle was queried for this frame
    pub sampled: bool,
    /// Detections to draw on this frame
    pub render_list: Arc<[Detection]>,
    /// Identities that entered the violation registry on this frame
    pub new_violations: usize,
}

/// Owns the dwell ledger, the violation registry, the current render list and
/// the snapshot candidate.
#[derive(Debug)]
pub struct SamplingController {
    frame_skip: u64,
    ledger: DwellLedger,
    registry: ViolationRegistry,
    render_list: Arc<[Detection]>,
    snapshot: Option<Frame>,
    samples_taken: u64,
}

impl SamplingController {
    /// Create a controller for a fresh session.
    pub fn new(frame_skip: u64, stay_threshold: Duration) -> Self {
        Self {
            frame_skip: frame_skip.max(1),
            ledger: DwellLedger::new(stay_threshold),
            registry: ViolationRegistry::new(),
            render_list: Arc::from(Vec::new()),
            snapshot: None,
            samples_taken: 0,
        }
    }

    /// Process one frame: query the oracle on sample frames, reuse otherwise.
    pub async fn step(
        &mut self,
        frame_index: u64,
        frame: &Frame,
        timestamp: Duration,
        oracle: &mut dyn TrackingOracle,
    ) -> MediaResult<FrameStep> {
        if !is_sample_frame(frame_index, self.frame_skip) {
            return Ok(self.reuse());
        }

        let tracked = oracle.track(frame, true).await?;
        Ok(self.apply_sample(frame, &tracked, timestamp))
    }

    /// Skip step: hand back the previous render list untouched.
    pub fn reuse(&self) -> FrameStep {
        FrameStep {
            sampled: false,
            render_list: Arc::clone(&self.render_list),
            new_violations: 0,
        }
    }

    /// Sample step with the oracle's answer already in hand.
    ///
    /// Replaces the render list wholesale and keeps a copy of the raw frame
    /// as the snapshot candidate, even when nothing was tracked.
    pub fn apply_sample(
        &mut self,
        frame: &Frame,
        tracked: &[TrackedObject],
        timestamp: Duration,
    ) -> FrameStep {
        let mut new_violations = 0;
        let mut detections = Vec::with_capacity(tracked.len());

        for object in tracked {
            let record = self.ledger.observe(object.track_id, timestamp);
            let is_violating = self.ledger.is_violating(&record);
            if is_violating && self.registry.register(object.track_id) {
                new_violations += 1;
            }

            detections.push(Detection {
                rect: object.rect,
                track_id: object.track_id,
                dwell_secs: record.duration().as_secs_f64(),
                is_violating,
            });
        }

        debug!(
            tracked = detections.len(),
            new_violations,
            violations_total = self.registry.len(),
            "Sample point processed"
        );

        self.render_list = Arc::from(detections);
        self.snapshot = Some(frame.clone());
        self.samples_taken += 1;

        FrameStep {
            sampled: true,
            render_list: Arc::clone(&self.render_list),
            new_violations,
        }
    }

    /// Current render list.
    pub fn render_list(&self) -> &Arc<[Detection]> {
        &self.render_list
    }

    /// Raw copy of the most recently sampled frame.
    pub fn snapshot(&self) -> Option<&Frame> {
        self.snapshot.as_ref()
    }

    /// Take the snapshot candidate out of the controller.
    pub fn take_snapshot(&mut self) -> Option<Frame> {
        self.snapshot.take()
    }

    pub fn ledger(&self) -> &DwellLedger {
        &self.ledger
    }

    pub fn registry(&self) -> &ViolationRegistry {
        &self.registry
    }

    /// Number of distinct identities that ever violated.
    pub fn violation_count(&self) -> usize {
        self.registry.len()
    }

    /// Number of oracle queries made so far.
    pub fn samples_taken(&self) -> u64 {
        self.samples_taken
    }

    pub fn frame_skip(&self) -> u64 {
        self.frame_skip
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dwell_models::{PixelRect, TrackId};
    use image::Rgb;

    use crate::error::MediaError;

    /// Oracle that always reports the same objects and counts its calls.
    struct FixedOracle {
        objects: Vec<TrackedObject>,
        calls: Vec<bool>,
    }

    #[async_trait]
    impl TrackingOracle for FixedOracle {
        async fn track(&mut self, _frame: &Frame, persist: bool) -> MediaResult<Vec<TrackedObject>> {
            self.calls.push(persist);
            Ok(self.objects.clone())
        }
    }

    struct FailingOracle;

    #[async_trait]
    impl TrackingOracle for FailingOracle {
        async fn track(&mut self, _frame: &Frame, _persist: bool) -> MediaResult<Vec<TrackedObject>> {
            Err(MediaError::oracle_failed("model crashed"))
        }
    }

    fn frame(value: u8) -> Frame {
        Frame::from_pixel(8, 8, Rgb([value, value, value]))
    }

    fn object(id: u64, x: i32) -> TrackedObject {
        TrackedObject::new(PixelRect::new(x, 0, x + 4, 4), TrackId::new(id))
    }

    #[test]
    fn test_sample_schedule() {
        let sampled: Vec<u64> = (1..=12).filter(|&i| is_sample_frame(i, 5)).collect();
        assert_eq!(sampled, vec![1, 5, 10]);

        let every: Vec<u64> = (1..=3).filter(|&i| is_sample_frame(i, 1)).collect();
        assert_eq!(every, vec![1, 2, 3]);

        // A zero skip behaves like sampling every frame instead of dividing by zero
        assert!(is_sample_frame(7, 0));
    }

    #[tokio::test]
    async fn test_skipped_frames_reuse_previous_render_list() {
        let mut controller = SamplingController::new(5, Duration::from_secs(20));
        let mut oracle = FixedOracle {
            objects: vec![object(1, 0)],
            calls: Vec::new(),
        };

        let first = controller
            .step(1, &frame(0), Duration::ZERO, &mut oracle)
            .await
            .unwrap();
        assert!(first.sampled);

        for index in 2..=4 {
            let step = controller
                .step(index, &frame(index as u8), Duration::from_secs(index), &mut oracle)
                .await
                .unwrap();
            assert!(!step.sampled);
            assert!(Arc::ptr_eq(&step.render_list, &first.render_list));
        }

        let fifth = controller
            .step(5, &frame(5), Duration::from_secs(5), &mut oracle)
            .await
            .unwrap();
        assert!(fifth.sampled);
        assert!(!Arc::ptr_eq(&fifth.render_list, &first.render_list));
        assert_eq!(fifth.render_list[0].dwell_secs, 5.0);
        assert_eq!(oracle.calls, vec![true, true]);
    }

    #[test]
    fn test_durations_are_frozen_between_samples() {
        let mut controller = SamplingController::new(5, Duration::from_secs(20));
        controller.apply_sample(&frame(0), &[object(1, 0)], Duration::ZERO);
        controller.apply_sample(&frame(0), &[object(1, 0)], Duration::from_secs(4));

        let reused = controller.reuse();
        assert_eq!(reused.render_list[0].dwell_secs, 4.0);
    }

    #[test]
    fn test_empty_sample_discards_boxes_but_refreshes_snapshot() {
        let mut controller = SamplingController::new(5, Duration::from_secs(20));
        controller.apply_sample(&frame(10), &[object(1, 0), object(2, 4)], Duration::ZERO);
        assert_eq!(controller.render_list().len(), 2);

        let step = controller.apply_sample(&frame(99), &[], Duration::from_secs(1));
        assert!(step.render_list.is_empty());
        assert_eq!(controller.snapshot().unwrap().get_pixel(0, 0), &Rgb([99, 99, 99]));
        assert_eq!(controller.samples_taken(), 2);
    }

    #[test]
    fn test_violation_latch_survives_disappearance() {
        let mut controller = SamplingController::new(1, Duration::from_secs(20));
        controller.apply_sample(&frame(0), &[object(7, 0)], Duration::ZERO);
        let step = controller.apply_sample(&frame(0), &[object(7, 0)], Duration::from_secs(21));
        assert!(step.render_list[0].is_violating);
        assert_eq!(step.new_violations, 1);

        // Object leaves the scene; its membership does not reverse
        controller.apply_sample(&frame(0), &[], Duration::from_secs(30));
        assert!(controller.registry().contains(TrackId::new(7)));
        assert_eq!(controller.violation_count(), 1);

        // Seen again: still violating, not counted twice
        let again = controller.apply_sample(&frame(0), &[object(7, 0)], Duration::from_secs(31));
        assert_eq!(again.new_violations, 0);
        assert_eq!(controller.violation_count(), 1);
    }

    #[test]
    fn test_registry_subset_of_seen() {
        let mut controller = SamplingController::new(1, Duration::from_secs(2));
        controller.apply_sample(&frame(0), &[object(1, 0), object(2, 4)], Duration::ZERO);
        controller.apply_sample(&frame(0), &[object(1, 0)], Duration::from_secs(3));
        assert_eq!(controller.violation_count(), 1);
        for id in controller.registry().iter() {
            assert!(controller.ledger().get(id).is_some());
        }
    }

    #[tokio::test]
    async fn test_oracle_failure_propagates() {
        let mut controller = SamplingController::new(5, Duration::from_secs(20));
        let err = controller
            .step(1, &frame(0), Duration::ZERO, &mut FailingOracle)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::OracleFailure(_)));
        assert!(controller.snapshot().is_none());
    }

    #[tokio::test]
    async fn test_skip_frame_does_not_call_failing_oracle() {
        let mut controller = SamplingController::new(5, Duration::from_secs(20));
        let step = controller
            .step(2, &frame(0), Duration::ZERO, &mut FailingOracle)
            .await
            .unwrap();
        assert!(!step.sampled);
        assert!(step.render_list.is_empty());
    }
}
