//! Mock implementations of core port traits.

use std::sync::{Arc, Mutex, PoisonError};

use frame_redact_core::ports::{
    Detector, FrameSink, FrameSource, ProgressEvent, ProgressSink, ResultOutput,
};
use frame_redact_core::{Detections, Frame, RedactionReport};

#[derive(Debug, Clone)]
enum Behavior {
    Returns(Detections),
    Fails(String),
    NotReady,
}

/// Mock implementation of `Detector` for testing.
///
/// Returns canned detections (or fails) and counts calls.
pub struct MockDetector {
    behavior: Behavior,
    calls: Arc<Mutex<usize>>,
}

impl MockDetector {
    /// A detector that always reports `detections`.
    #[must_use]
    pub fn returning(detections: Detections) -> Self {
        Self::with_behavior(Behavior::Returns(detections))
    }

    /// A detector that reports no faces and no mask.
    #[must_use]
    pub fn empty() -> Self {
        Self::returning(Detections::default())
    }

    /// A detector whose `detect` always errors.
    #[must_use]
    pub fn failing(reason: &str) -> Self {
        Self::with_behavior(Behavior::Fails(reason.to_string()))
    }

    /// A detector whose models never became ready.
    #[must_use]
    pub fn not_ready() -> Self {
        Self::with_behavior(Behavior::NotReady)
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Returns the number of `detect` calls.
    #[must_use]
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Detector for MockDetector {
    fn is_ready(&self) -> bool {
        !matches!(self.behavior, Behavior::NotReady)
    }

    fn detect(&self, _frame: &Frame) -> anyhow::Result<Detections> {
        *self.calls.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        match &self.behavior {
            Behavior::Returns(detections) => Ok(detections.clone()),
            Behavior::Fails(reason) => Err(anyhow::anyhow!("{reason}")),
            Behavior::NotReady => Err(anyhow::anyhow!("detector not ready")),
        }
    }
}

/// Mock implementation of `FrameSource` for testing.
///
/// Yields pre-built frames and tracks iteration for assertions.
pub struct MockFrameSource {
    frames: Vec<Frame>,
    iteration_count: Arc<Mutex<usize>>,
}

impl MockFrameSource {
    /// Creates a new mock source with the given frames.
    #[must_use]
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames,
            iteration_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates an empty mock source.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Returns the number of times the source has been iterated.
    #[must_use]
    pub fn iteration_count(&self) -> usize {
        *self
            .iteration_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl FrameSource for MockFrameSource {
    fn frames(&self) -> Box<dyn Iterator<Item = anyhow::Result<Frame>> + Send + '_> {
        *self
            .iteration_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner) += 1;
        Box::new(self.frames.iter().cloned().map(Ok))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.frames.len())
    }
}

/// Mock implementation of `FrameSink` for testing.
///
/// Captures written frames.
#[derive(Default)]
pub struct MockFrameSink {
    frames: Arc<Mutex<Vec<Frame>>>,
}

impl MockFrameSink {
    /// Creates a new mock sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all captured frames.
    #[must_use]
    pub fn frames(&self) -> Vec<Frame> {
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl FrameSink for MockFrameSink {
    fn write(&self, frame: &Frame) -> anyhow::Result<Option<String>> {
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(frame.clone());
        Ok(None)
    }
}

/// Mock implementation of `ResultOutput` for testing.
///
/// Captures reports for later assertions.
#[derive(Default)]
pub struct MockResultOutput {
    reports: Arc<Mutex<Vec<RedactionReport>>>,
    flush_count: Arc<Mutex<usize>>,
}

impl MockResultOutput {
    /// Creates a new mock output.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all captured reports.
    #[must_use]
    pub fn reports(&self) -> Vec<RedactionReport> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of times `flush()` was called.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        *self
            .flush_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ResultOutput for MockResultOutput {
    fn write(&self, report: &RedactionReport) -> anyhow::Result<()> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report.clone());
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        *self
            .flush_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}

/// Mock implementation of `ProgressSink` for testing.
///
/// Captures events for later assertions.
#[derive(Default)]
pub struct MockProgressSink {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl MockProgressSink {
    /// Creates a new mock progress sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of `Completed` events.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Completed { .. }))
            .count()
    }

    /// Returns the number of `Skipped` events.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Skipped { .. }))
            .count()
    }

    /// Returns the final counts from the `Finished` event, if any.
    #[must_use]
    pub fn finished_counts(&self) -> Option<(usize, usize)> {
        self.events().iter().find_map(|e| match e {
            ProgressEvent::Finished { processed, skipped } => Some((*processed, *skipped)),
            _ => None,
        })
    }
}

impl ProgressSink for MockProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
