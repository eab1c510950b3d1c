//! The capture loop: read, detect, annotate, save, preview.
//!
//! A [`CaptureSession`] owns the camera, the classifier and the preview
//! surface for its whole lifetime. Automatic saves are gated by a
//! [`Cooldown`] stored on the session; manual saves bypass it.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use log::{debug, error, info};
use opencv::core::Mat;

use crate::annotate::{detection_overlays, draw_overlays, status_overlay};
use crate::camera::{mirror_horizontal, CameraError, FrameSource};
use crate::detection::{DetectError, Detector};
use crate::photos::{CaptureReason, PhotoError, PhotoStore};
use crate::preview::{KeyAction, Preview, PreviewError};

/// Default minimum time between automatic saves.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(5);

/// Minimum-interval gate for automatic saves.
///
/// The last-fire instant only moves forward, and only when [`Cooldown::mark`]
/// is called after a save actually happened.
#[derive(Debug, Clone)]
pub struct Cooldown {
    period: Duration,
    last: Option<Instant>,
}

impl Cooldown {
    pub fn new(period: Duration) -> Self {
        Self { period, last: None }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Instant of the last recorded save, if any.
    pub fn last(&self) -> Option<Instant> {
        self.last
    }

    /// True if nothing has fired yet or strictly more than the period has
    /// elapsed since the last fire.
    pub fn ready(&self, now: Instant) -> bool {
        match self.last {
            None => true,
            Some(last) => now.saturating_duration_since(last) > self.period,
        }
    }

    /// Record a save at `now`. Instants earlier than the current one are ignored.
    pub fn mark(&mut self, now: Instant) {
        if self.last.is_none_or(|last| now >= last) {
            self.last = Some(now);
        }
    }
}

impl Default for Cooldown {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}

/// Why the capture loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// `q` was pressed
    Quit,
    /// Ctrl+C
    Interrupted,
    /// The camera stopped delivering frames
    ReadFailed,
}

/// Errors that end a capture session early.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Camera(#[from] CameraError),

    #[error(transparent)]
    Detect(#[from] DetectError),

    #[error(transparent)]
    Photo(#[from] PhotoError),

    #[error(transparent)]
    Preview(#[from] PreviewError),

    #[error("Failed to draw overlays: {0}")]
    Render(#[from] opencv::Error),
}

/// Result of processing one frame.
#[derive(Debug)]
pub struct FrameOutcome {
    /// Mirrored and annotated frame, ready for preview
    pub frame: Mat,
    /// Number of detected regions
    pub detections: usize,
    /// Path of the automatic save this frame triggered, if any
    pub saved: Option<PathBuf>,
}

/// Counters for a finished or running session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub frames: u64,
    pub auto_saves: u64,
    pub manual_saves: u64,
    /// Automatic saves that were due but could not be written
    pub failed_saves: u64,
}

/// Knobs for a capture session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub cooldown: Duration,
    pub mirror: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            cooldown: DEFAULT_COOLDOWN,
            mirror: true,
        }
    }
}

/// A running capture/detect/save loop over one camera.
pub struct CaptureSession<S: FrameSource, D: Detector, P: Preview> {
    source: S,
    detector: D,
    preview: P,
    store: PhotoStore,
    cooldown: Cooldown,
    // Limits "save failed" errors to one per cooldown period
    failure_log: Cooldown,
    mirror: bool,
    stats: SessionStats,
}

impl<S: FrameSource, D: Detector, P: Preview> CaptureSession<S, D, P> {
    pub fn new(
        source: S,
        detector: D,
        preview: P,
        store: PhotoStore,
        options: SessionOptions,
    ) -> Self {
        Self {
            source,
            detector,
            preview,
            store,
            cooldown: Cooldown::new(options.cooldown),
            failure_log: Cooldown::new(options.cooldown),
            mirror: options.mirror,
            stats: SessionStats::default(),
        }
    }

    pub fn cooldown(&self) -> &Cooldown {
        &self.cooldown
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Mirror, detect, annotate and (cooldown permitting) save one frame.
    ///
    /// `now` drives the cooldown; the file name uses the wall clock.
    pub fn process_frame(
        &mut self,
        frame: Mat,
        now: Instant,
    ) -> Result<FrameOutcome, SessionError> {
        let mut frame = if self.mirror {
            mirror_horizontal(&frame)?
        } else {
            frame
        };
        self.stats.frames += 1;

        let detections = self.detector.detect(&frame)?;
        let mut saved = None;

        if !detections.is_empty() {
            draw_overlays(&mut frame, &detection_overlays(&detections))?;

            if self.cooldown.ready(now) {
                match self.store.save_now(&frame, CaptureReason::Auto) {
                    Ok(path) => {
                        self.cooldown.mark(now);
                        self.stats.auto_saves += 1;
                        saved = Some(path);
                    }
                    Err(e) => self.report_save_failure(&e, now),
                }
            } else {
                debug!("Detection during cooldown, not saving");
            }
        }

        draw_overlays(&mut frame, &[status_overlay(detections.len())])?;

        Ok(FrameOutcome {
            frame,
            detections: detections.len(),
            saved,
        })
    }

    // The cooldown stays untouched, so the next detection retries the save.
    fn report_save_failure(&mut self, e: &PhotoError, now: Instant) {
        self.stats.failed_saves += 1;
        if self.failure_log.ready(now) {
            self.failure_log.mark(now);
            error!("Failed to save photo: {}", e);
        } else {
            debug!("Failed to save photo again ({} so far): {}", self.stats.failed_saves, e);
        }
    }

    /// Save `frame` right away, ignoring the cooldown.
    pub fn save_manual(&mut self, frame: &Mat) -> Result<PathBuf, SessionError> {
        let path = self.store.save_now(frame, CaptureReason::Manual)?;
        self.stats.manual_saves += 1;
        Ok(path)
    }

    /// Run until `q`, a read failure, or `stop` is raised.
    ///
    /// The camera is released and the preview closed before this returns,
    /// whatever the outcome.
    pub fn run(&mut self, stop: &AtomicBool) -> Result<StopReason, SessionError> {
        let result = self.run_loop(stop);
        self.close();
        match &result {
            Ok(reason) => info!("Capture loop stopped: {:?} ({:?})", reason, self.stats),
            Err(e) => error!("Capture loop failed: {}", e),
        }
        result
    }

    fn run_loop(&mut self, stop: &AtomicBool) -> Result<StopReason, SessionError> {
        loop {
            if stop.load(Ordering::SeqCst) {
                return Ok(StopReason::Interrupted);
            }

            let frame = match self.source.read_frame() {
                Ok(frame) => frame,
                Err(e) => {
                    error!("{}", e);
                    return Ok(StopReason::ReadFailed);
                }
            };

            let outcome = self.process_frame(frame, Instant::now())?;
            self.preview.show(&outcome.frame)?;

            match self.preview.poll_key()? {
                KeyAction::Quit => return Ok(StopReason::Quit),
                KeyAction::Save => {
                    if let Err(e) = self.save_manual(&outcome.frame) {
                        error!("Failed to save photo: {}", e);
                    }
                }
                KeyAction::Continue => {}
            }
        }
    }

    /// Release the camera and close the preview.
    pub fn close(&mut self) {
        self.source.release();
        self.preview.close();
    }
}

impl<S: FrameSource, D: Detector, P: Preview> Drop for CaptureSession<S, D, P> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::HeadlessPreview;
    use opencv::core::{Rect, Scalar, CV_8UC3};
    use opencv::prelude::*;

    struct NoFrames;

    impl FrameSource for NoFrames {
        fn read_frame(&mut self) -> Result<Mat, CameraError> {
            Err(CameraError::NotFrame)
        }

        fn release(&mut self) {}
    }

    struct AlwaysCat;

    impl Detector for AlwaysCat {
        fn detect(&mut self, _frame: &Mat) -> Result<Vec<Rect>, DetectError> {
            Ok(vec![Rect::new(10, 10, 20, 20)])
        }
    }

    fn frame() -> Mat {
        Mat::new_rows_cols_with_default(60, 80, CV_8UC3, Scalar::all(0.0)).unwrap()
    }

    #[test]
    fn test_cooldown_fires_first_time() {
        let cooldown = Cooldown::default();
        assert!(cooldown.ready(Instant::now()));
        assert!(cooldown.last().is_none());
        assert_eq!(cooldown.period(), Duration::from_secs(5));
    }

    #[test]
    fn test_cooldown_blocks_within_period() {
        let start = Instant::now();
        let mut cooldown = Cooldown::new(Duration::from_secs(5));
        cooldown.mark(start);

        assert!(!cooldown.ready(start));
        assert!(!cooldown.ready(start + Duration::from_secs(3)));
        // Exactly the period is not enough; it must be exceeded
        assert!(!cooldown.ready(start + Duration::from_secs(5)));
        assert!(cooldown.ready(start + Duration::from_millis(5001)));
    }

    #[test]
    fn test_cooldown_never_moves_backwards() {
        let start = Instant::now();
        let mut cooldown = Cooldown::new(Duration::from_secs(5));
        cooldown.mark(start + Duration::from_secs(10));
        cooldown.mark(start);
        assert_eq!(cooldown.last(), Some(start + Duration::from_secs(10)));
    }

    #[test]
    fn test_cooldown_ready_with_earlier_instant() {
        let start = Instant::now() + Duration::from_secs(60);
        let mut cooldown = Cooldown::new(Duration::from_secs(5));
        cooldown.mark(start);
        // A clock reading before the last save counts as zero elapsed
        assert!(!cooldown.ready(start - Duration::from_secs(30)));
    }

    #[test]
    fn test_session_options_default() {
        let options = SessionOptions::default();
        assert_eq!(options.cooldown, DEFAULT_COOLDOWN);
        assert!(options.mirror);
    }

    #[test]
    fn test_save_failure_logged_once_per_period() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("photos");
        let store = PhotoStore::create(&dir).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        let mut session = CaptureSession::new(
            NoFrames,
            AlwaysCat,
            HeadlessPreview,
            store,
            SessionOptions::default(),
        );
        let t0 = Instant::now();

        session.process_frame(frame(), t0).unwrap();
        assert_eq!(session.failure_log.last(), Some(t0));

        // Repeats inside the period are counted but not logged as errors
        let t1 = t0 + Duration::from_secs(2);
        session.process_frame(frame(), t1).unwrap();
        assert_eq!(session.failure_log.last(), Some(t0));
        assert_eq!(session.stats().failed_saves, 2);

        let t2 = t0 + Duration::from_secs(6);
        session.process_frame(frame(), t2).unwrap();
        assert_eq!(session.failure_log.last(), Some(t2));
        assert_eq!(session.stats().failed_saves, 3);

        // The save cooldown never started
        assert!(session.cooldown().last().is_none());
        assert_eq!(session.stats().auto_saves, 0);
    }
}
