//! One-shot connectivity check run before the capture loop.
//!
//! Opens the camera, reads a frame, converts it to grayscale and loads the
//! classifier. Each step is reported on its own; steps that need a failed
//! predecessor are skipped. Nothing is retried.

use std::fmt;
use std::path::PathBuf;

use log::debug;

use crate::camera::{frame_resolution, to_grayscale, CameraError, FrameSource};
use crate::detection::DetectError;

/// A step of the connectivity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStep {
    OpenCamera,
    ReadFrame,
    ConvertColor,
    LoadClassifier,
}

impl fmt::Display for CheckStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CheckStep::OpenCamera => "Open camera",
            CheckStep::ReadFrame => "Read frame",
            CheckStep::ConvertColor => "Image processing",
            CheckStep::LoadClassifier => "Cat classifier",
        };
        f.write_str(name)
    }
}

/// Outcome of a single step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Passed(String),
    Failed(String),
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    pub step: CheckStep,
    pub status: StepStatus,
}

/// Results of every step, in execution order.
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    steps: Vec<StepResult>,
}

impl CheckReport {
    fn record(&mut self, step: CheckStep, status: StepStatus) {
        self.steps.push(StepResult { step, status });
    }

    pub fn steps(&self) -> &[StepResult] {
        &self.steps
    }

    pub fn status(&self, step: CheckStep) -> Option<&StepStatus> {
        self.steps.iter().find(|r| r.step == step).map(|r| &r.status)
    }

    pub fn all_passed(&self) -> bool {
        !self.steps.is_empty()
            && self
                .steps
                .iter()
                .all(|r| matches!(r.status, StepStatus::Passed(_)))
    }

    /// Process exit status: 0 when every step passed, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.all_passed() {
            0
        } else {
            1
        }
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for result in &self.steps {
            match &result.status {
                StepStatus::Passed(detail) => writeln!(f, "[ OK ] {}: {}", result.step, detail)?,
                StepStatus::Failed(reason) => writeln!(f, "[FAIL] {}: {}", result.step, reason)?,
                StepStatus::Skipped => writeln!(f, "[SKIP] {}", result.step)?,
            }
        }
        if self.all_passed() {
            write!(f, "All checks passed. Ready to detect cats!")
        } else {
            write!(f, "Some checks failed.")
        }
    }
}

/// Run the check.
///
/// `open_camera` and `load_classifier` are called at most once each; the
/// classifier is loaded even when the camera is unavailable. The camera is
/// released before returning.
pub fn run_check<S, O, L>(open_camera: O, load_classifier: L) -> CheckReport
where
    S: FrameSource,
    O: FnOnce() -> Result<S, CameraError>,
    L: FnOnce() -> Result<PathBuf, DetectError>,
{
    let mut report = CheckReport::default();

    match open_camera() {
        Ok(mut camera) => {
            report.record(
                CheckStep::OpenCamera,
                StepStatus::Passed("Camera opened successfully".to_string()),
            );
            check_frame(&mut camera, &mut report);
            camera.release();
        }
        Err(e) => {
            report.record(CheckStep::OpenCamera, StepStatus::Failed(e.to_string()));
            report.record(CheckStep::ReadFrame, StepStatus::Skipped);
            report.record(CheckStep::ConvertColor, StepStatus::Skipped);
        }
    }

    match load_classifier() {
        Ok(path) => report.record(
            CheckStep::LoadClassifier,
            StepStatus::Passed(format!("Loaded {}", path.display())),
        ),
        Err(e) => report.record(CheckStep::LoadClassifier, StepStatus::Failed(e.to_string())),
    }

    debug!("Connectivity check finished: {:?}", report.steps);
    report
}

fn check_frame<S: FrameSource>(camera: &mut S, report: &mut CheckReport) {
    let frame = match camera.read_frame() {
        Ok(frame) => {
            report.record(
                CheckStep::ReadFrame,
                StepStatus::Passed(format!("Frame size: {}", frame_resolution(&frame))),
            );
            frame
        }
        Err(e) => {
            report.record(CheckStep::ReadFrame, StepStatus::Failed(e.to_string()));
            report.record(CheckStep::ConvertColor, StepStatus::Skipped);
            return;
        }
    };

    match to_grayscale(&frame) {
        Ok(_) => report.record(
            CheckStep::ConvertColor,
            StepStatus::Passed("OpenCV image processing works".to_string()),
        ),
        Err(e) => report.record(
            CheckStep::ConvertColor,
            StepStatus::Failed(format!("OpenCV error: {}", e)),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passed(step: CheckStep) -> StepResult {
        StepResult {
            step,
            status: StepStatus::Passed(String::new()),
        }
    }

    #[test]
    fn test_empty_report_is_not_success() {
        let report = CheckReport::default();
        assert!(!report.all_passed());
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn test_exit_code_all_passed() {
        let report = CheckReport {
            steps: vec![passed(CheckStep::OpenCamera), passed(CheckStep::LoadClassifier)],
        };
        assert!(report.all_passed());
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn test_skipped_counts_as_failure() {
        let report = CheckReport {
            steps: vec![
                passed(CheckStep::OpenCamera),
                StepResult {
                    step: CheckStep::ReadFrame,
                    status: StepStatus::Skipped,
                },
            ],
        };
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn test_report_display() {
        let report = CheckReport {
            steps: vec![
                StepResult {
                    step: CheckStep::OpenCamera,
                    status: StepStatus::Failed("no camera".to_string()),
                },
                StepResult {
                    step: CheckStep::ReadFrame,
                    status: StepStatus::Skipped,
                },
            ],
        };
        let text = report.to_string();
        assert!(text.contains("[FAIL] Open camera: no camera"));
        assert!(text.contains("[SKIP] Read frame"));
        assert!(text.ends_with("Some checks failed."));
    }
}
