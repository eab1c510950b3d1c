//! Cat face detection with a pretrained Haar cascade.
//!
//! The capture loop only depends on the [`Detector`] trait. [`CascadeDetector`]
//! is the OpenCV implementation that loads `haarcascade_frontalcatface.xml`.

use std::path::{Path, PathBuf};

use log::{debug, info};
use opencv::{
    core::{Mat, Rect, Size, Vector},
    objdetect::CascadeClassifier,
    prelude::*,
};

use crate::camera::to_grayscale;

/// File name of the frontal cat face cascade shipped with OpenCV.
pub const CASCADE_FILE: &str = "haarcascade_frontalcatface.xml";

/// Directories OpenCV installs its Haar cascades into, in search order.
const CASCADE_DIRS: &[&str] = &[
    "haarcascades",
    "/usr/share/opencv4/haarcascades",
    "/usr/local/share/opencv4/haarcascades",
    "/opt/homebrew/share/opencv4/haarcascades",
    "/usr/share/opencv/haarcascades",
    "/usr/local/share/opencv/haarcascades",
];

/// Errors that can occur while loading or running the classifier.
#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    #[error(
        "Cat cascade classifier not found (looked for haarcascade_frontalcatface.xml in: {})",
        join_paths(.searched)
    )]
    ClassifierMissing { searched: Vec<PathBuf> },

    #[error("Cat cascade classifier at '{0}' could not be loaded")]
    ClassifierEmpty(PathBuf),

    #[error("OpenCV error: {0}")]
    OpenCv(#[from] opencv::Error),
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Tuning for multi-scale detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionParams {
    /// Image pyramid step between scales
    pub scale_factor: f64,
    /// Neighbouring candidates required to keep a rectangle
    pub min_neighbors: i32,
    /// Smallest square side, in pixels, that is reported
    pub min_size: i32,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            scale_factor: 1.1,
            min_neighbors: 5,
            min_size: 30,
        }
    }
}

/// Anything that can find cats in a BGR frame.
pub trait Detector {
    /// Return one rectangle per detected cat face, in frame coordinates.
    fn detect(&mut self, frame: &Mat) -> Result<Vec<Rect>, DetectError>;
}

/// Resolve the cascade file location.
///
/// An explicit path is used as-is (it must exist). Otherwise the standard
/// OpenCV data directories are searched.
pub fn resolve_cascade_path(explicit: Option<&Path>) -> Result<PathBuf, DetectError> {
    if let Some(path) = explicit {
        return if path.is_file() {
            Ok(path.to_path_buf())
        } else {
            Err(DetectError::ClassifierMissing {
                searched: vec![path.to_path_buf()],
            })
        };
    }

    let candidates: Vec<PathBuf> = CASCADE_DIRS
        .iter()
        .map(|dir| Path::new(dir).join(CASCADE_FILE))
        .collect();

    match candidates.iter().find(|p| p.is_file()) {
        Some(found) => Ok(found.clone()),
        None => Err(DetectError::ClassifierMissing {
            searched: candidates,
        }),
    }
}

/// Haar cascade detector for frontal cat faces.
pub struct CascadeDetector {
    classifier: CascadeClassifier,
    params: DetectionParams,
    path: PathBuf,
}

impl std::fmt::Debug for CascadeDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CascadeDetector")
            .field("path", &self.path)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl CascadeDetector {
    /// Load the classifier from `path`.
    ///
    /// # Errors
    /// * `DetectError::ClassifierMissing` - the file does not exist
    /// * `DetectError::ClassifierEmpty` - OpenCV parsed nothing usable from it
    pub fn load(path: &Path, params: DetectionParams) -> Result<Self, DetectError> {
        if !path.is_file() {
            return Err(DetectError::ClassifierMissing {
                searched: vec![path.to_path_buf()],
            });
        }

        let path_str = path.to_string_lossy();
        let classifier = CascadeClassifier::new(&path_str)?;
        if classifier.empty()? {
            return Err(DetectError::ClassifierEmpty(path.to_path_buf()));
        }

        info!("Loaded cat classifier from {}", path.display());
        Ok(Self {
            classifier,
            params,
            path: path.to_path_buf(),
        })
    }

    /// Resolve the cascade location (see [`resolve_cascade_path`]) and load it.
    pub fn locate(explicit: Option<&Path>, params: DetectionParams) -> Result<Self, DetectError> {
        let path = resolve_cascade_path(explicit)?;
        Self::load(&path, params)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Detector for CascadeDetector {
    fn detect(&mut self, frame: &Mat) -> Result<Vec<Rect>, DetectError> {
        let gray = to_grayscale(frame)?;
        let mut found = Vector::<Rect>::new();
        self.classifier.detect_multi_scale(
            &gray,
            &mut found,
            self.params.scale_factor,
            self.params.min_neighbors,
            0,
            Size::new(self.params.min_size, self.params.min_size),
            Size::new(0, 0),
        )?;

        if !found.is_empty() {
            debug!("Classifier returned {} region(s)", found.len());
        }
        Ok(found.to_vec())
    }
}
