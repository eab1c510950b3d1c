//! Saving annotated frames as JPEG files.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::info;
use opencv::{core::Mat, core::Vector, imgcodecs};

/// Why a photo was taken. Embedded in the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureReason {
    /// Cooldown-gated capture triggered by a detection
    Auto,
    /// Capture requested from the keyboard
    Manual,
}

impl CaptureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureReason::Auto => "auto",
            CaptureReason::Manual => "manual",
        }
    }
}

impl fmt::Display for CaptureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while saving photos.
#[derive(Debug, thiserror::Error)]
pub enum PhotoError {
    #[error("Failed to create output directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode photo '{0}'")]
    EncodeFailed(PathBuf),

    #[error("OpenCV error: {0}")]
    OpenCv(#[from] opencv::Error),
}

/// Base file name for a capture, without collision suffix.
pub fn photo_stem(reason: CaptureReason, at: &DateTime<Local>) -> String {
    format!("cat_{}_{}", reason, at.format("%Y%m%d_%H%M%S"))
}

/// Flat directory of captured photos.
#[derive(Debug, Clone)]
pub struct PhotoStore {
    dir: PathBuf,
}

impl PhotoStore {
    /// Open the store, creating `dir` (and parents) if needed.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, PhotoError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| PhotoError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Pick a path for a new photo that does not overwrite an existing one.
    ///
    /// Two captures in the same second with the same reason get `_1`, `_2`,
    /// ... appended to the name.
    pub fn next_path(&self, reason: CaptureReason, at: &DateTime<Local>) -> PathBuf {
        let stem = photo_stem(reason, at);
        let first = self.dir.join(format!("{}.jpg", stem));
        if !first.exists() {
            return first;
        }

        (1u32..)
            .map(|n| self.dir.join(format!("{}_{}.jpg", stem, n)))
            .find(|p| !p.exists())
            .unwrap_or(first)
    }

    /// Encode `frame` as JPEG into the store.
    pub fn save(
        &self,
        frame: &Mat,
        reason: CaptureReason,
        at: &DateTime<Local>,
    ) -> Result<PathBuf, PhotoError> {
        let path = self.next_path(reason, at);
        let written = imgcodecs::imwrite(&path.to_string_lossy(), frame, &Vector::new())?;
        if !written {
            return Err(PhotoError::EncodeFailed(path));
        }

        info!("Photo saved: {}", path.display());
        Ok(path)
    }

    /// Save with the current local time.
    pub fn save_now(&self, frame: &Mat, reason: CaptureReason) -> Result<PathBuf, PhotoError> {
        self.save(frame, reason, &Local::now())
    }
}
