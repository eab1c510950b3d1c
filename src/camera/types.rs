//! Camera types and data structures.

use std::fmt;

/// Camera resolution settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Medium resolution (640x480), what most webcams default to
    pub const MEDIUM: Resolution = Resolution {
        width: 640,
        height: 480,
    };
}

impl Default for Resolution {
    fn default() -> Self {
        Self::MEDIUM
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Settings for opening a camera.
#[derive(Debug, Clone)]
pub struct CameraSettings {
    /// Camera device index
    pub device_index: u32,
    /// Requested capture resolution. `None` keeps the backend default.
    pub resolution: Option<Resolution>,
    /// Mirror horizontally (selfie mode)
    pub mirror: bool,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            device_index: 0,
            resolution: None,
            mirror: true,
        }
    }
}

/// Errors that can occur during camera operations.
#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    #[error("Camera initialization failed: {0}")]
    InitializationFailed(String),

    #[error(
        "Could not open camera {0}. Make sure it is connected, not in use by another app, and camera permission is granted"
    )]
    OpenFailed(u32),

    #[error("Invalid camera device index: {0}")]
    InvalidDeviceIndex(u32),

    #[error("Failed to read from camera")]
    NotFrame,

    #[error("Camera has already been released")]
    CameraOff,

    #[error("OpenCV error: {0}")]
    OpenCv(#[from] opencv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_default() {
        let res = Resolution::default();
        assert_eq!(res, Resolution::MEDIUM);
        assert_eq!(res.width, 640);
        assert_eq!(res.height, 480);
    }

    #[test]
    fn test_resolution_display() {
        let hd = Resolution {
            width: 1280,
            height: 720,
        };
        assert_eq!(hd.to_string(), "1280x720");
    }

    #[test]
    fn test_camera_settings_default() {
        let settings = CameraSettings::default();
        assert_eq!(settings.device_index, 0);
        assert!(settings.resolution.is_none());
        assert!(settings.mirror); // Default to selfie mode
    }

    #[test]
    fn test_camera_error_display() {
        assert_eq!(CameraError::NotFrame.to_string(), "Failed to read from camera");
        assert!(CameraError::OpenFailed(3).to_string().contains("camera 3"));
        assert_eq!(
            CameraError::InitializationFailed("boom".to_string()).to_string(),
            "Camera initialization failed: boom"
        );
        assert!(CameraError::CameraOff.to_string().contains("released"));
    }
}
