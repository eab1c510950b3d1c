//! OpenCV-backed camera device.

use log::{debug, info};
use opencv::{
    core::Mat,
    prelude::*,
    videoio::{self, VideoCapture},
};

use super::types::{CameraError, CameraSettings, Resolution};

/// A source of camera frames.
///
/// Implemented by [`CameraDevice`] for real hardware. The capture loop and
/// the connectivity check only talk to this trait.
pub trait FrameSource {
    /// Read the next frame. Blocks until the backend delivers one.
    fn read_frame(&mut self) -> Result<Mat, CameraError>;

    /// Release the underlying device. Calling this twice is a no-op.
    fn release(&mut self);
}

/// Camera handle wrapping an OpenCV `VideoCapture`.
///
/// The device is released when [`FrameSource::release`] is called or when the
/// handle is dropped, whichever comes first.
pub struct CameraDevice {
    cam: Option<VideoCapture>,
    device_index: u32,
    resolution: Resolution,
}

impl std::fmt::Debug for CameraDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraDevice")
            .field("device_index", &self.device_index)
            .field("resolution", &self.resolution)
            .field("open", &self.is_open())
            .finish()
    }
}

impl CameraDevice {
    /// Open the camera at `settings.device_index` with the platform's default
    /// capture backend.
    ///
    /// # Errors
    /// * `CameraError::InvalidDeviceIndex` - index does not fit the backend's index type
    /// * `CameraError::InitializationFailed` - OpenCV could not create the capture object
    /// * `CameraError::OpenFailed` - the device exists in name only or is busy
    pub fn open(settings: &CameraSettings) -> Result<Self, CameraError> {
        let index = i32::try_from(settings.device_index)
            .map_err(|_| CameraError::InvalidDeviceIndex(settings.device_index))?;

        let mut cam = VideoCapture::new(index, videoio::CAP_ANY)
            .map_err(|e| CameraError::InitializationFailed(e.to_string()))?;

        if !cam.is_opened().unwrap_or(false) {
            return Err(CameraError::OpenFailed(settings.device_index));
        }

        if let Some(requested) = settings.resolution {
            // The backend picks the closest mode it supports; read it back below.
            cam.set(videoio::CAP_PROP_FRAME_WIDTH, f64::from(requested.width))?;
            cam.set(videoio::CAP_PROP_FRAME_HEIGHT, f64::from(requested.height))?;
        }

        let width = cam.get(videoio::CAP_PROP_FRAME_WIDTH)?.clamp(1.0, 8192.0);
        let height = cam.get(videoio::CAP_PROP_FRAME_HEIGHT)?.clamp(1.0, 8192.0);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let resolution = Resolution {
            width: width.round() as u32,
            height: height.round() as u32,
        };

        info!("Opened camera {} at {}", settings.device_index, resolution);

        Ok(Self {
            cam: Some(cam),
            device_index: settings.device_index,
            resolution,
        })
    }

    /// Resolution the backend reported after opening.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Whether the device is still held.
    pub fn is_open(&self) -> bool {
        self.cam.is_some()
    }
}

impl FrameSource for CameraDevice {
    fn read_frame(&mut self) -> Result<Mat, CameraError> {
        let Some(cam) = self.cam.as_mut() else {
            return Err(CameraError::CameraOff);
        };

        let mut frame = Mat::default();
        if cam.read(&mut frame).unwrap_or(false) && !frame.empty() {
            Ok(frame)
        } else {
            Err(CameraError::NotFrame)
        }
    }

    fn release(&mut self) {
        if let Some(mut cam) = self.cam.take() {
            if let Err(e) = cam.release() {
                debug!("Camera release reported an error: {}", e);
            }
            info!("Released camera {}", self.device_index);
        }
    }
}

impl Drop for CameraDevice {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_invalid_device_index() {
        // Larger than any i32 index the backend accepts
        let settings = CameraSettings {
            device_index: u32::MAX,
            ..CameraSettings::default()
        };
        match CameraDevice::open(&settings) {
            Err(CameraError::InvalidDeviceIndex(idx)) => assert_eq!(idx, u32::MAX),
            other => panic!("Expected InvalidDeviceIndex, got {:?}", other),
        }
    }
}
