//! Camera capture module for webcam access and frame handling.
//!
//! - Frame acquisition via the [`FrameSource`] trait, backed by [`CameraDevice`]
//! - Configuration via [`CameraSettings`] and [`Resolution`]
//! - Frame helpers ([`mirror_horizontal`], [`to_grayscale`])

mod device;
mod frame_utils;
mod types;

pub use device::{CameraDevice, FrameSource};
pub use frame_utils::{frame_resolution, mirror_horizontal, to_grayscale};
pub use types::{CameraError, CameraSettings, Resolution};
