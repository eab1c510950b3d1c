//! cat-detector library crate.
//!
//! Watches a camera, finds cat faces with an OpenCV Haar cascade, and saves
//! annotated photos with a cooldown between automatic captures. The modules
//! are public for the binary and for integration testing.

pub mod annotate;
pub mod camera;
pub mod cli;
pub mod config;
pub mod detection;
pub mod diagnostics;
pub mod photos;
pub mod preview;
pub mod session;
pub mod shutdown;
