//! Effective settings: config file values overridden by CLI flags.

use std::path::PathBuf;
use std::time::Duration;

use super::args::{parse_resolution, Args};
use crate::camera::CameraSettings;
use crate::config::Config;
use crate::detection::DetectionParams;
use crate::session::SessionOptions;

/// Everything a subcommand needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub camera: CameraSettings,
    pub cascade: Option<PathBuf>,
    pub detection: DetectionParams,
    pub output_dir: PathBuf,
    pub cooldown: Duration,
    pub headless: bool,
}

impl Settings {
    /// Merge `config` with the CLI overrides in `args`.
    pub fn resolve(args: &Args, config: &Config) -> Result<Self, String> {
        let config_resolution = config
            .camera
            .resolution
            .as_deref()
            .map(parse_resolution)
            .transpose()
            .map_err(|e| format!("camera.resolution: {}", e))?;
        let detection = detection_params(config)?;

        Ok(Self {
            camera: CameraSettings {
                device_index: args.camera.unwrap_or(config.camera.device),
                resolution: args.resolution.or(config_resolution),
                mirror: config.camera.mirror && !args.no_mirror,
            },
            cascade: args
                .cascade
                .clone()
                .or_else(|| config.detection.cascade.clone()),
            detection,
            output_dir: args
                .output_dir
                .clone()
                .unwrap_or_else(|| config.capture.output_dir.clone()),
            cooldown: Duration::from_secs(args.cooldown.unwrap_or(config.capture.cooldown_secs)),
            headless: args.headless,
        })
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            cooldown: self.cooldown,
            mirror: self.camera.mirror,
        }
    }
}

/// Classifier parameters from the config, rejected when OpenCV would refuse
/// them or never find anything.
fn detection_params(config: &Config) -> Result<DetectionParams, String> {
    let d = &config.detection;
    if d.scale_factor.is_nan() || d.scale_factor <= 1.0 {
        return Err(format!(
            "detection.scale_factor: must be greater than 1.0, got {}",
            d.scale_factor
        ));
    }
    if d.min_neighbors < 0 {
        return Err(format!(
            "detection.min_neighbors: must not be negative, got {}",
            d.min_neighbors
        ));
    }
    if d.min_size <= 0 {
        return Err(format!(
            "detection.min_size: must be positive, got {}",
            d.min_size
        ));
    }

    Ok(DetectionParams {
        scale_factor: d.scale_factor,
        min_neighbors: d.min_neighbors,
        min_size: d.min_size,
    })
}
