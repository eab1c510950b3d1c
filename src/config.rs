//! Configuration file handling for cat-detector.
//!
//! Loads configuration from `~/.config/cat-detector/config.toml` or a custom path.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration file structure for cat-detector.
/// Loaded from ~/.config/cat-detector/config.toml (or custom path via --config).
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
}

#[derive(Debug, Deserialize)]
pub struct CameraConfig {
    #[serde(default)]
    pub device: u32,
    #[serde(default = "default_true")]
    pub mirror: bool,
    /// Requested resolution as WIDTHxHEIGHT
    #[serde(default)]
    pub resolution: Option<String>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: 0,
            mirror: true,
            resolution: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DetectionConfig {
    #[serde(default)]
    pub cascade: Option<PathBuf>,
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,
    #[serde(default = "default_min_neighbors")]
    pub min_neighbors: i32,
    #[serde(default = "default_min_size")]
    pub min_size: i32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            cascade: None,
            scale_factor: default_scale_factor(),
            min_neighbors: default_min_neighbors(),
            min_size: default_min_size(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CaptureConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            cooldown_secs: default_cooldown_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_scale_factor() -> f64 {
    1.1
}

fn default_min_neighbors() -> i32 {
    5
}

fn default_min_size() -> i32 {
    30
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("cat_photos")
}

fn default_cooldown_secs() -> u64 {
    5
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
                path: path.clone(),
                source: e,
            })?;
            Self::parse(&content).map_err(|e| ConfigError::ParseError {
                path: path.clone(),
                source: e,
            })
        } else {
            Ok(Config::default())
        }
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("cat-detector").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from(".config/cat-detector/config.toml"))
}

/// Commented default configuration written by `config init`.
pub const DEFAULT_CONFIG: &str = r#"# cat-detector configuration

[camera]
# Camera device index
device = 0
# Mirror horizontally (selfie mode)
mirror = true
# Requested capture resolution (backend default if unset)
# resolution = "640x480"

[detection]
# Path to haarcascade_frontalcatface.xml (searched in OpenCV data dirs if unset)
# cascade = "/usr/share/opencv4/haarcascades/haarcascade_frontalcatface.xml"
scale_factor = 1.1
min_neighbors = 5
# Smallest detected face side in pixels
min_size = 30

[capture]
# Where photos are written
output_dir = "cat_photos"
# Seconds between automatic captures
cooldown_secs = 5
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.camera.device, 0);
        assert!(config.camera.mirror);
        assert!(config.camera.resolution.is_none());
        assert!(config.detection.cascade.is_none());
        assert_eq!(config.detection.scale_factor, 1.1);
        assert_eq!(config.detection.min_neighbors, 5);
        assert_eq!(config.detection.min_size, 30);
        assert_eq!(config.capture.output_dir, PathBuf::from("cat_photos"));
        assert_eq!(config.capture.cooldown_secs, 5);
    }

    #[test]
    fn test_default_config_text_matches_defaults() {
        let parsed = Config::parse(DEFAULT_CONFIG).unwrap();
        let defaults = Config::default();
        assert_eq!(parsed.camera.device, defaults.camera.device);
        assert_eq!(parsed.camera.mirror, defaults.camera.mirror);
        assert_eq!(parsed.detection.min_size, defaults.detection.min_size);
        assert_eq!(parsed.capture.output_dir, defaults.capture.output_dir);
        assert_eq!(parsed.capture.cooldown_secs, defaults.capture.cooldown_secs);
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let config = Config::parse(
            r#"
[camera]
device = 2

[capture]
cooldown_secs = 10
"#,
        )
        .unwrap();
        assert_eq!(config.camera.device, 2);
        assert!(config.camera.mirror);
        assert_eq!(config.capture.cooldown_secs, 10);
        assert_eq!(config.capture.output_dir, PathBuf::from("cat_photos"));
        assert_eq!(config.detection.min_neighbors, 5);
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("nope.toml"))).unwrap();
        assert_eq!(config.capture.cooldown_secs, 5);
    }

    #[test]
    fn test_load_invalid_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[camera]\ndevice = \"zero\"\n").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_default_path_ends_with_config_toml() {
        let path = default_path();
        assert!(path.ends_with("cat-detector/config.toml"));
    }
}
