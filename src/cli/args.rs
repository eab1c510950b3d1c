//! CLI argument parsing with clap.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::camera::Resolution;

/// Parse and validate resolution (WIDTHxHEIGHT format)
pub fn parse_resolution(s: &str) -> Result<Resolution, String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 2 {
        return Err(format!(
            "Invalid resolution format '{}'. Use WIDTHxHEIGHT (e.g., 640x480)",
            s
        ));
    }
    let width: u32 = parts[0]
        .parse()
        .map_err(|_| format!("Invalid width '{}' in resolution", parts[0]))?;
    let height: u32 = parts[1]
        .parse()
        .map_err(|_| format!("Invalid height '{}' in resolution", parts[1]))?;
    if width == 0 || height == 0 {
        return Err("Resolution width and height must be greater than 0".to_string());
    }
    if width > 7680 || height > 4320 {
        return Err("Resolution exceeds maximum supported (7680x4320)".to_string());
    }
    Ok(Resolution { width, height })
}

/// Watches a camera and takes a photo whenever a cat shows up
#[derive(Parser, Debug)]
#[command(name = "cat-detector")]
#[command(version, about = "Automatic cat photos from your webcam", long_about = None)]
#[command(after_help = "KEYS (in the preview window):
    q    Quit
    s    Take a photo now

EXAMPLES:
    cat-detector                      # Start detecting on camera 0
    cat-detector check                # Verify camera and classifier
    cat-detector --camera 1 -o shots  # Other camera, other folder")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Camera device index
    #[arg(long, global = true)]
    pub camera: Option<u32>,

    /// Requested capture resolution (WIDTHxHEIGHT)
    #[arg(long, short, global = true, value_parser = parse_resolution)]
    pub resolution: Option<Resolution>,

    /// Do not mirror the camera image
    #[arg(long, global = true)]
    pub no_mirror: bool,

    /// Path to haarcascade_frontalcatface.xml
    #[arg(long, global = true)]
    pub cascade: Option<PathBuf>,

    /// Directory photos are saved to
    #[arg(long, short, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Seconds between automatic photos
    #[arg(long, global = true)]
    pub cooldown: Option<u64>,

    /// Run without a preview window (stop with Ctrl+C)
    #[arg(long, global = true)]
    pub headless: bool,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// More log output (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start the detection loop (default)
    Run,
    /// Check that the camera and the cat classifier work
    Check,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    /// Show effective configuration
    Show,
    /// Create default config file
    Init,
}
