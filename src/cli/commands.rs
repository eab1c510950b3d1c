//! Subcommand handlers. Each returns the process exit status.

use std::path::Path;

use log::{info, warn};

use super::args::ConfigAction;
use super::settings::Settings;
use crate::camera::CameraDevice;
use crate::config::DEFAULT_CONFIG;
use crate::detection::{CascadeDetector, Detector};
use crate::diagnostics::run_check;
use crate::photos::PhotoStore;
use crate::preview::{HeadlessPreview, HighguiPreview, Preview, WINDOW_NAME};
use crate::session::CaptureSession;
use crate::shutdown::{interrupt_flag, setup_ctrlc_handler};

/// Start the capture loop.
pub fn run_detector(settings: &Settings) -> i32 {
    let camera = match CameraDevice::open(&settings.camera) {
        Ok(camera) => camera,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    // A missing classifier is fatal before the loop starts
    let detector = match CascadeDetector::locate(settings.cascade.as_deref(), settings.detection) {
        Ok(detector) => detector,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Pass --cascade <path> or set detection.cascade in the config file.");
            return 1;
        }
    };

    let store = match PhotoStore::create(&settings.output_dir) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    if let Err(e) = setup_ctrlc_handler() {
        warn!("Could not install Ctrl+C handler: {}", e);
    }

    println!("Cat Detector started!");
    if settings.headless {
        println!("Running headless. Press Ctrl+C to quit.");
    } else {
        println!("Press 'q' to quit, 's' to take a manual photo.");
    }
    println!("Photos of detected cats go to {}/", store.dir().display());

    if settings.headless {
        drive(camera, detector, HeadlessPreview, store, settings)
    } else {
        match HighguiPreview::open(WINDOW_NAME) {
            Ok(preview) => drive(camera, detector, preview, store, settings),
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!("Use --headless to run without a preview window.");
                1
            }
        }
    }
}

fn drive<D: Detector, P: Preview>(
    camera: CameraDevice,
    detector: D,
    preview: P,
    store: PhotoStore,
    settings: &Settings,
) -> i32 {
    let mut session = CaptureSession::new(
        camera,
        detector,
        preview,
        store,
        settings.session_options(),
    );
    let result = session.run(interrupt_flag());
    let stats = session.stats();
    drop(session);

    match result {
        Ok(reason) => {
            info!("Stopped after {} frame(s): {:?}", stats.frames, reason);
            println!(
                "Cat Detector stopped. {} automatic and {} manual photo(s) saved.",
                stats.auto_saves, stats.manual_saves
            );
            if stats.failed_saves > 0 {
                warn!("{} automatic photo(s) could not be saved", stats.failed_saves);
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

/// Run the one-shot connectivity check and print its report.
pub fn check(settings: &Settings) -> i32 {
    println!("Testing camera {} and cat classifier...", settings.camera.device_index);

    let report = run_check(
        || CameraDevice::open(&settings.camera),
        || {
            CascadeDetector::locate(settings.cascade.as_deref(), settings.detection)
                .map(|d| d.path().to_path_buf())
        },
    );

    println!("{}", report);
    report.exit_code()
}

/// Handle config subcommand actions.
pub fn handle_config_action(
    action: ConfigAction,
    settings: &Settings,
    config_path: &Path,
) -> i32 {
    match action {
        ConfigAction::Show => {
            println!("Current configuration:");
            println!("  Camera: {}", settings.camera.device_index);
            match settings.camera.resolution {
                Some(res) => println!("  Resolution: {}", res),
                None => println!("  Resolution: camera default"),
            }
            println!("  Mirror: {}", if settings.camera.mirror { "yes" } else { "no" });
            match &settings.cascade {
                Some(path) => println!("  Cascade: {}", path.display()),
                None => println!("  Cascade: auto-detect"),
            }
            println!(
                "  Detection: scale {} / neighbors {} / min size {}px",
                settings.detection.scale_factor,
                settings.detection.min_neighbors,
                settings.detection.min_size
            );
            println!("  Output dir: {}", settings.output_dir.display());
            println!("  Cooldown: {}s", settings.cooldown.as_secs());
            println!();

            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
            0
        }
        ConfigAction::Init => {
            if config_path.exists() {
                eprintln!("Config file already exists: {}", config_path.display());
                eprintln!("Use 'cat-detector config show' to view current settings.");
                return 1;
            }

            // Create parent directories if needed
            if let Some(parent) = config_path.parent() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    eprintln!("Error creating config directory: {}", e);
                    return 1;
                }
            }

            if let Err(e) = std::fs::write(config_path, DEFAULT_CONFIG) {
                eprintln!("Error writing config file: {}", e);
                return 1;
            }

            println!("Created config file: {}", config_path.display());
            0
        }
    }
}
