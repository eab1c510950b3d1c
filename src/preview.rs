//! Preview window and keyboard polling.

use log::debug;
use opencv::{core::Mat, highgui};

/// Window title of the live preview.
pub const WINDOW_NAME: &str = "Cat Detector";

/// Key-poll wait in milliseconds.
const KEY_WAIT_MS: i32 = 1;

/// What the user asked for with the last keypress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// `q`: stop the capture loop
    Quit,
    /// `s`: save the current frame now
    Save,
    /// No key, or a key without a binding
    Continue,
}

impl KeyAction {
    /// Map a raw key code (as returned by `wait_key`) to an action.
    ///
    /// Only the low byte is considered, so modifier bits some backends set
    /// do not matter.
    pub fn from_key(code: i32) -> Self {
        if code < 0 {
            return KeyAction::Continue;
        }
        match (code & 0xFF) as u8 {
            b'q' => KeyAction::Quit,
            b's' => KeyAction::Save,
            _ => KeyAction::Continue,
        }
    }
}

/// Errors from the preview surface.
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    #[error("Preview window error: {0}")]
    OpenCv(#[from] opencv::Error),
}

/// A surface that shows frames and reports keypresses.
pub trait Preview {
    /// Display `frame`.
    fn show(&mut self, frame: &Mat) -> Result<(), PreviewError>;

    /// Wait briefly for a keypress.
    fn poll_key(&mut self) -> Result<KeyAction, PreviewError>;

    /// Tear down any windows. Calling this twice is a no-op.
    fn close(&mut self);
}

/// OpenCV HighGUI window.
#[derive(Debug)]
pub struct HighguiPreview {
    window: String,
    open: bool,
}

impl HighguiPreview {
    /// Create the preview window.
    pub fn open(window: &str) -> Result<Self, PreviewError> {
        highgui::named_window(window, highgui::WINDOW_AUTOSIZE)?;
        Ok(Self {
            window: window.to_string(),
            open: true,
        })
    }
}

impl Preview for HighguiPreview {
    fn show(&mut self, frame: &Mat) -> Result<(), PreviewError> {
        highgui::imshow(&self.window, frame)?;
        Ok(())
    }

    fn poll_key(&mut self) -> Result<KeyAction, PreviewError> {
        let code = highgui::wait_key(KEY_WAIT_MS)?;
        Ok(KeyAction::from_key(code))
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            if let Err(e) = highgui::destroy_all_windows() {
                debug!("Failed to destroy preview windows: {}", e);
            }
        }
    }
}

impl Drop for HighguiPreview {
    fn drop(&mut self) {
        self.close();
    }
}

/// Preview that shows nothing. Used with `--headless`; the loop then only
/// stops on Ctrl+C or a camera read failure.
#[derive(Debug, Default)]
pub struct HeadlessPreview;

impl Preview for HeadlessPreview {
    fn show(&mut self, _frame: &Mat) -> Result<(), PreviewError> {
        Ok(())
    }

    fn poll_key(&mut self) -> Result<KeyAction, PreviewError> {
        Ok(KeyAction::Continue)
    }

    fn close(&mut self) {}
}
