//! Caret movement after a paste
//!
//! Moving the caret is done by synthesising left-arrow key presses, which
//! only works on macOS (through System Events). Callers ask
//! [`CursorControl::is_supported`] up front instead of checking the platform
//! themselves.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::errors::{PromptError, Result};

/// macOS virtual key code for the left arrow
const LEFT_ARROW_KEY_CODE: u8 = 123;

/// Caret control provided by the platform
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CursorControl: Send + Sync {
    /// Whether `move_left` can succeed on this platform
    fn is_supported(&self) -> bool;

    /// Press the left arrow `count` times
    ///
    /// A `count` of zero succeeds without side effects.
    async fn move_left(&self, count: usize) -> Result<()>;
}

/// Caret control backed by `osascript`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCursor;

impl SystemCursor {
    pub fn new() -> Self {
        Self
    }
}

/// Build the AppleScript that presses the left arrow `count` times
fn left_arrow_script(count: usize) -> String {
    format!(
        "tell application \"System Events\"\n  repeat {} times\n    key code {}\n  end repeat\nend tell",
        count, LEFT_ARROW_KEY_CODE
    )
}

#[async_trait]
impl CursorControl for SystemCursor {
    fn is_supported(&self) -> bool {
        cfg!(target_os = "macos")
    }

    async fn move_left(&self, count: usize) -> Result<()> {
        if count == 0 {
            return Ok(());
        }

        if !self.is_supported() {
            return Err(PromptError::CursorMove(
                "Cursor movement is only supported on macOS".into(),
            ));
        }

        debug!(count, "moving caret left");
        let output = tokio::process::Command::new("osascript")
            .arg("-e")
            .arg(left_arrow_script(count))
            .output()
            .await
            .map_err(|e| PromptError::CursorMove(format!("failed to run osascript: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(%stderr, "osascript exited with {}", output.status);
            return Err(PromptError::CursorMove(stderr));
        }

        Ok(())
    }
}
