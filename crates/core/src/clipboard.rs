//! Clipboard collaborator
//!
//! The host application owns the real clipboard and the "paste into the
//! frontmost app" primitive. This module only defines the seam the core
//! talks to, plus an in-process implementation used by tests and by hosts
//! that want to stage text without touching the OS clipboard.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::{PromptError, Result};

/// Clipboard operations provided by the host
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Clipboard: Send + Sync {
    /// Read the current clipboard text
    ///
    /// `Ok(None)` means the clipboard is empty or holds non-text content.
    async fn read_text(&self) -> Result<Option<String>>;

    /// Replace the clipboard contents with `text`
    async fn write_text(&self, text: &str) -> Result<()>;

    /// Insert `text` into the active application
    async fn paste(&self, text: &str) -> Result<()>;
}

/// In-memory clipboard
///
/// `paste` records the pasted text instead of sending it anywhere, so tests
/// can assert on what would have been inserted.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
    pasted:   Mutex<Vec<String>>,
}

impl MemoryClipboard {
    /// Create an empty clipboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clipboard already holding `text`
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(text.into())),
            pasted:   Mutex::new(Vec::new()),
        }
    }

    /// Current clipboard contents
    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|c| c.clone())
    }

    /// Everything pasted so far, oldest first
    pub fn pasted(&self) -> Vec<String> {
        self.pasted.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Clipboard for MemoryClipboard {
    async fn read_text(&self) -> Result<Option<String>> {
        let contents = self
            .contents
            .lock()
            .map_err(|_| PromptError::Clipboard("clipboard lock poisoned".into()))?;
        Ok(contents.clone())
    }

    async fn write_text(&self, text: &str) -> Result<()> {
        let mut contents = self
            .contents
            .lock()
            .map_err(|_| PromptError::Clipboard("clipboard lock poisoned".into()))?;
        *contents = Some(text.to_string());
        Ok(())
    }

    async fn paste(&self, text: &str) -> Result<()> {
        let mut pasted = self
            .pasted
            .lock()
            .map_err(|_| PromptError::Clipboard("clipboard lock poisoned".into()))?;
        pasted.push(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_clipboard_reads_none() {
        let clipboard = MemoryClipboard::new();
        assert_eq!(clipboard.read_text().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let clipboard = MemoryClipboard::new();
        clipboard.write_text("hello").await.unwrap();
        assert_eq!(clipboard.read_text().await.unwrap(), Some("hello".into()));
        assert_eq!(clipboard.contents(), Some("hello".into()));
    }

    #[tokio::test]
    async fn test_paste_is_recorded_without_touching_contents() {
        let clipboard = MemoryClipboard::with_text("original");
        clipboard.paste("first").await.unwrap();
        clipboard.paste("second").await.unwrap();

        assert_eq!(clipboard.pasted(), vec!["first", "second"]);
        assert_eq!(clipboard.contents(), Some("original".into()));
    }
}
