//! Copy and paste actions on a prompt
//!
//! Every action reports exactly one [`ActionOutcome`]. Sub-steps that fail
//! after the primary action succeeded (moving the caret after a paste) soften
//! the outcome to a warning instead of turning it into a failure.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::clipboard::Clipboard;
use crate::cursor::CursorControl;
use crate::errors::{ErrorKind, PromptError};
use crate::store::Prompt;
use crate::template;

/// Severity of an action outcome as presented to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStyle {
    Success,
    Warning,
    Failure,
}

/// Combined result of one user action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionOutcome {
    pub style:         OutcomeStyle,
    pub title:         String,
    pub message:       Option<String>,
    /// Caret offset of the pasted text, for filled pastes only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor_offset: Option<usize>,
    /// Error kind behind a failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind:    Option<ErrorKind>,
}

impl ActionOutcome {
    fn success(title: &str, message: impl Into<String>) -> Self {
        Self {
            style:         OutcomeStyle::Success,
            title:         title.to_string(),
            message:       Some(message.into()),
            cursor_offset: None,
            error_kind:    None,
        }
    }

    fn warning(title: &str, message: impl Into<String>) -> Self {
        Self {
            style: OutcomeStyle::Warning,
            ..Self::success(title, message)
        }
    }

    fn failure(title: &str, err: &PromptError) -> Self {
        warn!(error = %err, category = err.category(), "{}", title);
        Self {
            style:         OutcomeStyle::Failure,
            title:         title.to_string(),
            message:       Some(err.user_message()),
            cursor_offset: None,
            error_kind:    Some(err.kind()),
        }
    }

    /// `false` only for failures; warnings still mean the action happened
    pub fn is_success(&self) -> bool {
        self.style != OutcomeStyle::Failure
    }
}

/// Copy and paste actions over the host collaborators
#[derive(Clone)]
pub struct PromptActions {
    clipboard: Arc<dyn Clipboard>,
    cursor:    Arc<dyn CursorControl>,
}

impl PromptActions {
    pub fn new(clipboard: Arc<dyn Clipboard>, cursor: Arc<dyn CursorControl>) -> Self {
        Self { clipboard, cursor }
    }

    /// Copy the body verbatim
    pub async fn copy_raw(&self, prompt: &Prompt) -> ActionOutcome {
        match self.clipboard.write_text(&prompt.body).await {
            Ok(()) => {
                info!(id = %prompt.id, "copied prompt");
                ActionOutcome::success("Copied to Clipboard", format!("\"{}\" copied", prompt.title))
            },
            Err(e) => ActionOutcome::failure("Failed to Copy", &clipboard_error(e)),
        }
    }

    /// Paste the body verbatim into the active application
    pub async fn paste_raw(&self, prompt: &Prompt) -> ActionOutcome {
        match self.clipboard.paste(&prompt.body).await {
            Ok(()) => {
                info!(id = %prompt.id, "pasted prompt");
                ActionOutcome::success("Pasted to Active App", format!("\"{}\" pasted", prompt.title))
            },
            Err(e) => ActionOutcome::failure("Failed to Paste", &clipboard_error(e)),
        }
    }

    /// Resolve placeholders, then copy
    pub async fn copy_filled(&self, prompt: &Prompt) -> ActionOutcome {
        let text = template::fill_for_copy(&prompt.body, None, self.clipboard.as_ref()).await;

        match self.clipboard.write_text(&text).await {
            Ok(()) => {
                info!(id = %prompt.id, "copied filled prompt");
                ActionOutcome::success(
                    "Copied Filled Prompt",
                    format!("\"{}\" copied to clipboard", prompt.title),
                )
            },
            Err(e) => ActionOutcome::failure("Failed to Copy Filled Prompt", &clipboard_error(e)),
        }
    }

    /// Resolve placeholders, paste, then walk the caret back to `{cursor}`
    pub async fn paste_filled(&self, prompt: &Prompt) -> ActionOutcome {
        let filled = template::fill_for_paste(&prompt.body, None, self.clipboard.as_ref()).await;

        if let Err(e) = self.clipboard.paste(&filled.text).await {
            return ActionOutcome::failure("Failed to Paste Filled Prompt", &clipboard_error(e));
        }
        info!(id = %prompt.id, cursor_offset = ?filled.cursor_offset, "pasted filled prompt");

        let mut outcome = match filled.cursor_offset {
            Some(offset) if offset > 0 => match self.place_caret(offset).await {
                Ok(()) => ActionOutcome::success(
                    "Pasted with Cursor",
                    "Cursor positioned at {cursor} location",
                ),
                Err(e) => {
                    warn!(error = %e, offset, "caret not moved after paste");
                    ActionOutcome::warning(
                        "Pasted Successfully",
                        "Note: Cursor could not be moved automatically",
                    )
                },
            },
            _ => ActionOutcome::success(
                "Pasted Filled Prompt",
                format!("\"{}\" pasted successfully", prompt.title),
            ),
        };
        outcome.cursor_offset = filled.cursor_offset;
        outcome
    }

    async fn place_caret(&self, offset: usize) -> crate::errors::Result<()> {
        if !self.cursor.is_supported() {
            return Err(PromptError::CursorMove(
                "Cursor movement is not supported on this platform".into(),
            ));
        }
        self.cursor.move_left(offset).await
    }
}

/// Collaborator failures during copy/paste are clipboard failures
fn clipboard_error(err: PromptError) -> PromptError {
    match err {
        PromptError::Clipboard(_) => err,
        other => PromptError::Clipboard(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::{MemoryClipboard, MockClipboard};
    use crate::cursor::MockCursorControl;

    fn prompt(body: &str) -> Prompt {
        Prompt {
            id:           "p1".into(),
            title:        "Sample".into(),
            body:         body.into(),
            tags:         None,
            created_at:   "2024-01-01T00:00:00.000Z".into(),
            updated_at:   "2024-01-01T00:00:00.000Z".into(),
            last_used_at: None,
        }
    }

    fn unused_cursor() -> Arc<MockCursorControl> {
        let mut cursor = MockCursorControl::new();
        cursor.expect_move_left().never();
        Arc::new(cursor)
    }

    // ========================================
    // Raw actions
    // ========================================

    #[tokio::test]
    async fn test_copy_raw_keeps_placeholders() {
        let clipboard = Arc::new(MemoryClipboard::with_text("ignored"));
        let actions = PromptActions::new(clipboard.clone(), unused_cursor());

        let outcome = actions.copy_raw(&prompt("Hi {clipboard} {cursor}")).await;

        assert_eq!(outcome.style, OutcomeStyle::Success);
        assert_eq!(outcome.title, "Copied to Clipboard");
        assert_eq!(outcome.message.as_deref(), Some("\"Sample\" copied"));
        assert_eq!(clipboard.contents().as_deref(), Some("Hi {clipboard} {cursor}"));
    }

    #[tokio::test]
    async fn test_paste_raw() {
        let clipboard = Arc::new(MemoryClipboard::new());
        let actions = PromptActions::new(clipboard.clone(), unused_cursor());

        let outcome = actions.paste_raw(&prompt("raw {cursor}")).await;

        assert!(outcome.is_success());
        assert_eq!(clipboard.pasted(), vec!["raw {cursor}".to_string()]);
    }

    #[tokio::test]
    async fn test_copy_failure_is_clipboard_failure() {
        let mut clipboard = MockClipboard::new();
        clipboard
            .expect_write_text()
            .times(1)
            .returning(|_| Err(PromptError::Other("denied".into())));
        let actions = PromptActions::new(Arc::new(clipboard), unused_cursor());

        let outcome = actions.copy_raw(&prompt("x")).await;

        assert_eq!(outcome.style, OutcomeStyle::Failure);
        assert_eq!(outcome.title, "Failed to Copy");
        assert_eq!(outcome.error_kind, Some(ErrorKind::ClipboardFailed));
        assert!(!outcome.is_success());
    }

    // ========================================
    // Filled actions
    // ========================================

    #[tokio::test]
    async fn test_copy_filled_substitutes_clipboard() {
        let clipboard = Arc::new(MemoryClipboard::with_text("fn main() {}"));
        let actions = PromptActions::new(clipboard.clone(), unused_cursor());

        let outcome = actions.copy_filled(&prompt("Review:\n{clipboard}{cursor}")).await;

        assert_eq!(outcome.title, "Copied Filled Prompt");
        assert_eq!(clipboard.contents().as_deref(), Some("Review:\nfn main() {}"));
    }

    #[tokio::test]
    async fn test_paste_filled_moves_caret() {
        let clipboard = Arc::new(MemoryClipboard::with_text("X"));
        let mut cursor = MockCursorControl::new();
        cursor.expect_is_supported().return_const(true);
        cursor
            .expect_move_left()
            .withf(|count| *count == 6)
            .times(1)
            .returning(|_| Ok(()));
        let actions = PromptActions::new(clipboard.clone(), Arc::new(cursor));

        let outcome = actions.paste_filled(&prompt("{clipboard} {cursor} World")).await;

        assert_eq!(clipboard.pasted(), vec!["X  World".to_string()]);
        assert_eq!(outcome.style, OutcomeStyle::Success);
        assert_eq!(outcome.title, "Pasted with Cursor");
        assert_eq!(outcome.cursor_offset, Some(6));
    }

    #[tokio::test]
    async fn test_paste_filled_cursor_at_end_skips_caret() {
        let clipboard = Arc::new(MemoryClipboard::new());
        let mut cursor = MockCursorControl::new();
        cursor.expect_is_supported().never();
        cursor.expect_move_left().never();
        let actions = PromptActions::new(clipboard.clone(), Arc::new(cursor));

        let outcome = actions.paste_filled(&prompt("Hello World {cursor}")).await;

        assert_eq!(outcome.title, "Pasted Filled Prompt");
        assert_eq!(outcome.cursor_offset, Some(0));
        assert_eq!(clipboard.pasted(), vec!["Hello World ".to_string()]);
    }

    #[tokio::test]
    async fn test_paste_filled_cursor_failure_is_warning() {
        let clipboard = Arc::new(MemoryClipboard::new());
        let mut cursor = MockCursorControl::new();
        cursor.expect_is_supported().return_const(true);
        cursor
            .expect_move_left()
            .times(1)
            .returning(|_| Err(PromptError::CursorMove("osascript failed".into())));
        let actions = PromptActions::new(clipboard.clone(), Arc::new(cursor));

        let outcome = actions.paste_filled(&prompt("a {cursor} b")).await;

        assert_eq!(outcome.style, OutcomeStyle::Warning);
        assert_eq!(outcome.title, "Pasted Successfully");
        assert!(outcome.is_success());
        assert_eq!(clipboard.pasted(), vec!["a  b".to_string()]);
    }

    #[tokio::test]
    async fn test_paste_filled_unsupported_platform_is_warning() {
        let clipboard = Arc::new(MemoryClipboard::new());
        let mut cursor = MockCursorControl::new();
        cursor.expect_is_supported().return_const(false);
        cursor.expect_move_left().never();
        let actions = PromptActions::new(clipboard, Arc::new(cursor));

        let outcome = actions.paste_filled(&prompt("{cursor}tail")).await;

        assert_eq!(outcome.style, OutcomeStyle::Warning);
        assert_eq!(outcome.cursor_offset, Some(4));
    }

    #[tokio::test]
    async fn test_paste_filled_paste_failure() {
        let mut clipboard = MockClipboard::new();
        clipboard.expect_read_text().never();
        clipboard
            .expect_paste()
            .times(1)
            .returning(|_| Err(PromptError::Clipboard("no active app".into())));
        let actions = PromptActions::new(Arc::new(clipboard), unused_cursor());

        let outcome = actions.paste_filled(&prompt("plain")).await;

        assert_eq!(outcome.style, OutcomeStyle::Failure);
        assert_eq!(outcome.title, "Failed to Paste Filled Prompt");
        assert_eq!(outcome.error_kind, Some(ErrorKind::ClipboardFailed));
    }

    #[test]
    fn test_outcome_serializes_camel_case() {
        let mut outcome = ActionOutcome::warning("t", "m");
        outcome.cursor_offset = Some(3);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["style"], "warning");
        assert_eq!(json["cursorOffset"], 3);
        assert!(json.get("errorKind").is_none());
    }
}
