//! Placeholder substitution for prompt bodies
//!
//! Two literal tokens are understood, case-sensitive and without escaping:
//!
//! - `{clipboard}` - replaced by the clipboard text (every occurrence)
//! - `{cursor}`    - zero-width marker for where the caret should land
//!
//! The copy path removes `{cursor}` outright. The paste path removes it too,
//! but also reports how many characters follow it so the caller can walk the
//! caret back after inserting the text.
//!
//! The `render_*` functions are pure; the `fill_*` functions resolve the
//! clipboard text first (reading it from the collaborator when the caller did
//! not supply one) and then delegate to them.

use serde::Serialize;
use tracing::warn;

use crate::clipboard::Clipboard;
use crate::errors::{PromptError, Result};

/// Clipboard placeholder literal
pub const CLIPBOARD_TOKEN: &str = "{clipboard}";

/// Cursor placeholder literal
pub const CURSOR_TOKEN: &str = "{cursor}";

/// Description of a supported placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placeholder {
    pub name:        &'static str,
    pub syntax:      &'static str,
    pub description: &'static str,
}

/// Every placeholder the engine understands
pub const SUPPORTED_PLACEHOLDERS: [Placeholder; 2] = [
    Placeholder {
        name:        "clipboard",
        syntax:      CLIPBOARD_TOKEN,
        description: "Replaced with the current clipboard text",
    },
    Placeholder {
        name:        "cursor",
        syntax:      CURSOR_TOKEN,
        description: "Caret position after pasting; removed from the text",
    },
];

/// Result of filling a template for pasting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasteText {
    /// Text to insert, with all placeholders resolved
    pub text:          String,
    /// Characters to the right of the caret marker, `None` when there is none
    pub cursor_offset: Option<usize>,
}

/// Per-token occurrence counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceholderCounts {
    pub clipboard_count: usize,
    pub cursor_count:    usize,
}

/// True iff the template contains either token
pub fn has_placeholders(template: &str) -> bool {
    template.contains(CLIPBOARD_TOKEN) || template.contains(CURSOR_TOKEN)
}

/// Count non-overlapping occurrences of each token
pub fn count_placeholders(template: &str) -> PlaceholderCounts {
    PlaceholderCounts {
        clipboard_count: template.matches(CLIPBOARD_TOKEN).count(),
        cursor_count:    template.matches(CURSOR_TOKEN).count(),
    }
}

/// Reject templates whose caret position is ambiguous
///
/// # Errors
/// - `Validation`: more than one `{cursor}` token
pub fn validate_template(template: &str) -> Result<()> {
    let cursors = template.matches(CURSOR_TOKEN).count();
    if cursors > 1 {
        return Err(PromptError::validation(format!(
            "Body may contain at most one {} placeholder (found {})",
            CURSOR_TOKEN, cursors
        )));
    }
    Ok(())
}

// ============================================================================
// Pure rendering
// ============================================================================

/// Substitute `{clipboard}` and strip every `{cursor}`
pub fn render_for_copy(template: &str, clipboard_text: &str) -> String {
    template
        .replace(CLIPBOARD_TOKEN, clipboard_text)
        .replace(CURSOR_TOKEN, "")
}

/// Substitute `{clipboard}` and locate the caret marker
///
/// The caret goes where the first `{cursor}` was, located after clipboard
/// substitution. Any further markers are stripped as well and the offset is
/// measured on the final text.
pub fn render_for_paste(template: &str, clipboard_text: &str) -> PasteText {
    let substituted = template.replace(CLIPBOARD_TOKEN, clipboard_text);

    match substituted.split_once(CURSOR_TOKEN) {
        Some((before, after)) => {
            let after = after.replace(CURSOR_TOKEN, "");
            let cursor_offset = after.chars().count();
            PasteText {
                text:          format!("{}{}", before, after),
                cursor_offset: Some(cursor_offset),
            }
        },
        None => PasteText {
            text:          substituted,
            cursor_offset: None,
        },
    }
}

// ============================================================================
// Clipboard-resolving variants
// ============================================================================

/// Fill a template for copying
///
/// `clipboard_text` wins when supplied; otherwise the clipboard is read, but
/// only if the template actually contains `{clipboard}`.
pub async fn fill_for_copy(
    template: &str,
    clipboard_text: Option<&str>,
    clipboard: &dyn Clipboard,
) -> String {
    let text = resolve_clipboard_text(template, clipboard_text, clipboard).await;
    render_for_copy(template, &text)
}

/// Fill a template for pasting, reporting the caret offset
pub async fn fill_for_paste(
    template: &str,
    clipboard_text: Option<&str>,
    clipboard: &dyn Clipboard,
) -> PasteText {
    let text = resolve_clipboard_text(template, clipboard_text, clipboard).await;
    render_for_paste(template, &text)
}

async fn resolve_clipboard_text(
    template: &str,
    provided: Option<&str>,
    clipboard: &dyn Clipboard,
) -> String {
    if !template.contains(CLIPBOARD_TOKEN) {
        return String::new();
    }
    match provided {
        Some(text) => text.to_string(),
        None => read_clipboard_or_empty(clipboard).await,
    }
}

/// Read clipboard text, degrading every failure to the empty string
///
/// A template with `{clipboard}` must never block on clipboard access.
pub async fn read_clipboard_or_empty(clipboard: &dyn Clipboard) -> String {
    match clipboard.read_text().await {
        Ok(Some(text)) => text,
        Ok(None) => String::new(),
        Err(err) => {
            warn!(error = %err, "clipboard read failed, substituting empty text");
            String::new()
        },
    }
}
