//! prompt-pocket core: a local library of reusable text prompts
//!
//! Prompts are titled text bodies with optional tags. A body may contain two
//! placeholders that are resolved when the prompt is used:
//! - `{clipboard}` - the current clipboard text
//! - `{cursor}` - where the caret should end up after pasting
//!
//! ## Architecture
//!
//! - **store**: CRUD over a single JSON collection in a key-value blob store
//! - **template**: placeholder substitution and caret-offset computation
//! - **actions**: copy/paste of raw or filled prompts through the host clipboard
//! - **commands**: JSON command registry the embedding host calls into
//!
//! Host capabilities (blob storage, clipboard, caret movement, time) are
//! traits injected through [`app::App`].

// Module declarations
pub mod actions;
pub mod app;
pub mod clipboard;
pub mod commands;
pub mod config;
pub mod cursor;
pub mod errors;
pub mod logging;
pub mod runtime;
pub mod store;
pub mod template;
pub mod util;
pub mod view;

pub use app::App;
pub use errors::{ErrorKind, PromptError, Result};
pub use store::{CreatePrompt, Prompt, PromptStore, UpdatePrompt};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modules_exist() {
        // Ensure modules compile and are accessible
        let error: errors::PromptError = "test".into();
        assert_eq!(error.kind(), ErrorKind::Unknown);
    }
}
