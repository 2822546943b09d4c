//! Application context
//!
//! Everything the command layer needs is constructed once by the embedding
//! host and passed explicitly; there is no process-wide state besides the
//! tokio runtime and the tracing subscriber.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::actions::PromptActions;
use crate::clipboard::Clipboard;
use crate::config::Config;
use crate::cursor::{CursorControl, SystemCursor};
use crate::errors::Result;
use crate::logging;
use crate::store::{BlobStore, FileBlobStore, MemoryBlobStore, PromptStore};

/// Store, actions and configuration bundled for the command layer
#[derive(Clone)]
pub struct App {
    config:  Config,
    store:   PromptStore,
    actions: PromptActions,
}

impl App {
    pub fn new(config: Config, store: PromptStore, actions: PromptActions) -> Self {
        Self {
            config,
            store,
            actions,
        }
    }

    /// Host entry point: parse the setup object, start logging, build the app
    ///
    /// # Errors
    /// - `ConfigError`: the setup object is unusable
    pub fn setup(value: Value, clipboard: Arc<dyn Clipboard>) -> Result<Self> {
        let config = Config::from_value(value)?;
        logging::init(&config.log_level);
        Self::from_config(config, clipboard)
    }

    /// File-backed store under `config.data_dir` and the system cursor
    pub fn from_config(config: Config, clipboard: Arc<dyn Clipboard>) -> Result<Self> {
        config.validate()?;
        let blobs: Arc<dyn BlobStore> = Arc::new(FileBlobStore::new(config.data_dir.clone()));
        let cursor: Arc<dyn CursorControl> = Arc::new(SystemCursor::new());

        info!(
            data_dir = %config.data_dir.display(),
            key = %config.storage_key,
            cursor_supported = cursor.is_supported(),
            "prompt store ready"
        );

        let store = PromptStore::new(blobs).with_key(config.storage_key.clone());
        let actions = PromptActions::new(clipboard, cursor);
        Ok(Self::new(config, store, actions))
    }

    /// Memory-backed app with default configuration
    pub fn in_memory(clipboard: Arc<dyn Clipboard>, cursor: Arc<dyn CursorControl>) -> Self {
        let store = PromptStore::new(Arc::new(MemoryBlobStore::new()));
        Self::new(Config::default(), store, PromptActions::new(clipboard, cursor))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &PromptStore {
        &self.store
    }

    pub fn actions(&self) -> &PromptActions {
        &self.actions
    }
}
