//! Persisted prompt collection
//!
//! Every operation is a full read-modify-write of the collection stored
//! under one key: read the blob, sanitize it, mutate in memory, serialize
//! and write the whole thing back. There is no locking; two interleaved
//! writers race and the last one wins.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::{PromptError, Result};
use crate::template::validate_template;
use crate::util::is_blank;

pub mod blob;
pub mod clock;
pub mod prompts;

pub use blob::{BlobStore, FileBlobStore, MemoryBlobStore};
pub use clock::{Clock, SteppingClock, SystemClock};
pub use prompts::{CreatePrompt, Prompt, UpdatePrompt};

/// Key the collection is stored under unless configured otherwise
pub const DEFAULT_STORAGE_KEY: &str = "prompts";

/// CRUD over the prompt collection
#[derive(Clone)]
pub struct PromptStore {
    blobs: Arc<dyn BlobStore>,
    clock: Arc<dyn Clock>,
    key:   String,
}

impl PromptStore {
    /// Store over `blobs` using the default key and the system clock
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            blobs,
            clock: Arc::new(SystemClock),
            key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn now(&self) -> String {
        prompts::format_timestamp(self.clock.now())
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Load and sanitize the collection in stored order
    ///
    /// # Errors
    /// - `StorageRead`: the blob store failed
    /// - `CorruptedStorage`: the blob is not valid JSON
    /// - `InvalidDataFormat`: the blob is valid JSON but not an array
    async fn load(&self) -> Result<Vec<Prompt>> {
        let raw = match self.blobs.get_item(&self.key).await? {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => return Ok(Vec::new()),
        };

        let parsed: Value = serde_json::from_str(&raw)
            .map_err(|e| PromptError::CorruptedStorage(e.to_string()))?;

        let items = match parsed {
            Value::Array(items) => items,
            other => {
                return Err(PromptError::InvalidDataFormat(format!(
                    "expected an array of prompts, found {}",
                    json_type_name(&other)
                )))
            },
        };

        // Only read the clock if some record actually needs a backfill.
        let mut backfill: Option<String> = None;
        let mut now = || backfill.get_or_insert_with(|| self.now()).clone();

        let mut loaded = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match prompts::sanitize_prompt(item, &mut now) {
                Ok(prompt) => {
                    if !prompts::is_valid_prompt(item) {
                        debug!(index, id = %prompt.id, "repaired stored prompt");
                    }
                    loaded.push(prompt);
                },
                Err(reason) => warn!(index, %reason, "skipping invalid stored prompt"),
            }
        }

        Ok(loaded)
    }

    async fn save(&self, prompts: &[Prompt]) -> Result<()> {
        let json = serde_json::to_string(prompts)
            .map_err(|e| PromptError::StorageWrite(e.to_string()))?;
        self.blobs.set_item(&self.key, &json).await
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// All prompts, most recently updated first
    pub async fn list(&self) -> Result<Vec<Prompt>> {
        let mut prompts = self.load().await?;
        prompts::sort_by_recency(&mut prompts);
        Ok(prompts)
    }

    /// Prompt with `id`, or `None`
    pub async fn get(&self, id: &str) -> Result<Option<Prompt>> {
        let prompts = self.load().await?;
        Ok(prompts.into_iter().find(|p| p.id == id))
    }

    /// Number of prompts after sanitizing
    pub async fn count(&self) -> Result<usize> {
        Ok(self.load().await?.len())
    }

    /// Prompts carrying `tag` (case-insensitive exact match), sorted like `list`
    pub async fn find_by_tag(&self, tag: &str) -> Result<Vec<Prompt>> {
        let prompts = self.list().await?;
        Ok(prompts.into_iter().filter(|p| p.has_tag(tag)).collect())
    }

    /// Prompts whose title, body or a tag contains `query`, sorted like `list`
    ///
    /// Case-insensitive; an empty query returns every prompt.
    pub async fn search(&self, query: &str) -> Result<Vec<Prompt>> {
        let prompts = self.list().await?;
        Ok(prompts.into_iter().filter(|p| p.matches(query)).collect())
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Create a prompt
    ///
    /// # Errors
    /// - `Validation`: blank title or body, blank tag, or more than one `{cursor}`
    pub async fn create(&self, input: CreatePrompt) -> Result<Prompt> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(PromptError::validation("Title is required"));
        }
        let body = input.body.trim();
        if body.is_empty() {
            return Err(PromptError::validation("Body is required"));
        }
        validate_template(body)?;
        let tags = normalize_tags(input.tags)?;

        let mut prompts = self.load().await?;

        let now = self.now();
        let prompt = Prompt {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            body: body.to_string(),
            tags,
            created_at: now.clone(),
            updated_at: now,
            last_used_at: None,
        };

        prompts.push(prompt.clone());
        self.save(&prompts).await?;

        info!(id = %prompt.id, "created prompt");
        Ok(prompt)
    }

    /// Apply a partial update
    ///
    /// Nothing is written when validation fails.
    ///
    /// # Errors
    /// - `PromptNotFound`: no prompt with `id`
    /// - `Validation`: the resulting title or body is blank, a tag is blank,
    ///   or a new body has more than one `{cursor}`
    pub async fn update(&self, id: &str, patch: UpdatePrompt) -> Result<Prompt> {
        let mut prompts = self.load().await?;
        let index = prompts
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| PromptError::PromptNotFound(id.to_string()))?;

        let mut updated = prompts[index].clone();

        if let Some(title) = patch.title {
            updated.title = title.trim().to_string();
        }
        let body_changed = patch.body.is_some();
        if let Some(body) = patch.body {
            updated.body = body.trim().to_string();
        }
        if patch.tags.is_some() {
            updated.tags = normalize_tags(patch.tags)?;
        }

        if updated.title.trim().is_empty() {
            return Err(PromptError::validation("Title cannot be empty"));
        }
        if updated.body.trim().is_empty() {
            return Err(PromptError::validation("Body cannot be empty"));
        }
        if body_changed {
            validate_template(&updated.body)?;
        }
        updated.updated_at = self.now();

        prompts[index] = updated.clone();
        self.save(&prompts).await?;

        info!(id, "updated prompt");
        Ok(updated)
    }

    /// Remove a prompt permanently
    ///
    /// # Errors
    /// - `PromptNotFound`: no prompt with `id`
    pub async fn delete(&self, id: &str) -> Result<()> {
        let mut prompts = self.load().await?;
        let before = prompts.len();
        prompts.retain(|p| p.id != id);

        if prompts.len() == before {
            return Err(PromptError::PromptNotFound(id.to_string()));
        }

        self.save(&prompts).await?;
        info!(id, "deleted prompt");
        Ok(())
    }

    /// Stamp `lastUsedAt`; nothing else changes
    ///
    /// # Errors
    /// - `PromptNotFound`: no prompt with `id`
    pub async fn mark_used(&self, id: &str) -> Result<Prompt> {
        let mut prompts = self.load().await?;
        let prompt = prompts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| PromptError::PromptNotFound(id.to_string()))?;

        prompt.last_used_at = Some(self.now());
        let used = prompt.clone();

        self.save(&prompts).await?;
        debug!(id, "marked prompt used");
        Ok(used)
    }

    /// Remove the persisted collection entirely
    pub async fn clear(&self) -> Result<()> {
        self.blobs.remove_item(&self.key).await?;
        info!(key = %self.key, "cleared prompts");
        Ok(())
    }
}

/// Reject blank tags; an empty list becomes `None`
fn normalize_tags(tags: Option<Vec<String>>) -> Result<Option<Vec<String>>> {
    match tags {
        None => Ok(None),
        Some(tags) if tags.is_empty() => Ok(None),
        Some(tags) => {
            if tags.iter().any(|t| is_blank(Some(t))) {
                return Err(PromptError::validation("Tags cannot be empty"));
            }
            Ok(Some(tags))
        },
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
