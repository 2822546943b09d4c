//! Cached, subscribable view of the prompt collection
//!
//! Presentation layers hold a [`PromptView`] instead of calling `list()`
//! after every change. Mutations go through the store first; only after the
//! write succeeded is the cached snapshot patched and re-sorted locally, so
//! the snapshot always equals what a fresh `list()` would return.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::store::prompts::sort_by_recency;
use crate::store::{CreatePrompt, Prompt, PromptStore, UpdatePrompt};

/// Snapshot published to subscribers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub prompts:    Vec<Prompt>,
    pub is_loading: bool,
    /// User-facing message of the last failed reload
    pub error:      Option<String>,
}

/// Store wrapper that keeps a sorted snapshot and notifies subscribers
pub struct PromptView {
    store: PromptStore,
    state: watch::Sender<Arc<ViewState>>,
}

impl PromptView {
    /// Empty view; call [`PromptView::reload`] to populate it
    pub fn new(store: PromptStore) -> Self {
        let initial = ViewState {
            is_loading: true,
            ..ViewState::default()
        };
        let (state, _) = watch::channel(Arc::new(initial));
        Self { store, state }
    }

    pub fn store(&self) -> &PromptStore {
        &self.store
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<ViewState> {
        self.state.borrow().clone()
    }

    /// Receive every snapshot published from now on
    pub fn subscribe(&self) -> watch::Receiver<Arc<ViewState>> {
        self.state.subscribe()
    }

    fn publish(&self, state: ViewState) {
        debug!(count = state.prompts.len(), "publishing prompt view");
        self.state.send_replace(Arc::new(state));
    }

    /// Patch the snapshot after a successful store write
    ///
    /// A snapshot that was never loaded, or whose last reload failed, is not
    /// a complete copy of the collection; it is replaced by a fresh `list()`
    /// instead of being patched.
    async fn apply(&self, f: impl FnOnce(&mut Vec<Prompt>)) {
        let current = self.snapshot();
        if current.is_loading || current.error.is_some() {
            if let Err(err) = self.reload().await {
                warn!(error = %err, "prompt view reload after write failed");
            }
            return;
        }

        let mut prompts = current.prompts.clone();
        f(&mut prompts);
        sort_by_recency(&mut prompts);
        self.publish(ViewState {
            prompts,
            is_loading: false,
            error: None,
        });
    }

    /// Replace the snapshot with a fresh `list()`
    ///
    /// On failure the previous prompts are kept and the error is published
    /// alongside them.
    pub async fn reload(&self) -> Result<()> {
        match self.store.list().await {
            Ok(prompts) => {
                self.publish(ViewState {
                    prompts,
                    is_loading: false,
                    error: None,
                });
                Ok(())
            },
            Err(err) => {
                let previous = self.snapshot().prompts.clone();
                self.publish(ViewState {
                    prompts:    previous,
                    is_loading: false,
                    error:      Some(err.user_message()),
                });
                Err(err)
            },
        }
    }

    pub async fn create(&self, input: CreatePrompt) -> Result<Prompt> {
        let created = self.store.create(input).await?;
        let inserted = created.clone();
        self.apply(|prompts| prompts.push(inserted)).await;
        Ok(created)
    }

    pub async fn update(&self, id: &str, patch: UpdatePrompt) -> Result<Prompt> {
        let updated = self.store.update(id, patch).await?;
        self.apply(|prompts| replace(prompts, &updated)).await;
        Ok(updated)
    }

    pub async fn remove(&self, id: &str) -> Result<()> {
        self.store.delete(id).await?;
        self.apply(|prompts| prompts.retain(|p| p.id != id)).await;
        Ok(())
    }

    pub async fn mark_used(&self, id: &str) -> Result<Prompt> {
        let used = self.store.mark_used(id).await?;
        self.apply(|prompts| replace(prompts, &used)).await;
        Ok(used)
    }
}

fn replace(prompts: &mut Vec<Prompt>, with: &Prompt) {
    match prompts.iter_mut().find(|p| p.id == with.id) {
        Some(slot) => *slot = with.clone(),
        None => prompts.push(with.clone()),
    }
}
