//! Prompt library commands
//!
//! Thin JSON adapters over [`PromptStore`](crate::store::PromptStore) and
//! [`PromptActions`](crate::actions::PromptActions). Arguments are camelCase
//! objects; malformed arguments fail with `InvalidArgs`.

use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use super::parse_args;
use crate::app::App;
use crate::errors::{PromptError, Result};
use crate::runtime;
use crate::store::prompts::parse_timestamp;
use crate::store::{CreatePrompt, Prompt, UpdatePrompt};
use crate::template::has_placeholders;
use crate::util::{format_relative_time, parse_tags, truncate_text};

// ============================================================================
// Arguments
// ============================================================================

#[derive(Debug, Deserialize)]
struct IdArgs {
    id: String,
}

/// Tags as sent by a form (comma-separated) or by code (array)
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TagsArg {
    List(Vec<String>),
    Text(String),
}

impl TagsArg {
    /// An empty string means "no tags", same as an empty list
    fn into_tags(self) -> Vec<String> {
        match self {
            TagsArg::List(tags) => tags,
            TagsArg::Text(text) => parse_tags(&text).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreateArgs {
    title: String,
    body:  String,
    #[serde(default)]
    tags:  Option<TagsArg>,
}

#[derive(Debug, Deserialize)]
struct UpdateArgs {
    id:    String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    body:  Option<String>,
    #[serde(default)]
    tags:  Option<TagsArg>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListArgs {
    /// Include a `preview` of each body cut to this many characters
    #[serde(default)]
    preview_length: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    #[serde(default)]
    query: String,
}

#[derive(Debug, Deserialize)]
struct TagArgs {
    tag: String,
}

/// Which rendering a copy/paste uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Mode {
    Raw,
    Filled,
    /// Filled when the body has placeholders, raw otherwise
    #[default]
    Auto,
}

impl Mode {
    fn fills(self, body: &str) -> bool {
        match self {
            Mode::Raw => false,
            Mode::Filled => true,
            Mode::Auto => has_placeholders(body),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TransferArgs {
    id:   String,
    #[serde(default)]
    mode: Mode,
}

// ============================================================================
// Queries
// ============================================================================

pub fn list(app: &App, args: Value) -> Result<Value> {
    let args: ListArgs = parse_args("prompts.list", args)?;
    let prompts = runtime::block_on(app.store().list())??;

    let prompts = match args.preview_length {
        Some(max) => prompts
            .iter()
            .map(|p| with_preview(p, max))
            .collect::<Result<Vec<_>>>()?,
        None => prompts
            .iter()
            .map(serde_json::to_value)
            .collect::<serde_json::Result<Vec<_>>>()?,
    };

    Ok(json!({ "prompts": prompts }))
}

pub fn get(app: &App, args: Value) -> Result<Value> {
    let args: IdArgs = parse_args("prompts.get", args)?;
    let prompt = runtime::block_on(app.store().get(&args.id))??;

    match prompt {
        Some(prompt) => {
            let mut value = serde_json::to_value(&prompt)?;
            if let Some(relative) = last_used_relative(&prompt) {
                value["lastUsedRelative"] = json!(relative);
            }
            Ok(value)
        },
        None => Ok(Value::Null),
    }
}

pub fn count(app: &App, _args: Value) -> Result<Value> {
    let count = runtime::block_on(app.store().count())??;
    Ok(json!({ "count": count }))
}

pub fn search(app: &App, args: Value) -> Result<Value> {
    let args: SearchArgs = parse_args("prompts.search", args)?;
    let prompts = runtime::block_on(app.store().search(&args.query))??;
    Ok(json!({ "prompts": prompts }))
}

pub fn find_by_tag(app: &App, args: Value) -> Result<Value> {
    let args: TagArgs = parse_args("prompts.find_by_tag", args)?;
    let prompts = runtime::block_on(app.store().find_by_tag(&args.tag))??;
    Ok(json!({ "prompts": prompts }))
}

// ============================================================================
// Mutations
// ============================================================================

pub fn create(app: &App, args: Value) -> Result<Value> {
    let args: CreateArgs = parse_args("prompts.create", args)?;
    let input = CreatePrompt {
        title: args.title,
        body:  args.body,
        tags:  args.tags.map(TagsArg::into_tags),
    };

    let prompt = runtime::block_on(app.store().create(input))??;
    Ok(json!(prompt))
}

pub fn update(app: &App, args: Value) -> Result<Value> {
    let args: UpdateArgs = parse_args("prompts.update", args)?;
    let patch = UpdatePrompt {
        title: args.title,
        body:  args.body,
        tags:  args.tags.map(TagsArg::into_tags),
    };

    let prompt = runtime::block_on(app.store().update(&args.id, patch))??;
    Ok(json!(prompt))
}

pub fn delete(app: &App, args: Value) -> Result<Value> {
    let args: IdArgs = parse_args("prompts.delete", args)?;
    runtime::block_on(app.store().delete(&args.id))??;
    Ok(json!({ "success": true }))
}

pub fn use_prompt(app: &App, args: Value) -> Result<Value> {
    let args: IdArgs = parse_args("prompts.use", args)?;
    let prompt = runtime::block_on(app.store().mark_used(&args.id))??;
    Ok(json!(prompt))
}

pub fn clear(app: &App, _args: Value) -> Result<Value> {
    runtime::block_on(app.store().clear())??;
    Ok(json!({ "success": true }))
}

// ============================================================================
// Copy / paste
// ============================================================================

pub fn copy(app: &App, args: Value) -> Result<Value> {
    let args: TransferArgs = parse_args("prompts.copy", args)?;
    transfer(app, args, Transfer::Copy)
}

pub fn paste(app: &App, args: Value) -> Result<Value> {
    let args: TransferArgs = parse_args("prompts.paste", args)?;
    transfer(app, args, Transfer::Paste)
}

#[derive(Debug, Clone, Copy)]
enum Transfer {
    Copy,
    Paste,
}

/// Run the action, then record usage unless the action failed
///
/// A failure to record usage does not undo the copy/paste and is only logged.
fn transfer(app: &App, args: TransferArgs, transfer: Transfer) -> Result<Value> {
    runtime::block_on(async {
        let prompt = app
            .store()
            .get(&args.id)
            .await?
            .ok_or_else(|| PromptError::PromptNotFound(args.id.clone()))?;

        let filled = args.mode.fills(&prompt.body);
        let actions = app.actions();
        let outcome = match (transfer, filled) {
            (Transfer::Copy, false) => actions.copy_raw(&prompt).await,
            (Transfer::Copy, true) => actions.copy_filled(&prompt).await,
            (Transfer::Paste, false) => actions.paste_raw(&prompt).await,
            (Transfer::Paste, true) => actions.paste_filled(&prompt).await,
        };

        if outcome.is_success() {
            if let Err(e) = app.store().mark_used(&prompt.id).await {
                warn!(id = %prompt.id, error = %e, "failed to record usage");
            }
        }

        let mut value = serde_json::to_value(&outcome)?;
        value["filled"] = json!(filled);
        Ok::<Value, PromptError>(value)
    })?
}

// ============================================================================
// Helpers
// ============================================================================

fn with_preview(prompt: &Prompt, max: usize) -> Result<Value> {
    let mut value = serde_json::to_value(prompt)?;
    value["preview"] = json!(truncate_text(&prompt.body, max));
    Ok(value)
}

fn last_used_relative(prompt: &Prompt) -> Option<String> {
    let used = parse_timestamp(prompt.last_used_at.as_deref()?)?;
    Some(format_relative_time(used, Utc::now()))
}
