//! Command registry and dispatch system
//!
//! This module provides a static registry of commands the embedding host can
//! call. Commands are registered as "category.action" (e.g., "prompts.list",
//! "placeholders.inspect") and dispatched to handler functions together with
//! the host's [`App`].
//!
//! ## Adding a new command
//!
//! 1. Create handler function: `pub fn my_command(app: &App, args: Value) -> Result<Value>`
//! 2. Register in `REGISTRY`: `("category.action", my_command as CommandHandler)`
//! 3. Add tests for the command

use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::app::App;
use crate::errors::{PromptError, Result};

pub mod placeholders;
pub mod prompts;

/// Type alias for command handler functions
///
/// All command handlers take the app context and a JSON Value (arguments)
/// and return a Result<Value>
pub type CommandHandler = fn(&App, Value) -> Result<Value>;

/// Static command registry
///
/// Maps command names to handler functions. Initialized lazily on first access.
static REGISTRY: Lazy<HashMap<&'static str, CommandHandler>> = Lazy::new(|| {
    let mut map = HashMap::new();

    // Test command
    map.insert("ping", ping as CommandHandler);

    // Prompt library
    map.insert("prompts.list", prompts::list as CommandHandler);
    map.insert("prompts.get", prompts::get as CommandHandler);
    map.insert("prompts.create", prompts::create as CommandHandler);
    map.insert("prompts.update", prompts::update as CommandHandler);
    map.insert("prompts.delete", prompts::delete as CommandHandler);
    map.insert("prompts.use", prompts::use_prompt as CommandHandler);
    map.insert("prompts.count", prompts::count as CommandHandler);
    map.insert("prompts.search", prompts::search as CommandHandler);
    map.insert("prompts.find_by_tag", prompts::find_by_tag as CommandHandler);
    map.insert("prompts.clear", prompts::clear as CommandHandler);
    map.insert("prompts.copy", prompts::copy as CommandHandler);
    map.insert("prompts.paste", prompts::paste as CommandHandler);

    // Placeholders
    map.insert("placeholders.list", placeholders::list as CommandHandler);
    map.insert("placeholders.inspect", placeholders::inspect as CommandHandler);

    map
});

/// Dispatch a command by name
///
/// Looks up the command in the registry and executes it with the provided arguments.
///
/// # Arguments
/// * `app` - Application context built by the host
/// * `command` - Command name (e.g., "ping", "prompts.list")
/// * `args` - Command arguments as JSON Value
///
/// # Returns
/// Command result as JSON Value, or error if command not found
pub fn dispatch(app: &App, command: &str, args: Value) -> Result<Value> {
    match REGISTRY.get(command) {
        Some(handler) => handler(app, args),
        None => Err(PromptError::CommandNotFound(command.to_string())),
    }
}

/// Host entry point for command execution
///
/// Never fails: errors come back as the object built by [`error_object`].
pub fn call(app: &App, command: &str, args: Value) -> Value {
    match dispatch(app, command, args) {
        Ok(result) => result,
        Err(err) => {
            tracing::debug!(command, error = %err, "command failed");
            error_object(&err)
        },
    }
}

/// Create a structured error object for the host
///
/// Returns an object with fields:
/// - `error`: true (marker that this is an error response)
/// - `message`: user-friendly error message
/// - `category`: error category for logging/handling
/// - `kind`: coarse error kind the host switches on
pub fn error_object(err: &PromptError) -> Value {
    json!({
        "error": true,
        "message": err.user_message(),
        "category": err.category(),
        "kind": err.kind(),
    })
}

/// List all available commands
///
/// Returns a sorted list of all registered command names.
pub fn list_commands() -> Vec<String> {
    let mut commands: Vec<String> = REGISTRY.keys().map(|&k| k.to_string()).collect();
    commands.sort();
    commands
}

/// Deserialize command arguments, reporting failures as `InvalidArgs`
///
/// `null` is treated as an empty object so commands without required
/// arguments can be called bare.
pub(crate) fn parse_args<T: DeserializeOwned>(command: &str, args: Value) -> Result<T> {
    let args = if args.is_null() { json!({}) } else { args };
    serde_json::from_value(args).map_err(|e| PromptError::InvalidArgs {
        command: command.to_string(),
        reason:  e.to_string(),
    })
}

// ============================================================================
// Test Commands
// ============================================================================

/// Ping command - simple test to verify command dispatch works
///
/// Returns the input arguments with an added "pong" field.
///
/// # Example
/// ```json
/// // Input:  {"message": "hello"}
/// // Output: {"message": "hello", "pong": true}
/// ```
fn ping(_app: &App, args: Value) -> Result<Value> {
    let mut result = match args {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };

    result.insert("pong".to_string(), Value::Bool(true));
    Ok(Value::Object(result))
}
