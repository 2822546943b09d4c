//! Global Async Runtime
//!
//! The command boundary is synchronous; store and collaborator calls are
//! async. This shared runtime bridges the two.

use once_cell::sync::Lazy;
use tokio::runtime::Runtime;

use crate::errors::{PromptError, Result};

/// Global shared Tokio runtime, built on first use
static RUNTIME: Lazy<std::result::Result<Runtime, String>> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("prompt-pocket")
        .build()
        .map_err(|e| e.to_string())
});

/// Run a future to completion, blocking the current thread
///
/// Must not be called from inside another tokio runtime.
///
/// # Errors
/// - `Other`: the runtime could not be created
pub fn block_on<F: std::future::Future>(future: F) -> Result<F::Output> {
    match RUNTIME.as_ref() {
        Ok(rt) => Ok(rt.block_on(future)),
        Err(e) => Err(PromptError::Other(format!("Failed to create Tokio runtime: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_on_runs_future() {
        let value = block_on(async { 40 + 2 }).unwrap();
        assert_eq!(value, 42);
    }
}
