//! Placeholder commands
//!
//! Let the host show which placeholders exist and preview how a body will be
//! treated before saving it.

use serde::Deserialize;
use serde_json::{json, Value};

use super::parse_args;
use crate::app::App;
use crate::errors::Result;
use crate::template::{count_placeholders, has_placeholders, validate_template, SUPPORTED_PLACEHOLDERS};

#[derive(Debug, Deserialize)]
struct InspectArgs {
    body: String,
}

pub fn list(_app: &App, _args: Value) -> Result<Value> {
    Ok(json!({ "placeholders": SUPPORTED_PLACEHOLDERS }))
}

/// Report placeholder usage of a body and whether it would be accepted
///
/// An invalid body is not an error here; the reason is returned instead.
pub fn inspect(_app: &App, args: Value) -> Result<Value> {
    let args: InspectArgs = parse_args("placeholders.inspect", args)?;
    let counts = count_placeholders(&args.body);

    let mut result = json!({
        "hasPlaceholders": has_placeholders(&args.body),
        "counts": counts,
        "valid": true,
    });
    if let Err(err) = validate_template(&args.body) {
        result["valid"] = json!(false);
        result["message"] = json!(err.user_message());
    }

    Ok(result)
}
