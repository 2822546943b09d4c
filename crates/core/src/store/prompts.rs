use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored prompt
///
/// Serialized camelCase; `tags` and `lastUsedAt` are omitted when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub id:           String,
    pub title:        String,
    pub body:         String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags:         Option<Vec<String>>,
    pub created_at:   String,
    pub updated_at:   String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<String>,
}

/// Input for creating a prompt
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePrompt {
    pub title: String,
    pub body:  String,
    #[serde(default)]
    pub tags:  Option<Vec<String>>,
}

impl CreatePrompt {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body:  body.into(),
            tags:  None,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }
}

/// Partial update; `None` fields are left untouched
///
/// `tags: Some(vec![])` clears the tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePrompt {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body:  Option<String>,
    #[serde(default)]
    pub tags:  Option<Vec<String>>,
}

impl UpdatePrompt {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn body(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..Self::default()
        }
    }

    pub fn tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: Some(tags.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }
}

impl Prompt {
    /// Whether any tag equals `tag`, ignoring case
    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = tag.to_lowercase();
        self.tags
            .iter()
            .flatten()
            .any(|t| t.to_lowercase() == tag)
    }

    /// Whether title, body or any tag contains `query`, ignoring case
    ///
    /// An empty query matches every prompt.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.title.to_lowercase().contains(&query)
            || self.body.to_lowercase().contains(&query)
            || self
                .tags
                .iter()
                .flatten()
                .any(|t| t.to_lowercase().contains(&query))
    }
}

// ============================================================================
// Timestamps
// ============================================================================

/// ISO-8601 with millisecond precision and a `Z` suffix
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Most recently updated first; unparsable `updatedAt` sorts last
///
/// Stable, so ties keep their stored order.
pub fn sort_by_recency(prompts: &mut [Prompt]) {
    prompts.sort_by(|a, b| compare_recency(a, b));
}

fn compare_recency(a: &Prompt, b: &Prompt) -> Ordering {
    let a_at = parse_timestamp(&a.updated_at);
    let b_at = parse_timestamp(&b.updated_at);
    b_at.cmp(&a_at)
}

// ============================================================================
// Sanitizing persisted records
// ============================================================================

/// Why a persisted element could not be turned into a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    NotAnObject,
    MissingField(&'static str),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NotAnObject => write!(f, "element is not an object"),
            Rejection::MissingField(field) => {
                write!(f, "field `{}` is missing or not a string", field)
            },
        }
    }
}

/// Whether a persisted element is already a well-formed prompt
pub fn is_valid_prompt(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };

    let tags_ok = match obj.get("tags") {
        None => true,
        Some(Value::Array(items)) => items.iter().all(Value::is_string),
        Some(_) => false,
    };
    let last_used_ok = match obj.get("lastUsedAt") {
        None => true,
        Some(v) => v.is_string(),
    };

    ["id", "title", "body"]
        .iter()
        .all(|field| obj.get(*field).is_some_and(Value::is_string))
        && ["createdAt", "updatedAt"]
            .iter()
            .all(|field| timestamp_field(obj, field).is_some())
        && tags_ok
        && last_used_ok
}

/// Turn a persisted element into a prompt, repairing what can be repaired
///
/// `id`, `title` and `body` must be strings or the element is rejected.
/// Missing or unparsable timestamps are backfilled with `now()`; `tags` keeps
/// only its string elements and becomes absent when nothing is left; a
/// non-string `lastUsedAt` is dropped.
pub fn sanitize_prompt(
    value: &Value,
    now: &mut dyn FnMut() -> String,
) -> Result<Prompt, Rejection> {
    let obj = value.as_object().ok_or(Rejection::NotAnObject)?;

    let id = string_field(obj, "id")?;
    let title = string_field(obj, "title")?;
    let body = string_field(obj, "body")?;

    let created_at = timestamp_field(obj, "createdAt").unwrap_or_else(&mut *now);
    let updated_at = timestamp_field(obj, "updatedAt").unwrap_or_else(&mut *now);

    let tags = match obj.get("tags") {
        Some(Value::Array(items)) => {
            let tags: Vec<String> = items
                .iter()
                .filter_map(|t| t.as_str().map(String::from))
                .collect();
            (!tags.is_empty()).then_some(tags)
        },
        _ => None,
    };

    let last_used_at = obj
        .get("lastUsedAt")
        .and_then(Value::as_str)
        .map(String::from);

    Ok(Prompt {
        id,
        title,
        body,
        tags,
        created_at,
        updated_at,
        last_used_at,
    })
}

fn string_field(obj: &Map<String, Value>, field: &'static str) -> Result<String, Rejection> {
    obj.get(field)
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or(Rejection::MissingField(field))
}

fn timestamp_field(obj: &Map<String, Value>, field: &str) -> Option<String> {
    obj.get(field)
        .and_then(Value::as_str)
        .filter(|s| parse_timestamp(s).is_some())
        .map(String::from)
}
