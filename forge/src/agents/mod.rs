//! Agent step functions for the three model roles.
//!
//! Each agent renders its role prompt, invokes the chat client, then
//! schema-validates and parses the JSON reply. Models sometimes fence their
//! JSON in markdown or wrap it in a single-key envelope like
//! `{"Plan": {...}}`; both forms are tolerated here so one sloppy reply does
//! not abort a whole job.

use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::model::validate_schema;

pub mod architect;
pub mod coder;
pub mod planner;

pub use architect::ArchitectAgent;
pub use coder::{CoderAgent, CoderStepOutcome};
pub use planner::PlannerAgent;

/// Strip a surrounding markdown code fence (with optional `json` tag).
fn strip_fence(raw: &str) -> &str {
    static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$").expect("fence regex")
    });
    match FENCE_RE.captures(raw) {
        Some(caps) => caps.get(1).map_or(raw, |m| m.as_str()),
        None => raw.trim(),
    }
}

/// Unwrap `{"<key>": {...}}` envelopes some models produce.
fn unwrap_envelope(value: Value, key: &str) -> Value {
    match value {
        Value::Object(ref map) if map.len() == 1 && map.contains_key(key) => {
            value[key].clone()
        }
        other => other,
    }
}

/// Parse a model reply: strip fences, unwrap envelope, schema-validate,
/// deserialize.
pub(crate) fn parse_validated<T: DeserializeOwned>(
    raw: &str,
    schema: &str,
    envelope_key: &str,
) -> Result<T> {
    let cleaned = strip_fence(raw);
    let value: Value =
        serde_json::from_str(cleaned).context("parse model reply as json")?;
    let value = unwrap_envelope(value, envelope_key);
    validate_schema(&value, schema)?;
    let parsed = serde_json::from_value(value).context("deserialize model reply")?;
    Ok(parsed)
}
