//! Picks the bot's reply text out of a flow response.
//!
//! Resolution order: configured output key, then a lone result field, then a
//! field named `output`. Anything else is reported back as an error message
//! listing the keys so the widget owner can configure one.

use serde_json::{Map, Value};

use crate::state::ResolvedReply;

/// Field name used when neither an output key nor a single result field applies
pub const DEFAULT_OUTPUT_FIELD: &str = "output";

/// Resolve a flow payload into reply text.
///
/// Returns `None` when the payload carries no `result` object; the caller
/// decides what happens to the pending bubble in that case.
pub fn resolve(payload: Option<&Value>, output_key: Option<&str>) -> Option<ResolvedReply> {
    let result = payload?.get("result")?.as_object()?;

    if let Some(value) = output_key.and_then(|key| result.get(key)) {
        if is_truthy(value) {
            return Some(ResolvedReply::text(value_to_text(value)));
        }
    }

    if result.len() == 1 {
        let value = result.values().next()?;
        return Some(ResolvedReply::text(value_to_text(value)));
    }

    if let Some(value) = result.get(DEFAULT_OUTPUT_FIELD) {
        return Some(ResolvedReply::text(value_to_text(value)));
    }

    Some(ResolvedReply::error(ambiguous_keys_message(result)))
}

fn ambiguous_keys_message(result: &Map<String, Value>) -> String {
    let keys: Vec<&str> = result.keys().map(String::as_str).collect();
    format!(
        "Multiple output keys were detected in the response: {}. Please, define the output key to specify the intended response.",
        keys.join(", ")
    )
}

/// Strings are shown as-is; everything else as compact JSON.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// An output key holding an empty or zero-ish value falls through to the other rules.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
