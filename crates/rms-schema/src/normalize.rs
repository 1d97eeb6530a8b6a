//! Opt-in payload normalization.

use serde_json::{json, Value};

/// Rewrite a legacy `tags: ["a", "b"]` array into
/// `tags: [{"name": "a", "timestamp": ts}, ...]`.
///
/// Returns a new value; the input is never touched. Payloads without a tag
/// array, or whose tags are already structured (or mixed), come back
/// unchanged.
pub fn normalize_tags(payload: &Value, timestamp: u64) -> Value {
    let mut out = payload.clone();
    let Some(tags) = out.get_mut("tags").and_then(Value::as_array_mut) else {
        return out;
    };
    if !tags.iter().all(Value::is_string) {
        return out;
    }
    for tag in tags.iter_mut() {
        let name = tag.take();
        *tag = json!({"name": name, "timestamp": timestamp});
    }
    out
}
