//! Reading patch batches out of free-form model output.
//!
//! Models wrap the array in prose or code fences often enough that the
//! contract is "somewhere in the text there is a JSON array". The first
//! substring that parses as a JSON array wins. Inside it, elements are
//! accepted leniently: anything that is not an object with string `op` and
//! `path` members is dropped, and the rest is kept. Whether the surviving
//! operations are safe and applicable is the patch engine's call, and it
//! rejects batches as a whole.

use crate::error::{TranslateError, TranslateResult};
use crate::TranslationOutcome;
use pagesmith_schema::PatchOperation;
use serde_json::Value;
use tracing::warn;

const PREVIEW_CHARS: usize = 200;

/// Parse model output into a patch batch
pub fn extract_patches(text: &str) -> TranslateResult<TranslationOutcome> {
    let items = first_json_array(text).ok_or_else(|| {
        TranslateError::parse(format!("no JSON array in response: {}", preview(text)))
    })?;

    if items.is_empty() {
        return Ok(TranslationOutcome::NoChanges);
    }

    let total = items.len();
    let patches: Vec<PatchOperation> = items.into_iter().filter_map(well_formed).collect();

    if patches.is_empty() {
        return Err(TranslateError::parse(format!(
            "none of the {total} array elements is a patch operation"
        )));
    }

    if patches.len() < total {
        warn!(
            kept = patches.len(),
            dropped = total - patches.len(),
            "Dropped malformed patch elements from model response"
        );
    }

    Ok(TranslationOutcome::Patches(patches))
}

/// First `[` from which a complete JSON array parses
fn first_json_array(text: &str) -> Option<Vec<Value>> {
    text.match_indices('[').find_map(|(start, _)| {
        let mut values = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        match values.next() {
            Some(Ok(Value::Array(items))) => Some(items),
            _ => None,
        }
    })
}

fn well_formed(item: Value) -> Option<PatchOperation> {
    let obj = item.as_object()?;
    if !obj.get("op").is_some_and(Value::is_string) || !obj.get("path").is_some_and(Value::is_string)
    {
        return None;
    }
    serde_json::from_value(item).ok()
}

fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        out.push_str("...");
    }
    out
}
