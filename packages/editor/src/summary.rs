//! Human-readable summaries of patch batches, used as version messages and
//! in assistant replies.

use pagesmith_schema::{PatchOp, PatchOperation};
use serde_json::Value;

pub fn describe_patches(patches: &[PatchOperation]) -> String {
    let mut phrases: Vec<String> = Vec::new();
    for patch in patches {
        let phrase = describe(patch);
        if !phrases.contains(&phrase) {
            phrases.push(phrase);
        }
    }

    if phrases.is_empty() {
        "no changes".to_string()
    } else {
        phrases.join(", ")
    }
}

fn describe(patch: &PatchOperation) -> String {
    let segments: Vec<&str> = patch.path.trim_start_matches('/').split('/').collect();
    let text = |key: &str| {
        patch
            .value
            .as_ref()
            .and_then(|value| value.get(key))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    match (&patch.op, segments.as_slice()) {
        (PatchOp::Test, _) => "checked current content".to_string(),
        (_, ["hero", "headline", ..]) => "updated headline".to_string(),
        (_, ["hero", "subhead", ..]) => "updated subhead".to_string(),
        (_, ["hero", "cta", ..]) => "updated button text".to_string(),
        (_, ["hero", "ctaColor", ..]) => "changed button colour".to_string(),
        (_, ["hero", "image" | "images", ..]) => "updated hero image".to_string(),

        (PatchOp::Add, ["usps", _]) => match text("text") {
            Some(text) => format!("added USP: {text}"),
            None => "added a USP".to_string(),
        },
        (PatchOp::Remove, ["usps", _]) => "removed a USP".to_string(),
        (PatchOp::Move, ["usps", _]) => "reordered USPs".to_string(),
        (_, ["usps", ..]) => "updated USPs".to_string(),

        (PatchOp::Add, ["faq"]) => "added FAQ section".to_string(),
        (PatchOp::Add, ["faq", _]) => match text("q") {
            Some(question) => format!("added FAQ: {question}"),
            None => "added a FAQ entry".to_string(),
        },
        (PatchOp::Remove, ["faq", _]) => "removed a FAQ entry".to_string(),
        (_, ["faq", ..]) => "updated FAQ".to_string(),

        (_, ["science", ..]) => "updated science section".to_string(),
        (_, ["specs", ..]) => "updated specs".to_string(),
        (_, ["offer", ..]) => "updated offer".to_string(),
        _ => format!("{} {}", patch.op, patch.path),
    }
}

/// Every string in the values a batch writes
pub fn written_text(patches: &[PatchOperation]) -> Vec<&str> {
    fn collect<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
        match value {
            Value::String(text) => out.push(text),
            Value::Array(items) => items.iter().for_each(|item| collect(item, out)),
            Value::Object(map) => map.values().for_each(|item| collect(item, out)),
            _ => {}
        }
    }

    let mut out = Vec::new();
    for patch in patches.iter().filter(|p| matches!(p.op, PatchOp::Add | PatchOp::Replace)) {
        if let Some(value) = &patch.value {
            collect(value, &mut out);
        }
    }
    out
}
