//! Structural diff producing a patch batch.
//!
//! `apply(old, &diff(old, new)) == new` under strict `Value` equality, as
//! long as both roots are the same kind of container. A root that changes
//! kind would need a `""` path, which the patch engine refuses.

use crate::pointer::JsonPointer;
use pagesmith_schema::PatchOperation;
use serde_json::{Map, Value};

pub fn diff(old: &Value, new: &Value) -> Vec<PatchOperation> {
    let mut patches = Vec::new();
    diff_at(&JsonPointer::root(), old, new, &mut patches);
    patches
}

fn diff_at(path: &JsonPointer, old: &Value, new: &Value, out: &mut Vec<PatchOperation>) {
    if old == new {
        return;
    }
    match (old, new) {
        (Value::Object(a), Value::Object(b)) => diff_objects(path, a, b, out),
        (Value::Array(a), Value::Array(b)) => diff_arrays(path, a, b, out),
        _ => out.push(PatchOperation::replace(path.to_string(), new.clone())),
    }
}

fn diff_objects(
    path: &JsonPointer,
    old: &Map<String, Value>,
    new: &Map<String, Value>,
    out: &mut Vec<PatchOperation>,
) {
    for key in old.keys().filter(|key| !new.contains_key(*key)) {
        out.push(PatchOperation::remove(path.child(key.as_str()).to_string()));
    }
    for (key, old_value) in old {
        if let Some(new_value) = new.get(key) {
            diff_at(&path.child(key.as_str()), old_value, new_value, out);
        }
    }
    for (key, value) in new.iter().filter(|(key, _)| !old.contains_key(*key)) {
        out.push(PatchOperation::add(
            path.child(key.as_str()).to_string(),
            value.clone(),
        ));
    }
}

// Index-wise: shared prefix is diffed in place, the tail is removed from the
// end backwards or appended in order.
fn diff_arrays(path: &JsonPointer, old: &[Value], new: &[Value], out: &mut Vec<PatchOperation>) {
    let shared = old.len().min(new.len());
    for (index, (a, b)) in old.iter().zip(new).enumerate() {
        diff_at(&path.child(index.to_string()), a, b, out);
    }
    for index in (shared..old.len()).rev() {
        out.push(PatchOperation::remove(path.child(index.to_string()).to_string()));
    }
    for (index, value) in new.iter().enumerate().skip(shared) {
        out.push(PatchOperation::add(
            path.child(index.to_string()).to_string(),
            value.clone(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch;
    use serde_json::json;

    fn round_trip(old: Value, new: Value) -> Vec<PatchOperation> {
        let patches = diff(&old, &new);
        assert!(patch::is_valid(&patches), "{patches:?}");
        assert_eq!(patch::apply(&old, &patches).unwrap(), new);
        patches
    }

    #[test]
    fn test_identical_documents() {
        assert!(diff(&json!({ "a": [1, 2] }), &json!({ "a": [1, 2] })).is_empty());
    }

    #[test]
    fn test_scalar_change_is_replace() {
        let patches = round_trip(
            json!({ "hero": { "headline": "A", "cta": "Go" } }),
            json!({ "hero": { "headline": "B", "cta": "Go" } }),
        );
        assert_eq!(patches, vec![PatchOperation::replace("/hero/headline", json!("B"))]);
    }

    #[test]
    fn test_keys_added_and_removed() {
        let patches = round_trip(
            json!({ "hero": { "headline": "A" }, "faq": [] }),
            json!({ "hero": { "headline": "A", "ctaColor": "red" } }),
        );
        assert_eq!(
            patches,
            vec![
                PatchOperation::remove("/faq"),
                PatchOperation::add("/hero/ctaColor", json!("red")),
            ]
        );
    }

    #[test]
    fn test_array_growth_and_shrink() {
        round_trip(json!({ "usps": [1, 2] }), json!({ "usps": [1, 2, 3, 4] }));
        round_trip(json!({ "usps": [1, 2, 3, 4] }), json!({ "usps": [9] }));
        round_trip(json!({ "usps": [] }), json!({ "usps": [{ "text": "x" }] }));
    }

    #[test]
    fn test_kind_change_below_root() {
        round_trip(json!({ "a": { "b": 1 } }), json!({ "a": [1] }));
        round_trip(json!({ "a": null }), json!({ "a": "x" }));
    }

    #[test]
    fn test_number_representation_is_strict() {
        let patches = round_trip(json!({ "n": 1 }), json!({ "n": 1.0 }));
        assert_eq!(patches.len(), 1);
    }

    #[test]
    fn test_keys_needing_escapes() {
        round_trip(json!({}), json!({ "a/b": 1, "m~n": 2 }));
    }

    #[test]
    fn test_root_arrays() {
        round_trip(json!([1, 2, 3]), json!([3]));
    }
}
