//! # Patch Engine
//!
//! Validates, applies and optimizes RFC 6902 patch batches against a
//! `serde_json::Value` document.
//!
//! ## Batch semantics
//!
//! - A batch is validated as a whole before anything is applied
//! - Operations run in order against a copy of the document
//! - The first failing operation fails the batch; the caller's document is
//!   never half-patched
//!
//! ## Safety rules
//!
//! - `op` must be one of the six RFC operations
//! - `path` (and `from` for move / copy) must start with `/`
//! - No reference token may be `__proto__`, `constructor` or `prototype`;
//!   patches come from a language model and the published layout is read by
//!   JavaScript

use crate::pointer::{self, JsonPointer, PointerError};
use pagesmith_schema::{PatchOp, PatchOperation};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

pub const UNSAFE_SEGMENTS: [&str; 3] = ["__proto__", "constructor", "prototype"];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("operation {index}: unsupported op '{op}'")]
    UnsupportedOp { index: usize, op: String },

    #[error("operation {index}: {field} '{pointer}' must start with '/'")]
    NotAbsolute {
        index: usize,
        field: &'static str,
        pointer: String,
    },

    #[error("operation {index}: {field} '{pointer}' is not a valid JSON Pointer ({source})")]
    MalformedPointer {
        index: usize,
        field: &'static str,
        pointer: String,
        source: PointerError,
    },

    #[error("operation {index}: {field} '{pointer}' contains the forbidden segment '{segment}'")]
    UnsafeSegment {
        index: usize,
        field: &'static str,
        pointer: String,
        segment: String,
    },

    #[error("operation {index}: '{op}' requires a value")]
    MissingValue { index: usize, op: String },

    #[error("operation {index}: '{op}' requires a from pointer")]
    MissingFrom { index: usize, op: String },
}

/// Why a single operation could not be applied
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApplyFault {
    #[error("path does not exist")]
    PathNotFound,

    #[error("from location does not exist")]
    FromNotFound,

    #[error("'{0}' is not a valid array index here")]
    InvalidIndex(String),

    #[error("parent is not an object or array")]
    NotAContainer,

    #[error("test failed: value differs")]
    TestFailed,

    #[error("cannot move a value into one of its own children")]
    MoveIntoChild,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApplyError {
    #[error("invalid patch batch: {0}")]
    Invalid(#[from] ValidationError),

    #[error("operation {index} ({op} {path}) failed: {fault}")]
    Operation {
        index: usize,
        op: String,
        path: String,
        fault: ApplyFault,
    },
}

/// Check a batch without touching any document
pub fn validate(patches: &[PatchOperation]) -> Result<(), ValidationError> {
    for (index, patch) in patches.iter().enumerate() {
        validate_operation(index, patch)?;
    }
    Ok(())
}

pub fn is_valid(patches: &[PatchOperation]) -> bool {
    validate(patches).is_ok()
}

fn validate_operation(index: usize, patch: &PatchOperation) -> Result<(), ValidationError> {
    if !patch.op.is_supported() {
        return Err(ValidationError::UnsupportedOp {
            index,
            op: patch.op.to_string(),
        });
    }

    check_pointer(index, "path", &patch.path)?;

    if patch.op.takes_value() && patch.value.is_none() {
        return Err(ValidationError::MissingValue {
            index,
            op: patch.op.to_string(),
        });
    }

    if patch.op.takes_from() {
        let from = patch.from.as_deref().ok_or_else(|| ValidationError::MissingFrom {
            index,
            op: patch.op.to_string(),
        })?;
        check_pointer(index, "from", from)?;
    }

    Ok(())
}

fn check_pointer(index: usize, field: &'static str, raw: &str) -> Result<JsonPointer, ValidationError> {
    if !raw.starts_with('/') {
        return Err(ValidationError::NotAbsolute {
            index,
            field,
            pointer: raw.to_string(),
        });
    }

    let parsed = JsonPointer::parse(raw).map_err(|source| ValidationError::MalformedPointer {
        index,
        field,
        pointer: raw.to_string(),
        source,
    })?;

    if let Some(segment) = parsed
        .tokens()
        .iter()
        .find(|token| UNSAFE_SEGMENTS.contains(&token.as_str()))
    {
        return Err(ValidationError::UnsafeSegment {
            index,
            field,
            pointer: raw.to_string(),
            segment: segment.clone(),
        });
    }

    Ok(parsed)
}

/// Apply a batch to a copy of `document`
pub fn apply(document: &Value, patches: &[PatchOperation]) -> Result<Value, ApplyError> {
    validate(patches)?;

    let mut working = document.clone();
    for (index, patch) in patches.iter().enumerate() {
        apply_operation(&mut working, patch).map_err(|fault| ApplyError::Operation {
            index,
            op: patch.op.to_string(),
            path: patch.path.clone(),
            fault,
        })?;
    }

    debug!(operations = patches.len(), "Applied patch batch");
    Ok(working)
}

/// Apply a batch, replacing `document` only if every operation succeeds
pub fn apply_in_place(document: &mut Value, patches: &[PatchOperation]) -> Result<(), ApplyError> {
    *document = apply(document, patches)?;
    Ok(())
}

// pointers reaching here already passed `validate`
fn parse_checked(raw: &str) -> Result<JsonPointer, ApplyFault> {
    JsonPointer::parse(raw).map_err(|_| ApplyFault::PathNotFound)
}

fn apply_operation(doc: &mut Value, patch: &PatchOperation) -> Result<(), ApplyFault> {
    let path = parse_checked(&patch.path)?;

    match &patch.op {
        PatchOp::Add => add(doc, &path, required_value(patch)?),
        PatchOp::Remove => remove(doc, &path).map(drop),
        PatchOp::Replace => replace(doc, &path, required_value(patch)?),
        PatchOp::Move => {
            let from = parse_checked(patch.from.as_deref().unwrap_or_default())?;
            if from == path {
                return pointer::resolve(doc, from.tokens())
                    .map(drop)
                    .ok_or(ApplyFault::FromNotFound);
            }
            if from.is_ancestor_of(&path) {
                return Err(ApplyFault::MoveIntoChild);
            }
            let value = remove(doc, &from).map_err(from_fault)?;
            add(doc, &path, value)
        }
        PatchOp::Copy => {
            let from = parse_checked(patch.from.as_deref().unwrap_or_default())?;
            let value = pointer::resolve(doc, from.tokens())
                .cloned()
                .ok_or(ApplyFault::FromNotFound)?;
            add(doc, &path, value)
        }
        PatchOp::Test => {
            let expected = patch.value.as_ref().ok_or(ApplyFault::TestFailed)?;
            let actual = pointer::resolve(doc, path.tokens()).ok_or(ApplyFault::PathNotFound)?;
            if values_match(actual, expected) {
                Ok(())
            } else {
                Err(ApplyFault::TestFailed)
            }
        }
        PatchOp::Unsupported(_) => Err(ApplyFault::PathNotFound),
    }
}

fn required_value(patch: &PatchOperation) -> Result<Value, ApplyFault> {
    patch.value.clone().ok_or(ApplyFault::PathNotFound)
}

fn from_fault(fault: ApplyFault) -> ApplyFault {
    match fault {
        ApplyFault::PathNotFound => ApplyFault::FromNotFound,
        other => other,
    }
}

fn parent_mut<'a>(doc: &'a mut Value, parent: &[String]) -> Result<&'a mut Value, ApplyFault> {
    pointer::resolve_mut(doc, parent).ok_or(ApplyFault::PathNotFound)
}

fn add(doc: &mut Value, path: &JsonPointer, value: Value) -> Result<(), ApplyFault> {
    let Some((parent, last)) = path.split_last() else {
        *doc = value;
        return Ok(());
    };

    match parent_mut(doc, parent)? {
        Value::Object(map) => {
            map.insert(last.to_string(), value);
            Ok(())
        }
        Value::Array(items) => {
            let index = if last == "-" {
                items.len()
            } else {
                pointer::parse_index(last)
                    .filter(|i| *i <= items.len())
                    .ok_or_else(|| ApplyFault::InvalidIndex(last.to_string()))?
            };
            items.insert(index, value);
            Ok(())
        }
        _ => Err(ApplyFault::NotAContainer),
    }
}

fn remove(doc: &mut Value, path: &JsonPointer) -> Result<Value, ApplyFault> {
    let Some((parent, last)) = path.split_last() else {
        return Ok(std::mem::take(doc));
    };

    match parent_mut(doc, parent)? {
        Value::Object(map) => map.remove(last).ok_or(ApplyFault::PathNotFound),
        Value::Array(items) => {
            let index = pointer::parse_index(last)
                .filter(|i| *i < items.len())
                .ok_or_else(|| ApplyFault::InvalidIndex(last.to_string()))?;
            Ok(items.remove(index))
        }
        _ => Err(ApplyFault::NotAContainer),
    }
}

fn replace(doc: &mut Value, path: &JsonPointer, value: Value) -> Result<(), ApplyFault> {
    let target = pointer::resolve_mut(doc, path.tokens()).ok_or(ApplyFault::PathNotFound)?;
    *target = value;
    Ok(())
}

/// JSON equality with numbers compared by value, so `1` matches `1.0`
pub fn values_match(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => match (x.as_u64(), y.as_u64()) {
                (Some(x), Some(y)) => x == y,
                _ => x.as_f64() == y.as_f64(),
            },
        },
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| values_match(a, b))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(key, a)| y.get(key).is_some_and(|b| values_match(a, b)))
        }
        _ => a == b,
    }
}

/// Drop `replace` operations that a later `replace` of the same path
/// overwrites before anything else could observe them.
///
/// Only `replace` and `test` operations on unrelated paths may sit between
/// the two; anything structural in between keeps both. Everything else
/// passes through in order.
pub fn optimize(patches: Vec<PatchOperation>) -> Vec<PatchOperation> {
    let before = patches.len();
    let dead: Vec<bool> = (0..patches.len())
        .map(|i| is_dead_replace(&patches, i))
        .collect();

    let optimized: Vec<PatchOperation> = patches
        .into_iter()
        .zip(dead)
        .filter_map(|(patch, dead)| (!dead).then_some(patch))
        .collect();

    if optimized.len() < before {
        debug!(
            before,
            after = optimized.len(),
            "Dropped overwritten replace operations"
        );
    }
    optimized
}

fn is_dead_replace(patches: &[PatchOperation], i: usize) -> bool {
    let target = &patches[i];
    if target.op != PatchOp::Replace {
        return false;
    }

    for later in &patches[i + 1..] {
        if later.op == PatchOp::Replace && later.path == target.path {
            return true;
        }
        let transparent = matches!(later.op, PatchOp::Replace | PatchOp::Test)
            && !paths_overlap(&later.path, &target.path);
        if !transparent {
            return false;
        }
    }
    false
}

fn paths_overlap(a: &str, b: &str) -> bool {
    a == b || is_prefix_path(a, b) || is_prefix_path(b, a)
}

fn is_prefix_path(ancestor: &str, path: &str) -> bool {
    path.len() > ancestor.len()
        && path.starts_with(ancestor)
        && path.as_bytes()[ancestor.len()] == b'/'
}
