//! # Patch Operations
//!
//! RFC 6902 JSON Patch operations, serialized exactly as the RFC describes so
//! any standard JSON Patch library can read what we write and vice versa.
//!
//! An `op` string outside the RFC set still deserializes (as
//! [`PatchOp::Unsupported`]) so that rejecting it is the patch validator's
//! decision, with a proper error, rather than an opaque decode failure.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PatchOp {
    Add,
    Remove,
    Replace,
    Move,
    Copy,
    Test,
    Unsupported(String),
}

impl PatchOp {
    pub fn as_str(&self) -> &str {
        match self {
            PatchOp::Add => "add",
            PatchOp::Remove => "remove",
            PatchOp::Replace => "replace",
            PatchOp::Move => "move",
            PatchOp::Copy => "copy",
            PatchOp::Test => "test",
            PatchOp::Unsupported(op) => op,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, PatchOp::Unsupported(_))
    }

    /// Operations that carry a `value` member
    pub fn takes_value(&self) -> bool {
        matches!(self, PatchOp::Add | PatchOp::Replace | PatchOp::Test)
    }

    /// Operations that carry a `from` member
    pub fn takes_from(&self) -> bool {
        matches!(self, PatchOp::Move | PatchOp::Copy)
    }
}

impl From<String> for PatchOp {
    fn from(op: String) -> Self {
        match op.as_str() {
            "add" => PatchOp::Add,
            "remove" => PatchOp::Remove,
            "replace" => PatchOp::Replace,
            "move" => PatchOp::Move,
            "copy" => PatchOp::Copy,
            "test" => PatchOp::Test,
            _ => PatchOp::Unsupported(op),
        }
    }
}

impl From<PatchOp> for String {
    fn from(op: PatchOp) -> Self {
        match op {
            PatchOp::Unsupported(op) => op,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for PatchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One JSON Patch operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: PatchOp,

    /// JSON Pointer (RFC 6901) to the target location
    pub path: String,

    /// Present (possibly `null`) for add / replace / test
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Value>,

    /// Source pointer for move / copy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

// `Option<Value>` would read an explicit `"value": null` as absent.
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl PatchOperation {
    pub fn add(path: impl Into<String>, value: Value) -> Self {
        Self {
            op: PatchOp::Add,
            path: path.into(),
            value: Some(value),
            from: None,
        }
    }

    pub fn remove(path: impl Into<String>) -> Self {
        Self {
            op: PatchOp::Remove,
            path: path.into(),
            value: None,
            from: None,
        }
    }

    pub fn replace(path: impl Into<String>, value: Value) -> Self {
        Self {
            op: PatchOp::Replace,
            path: path.into(),
            value: Some(value),
            from: None,
        }
    }

    pub fn move_from(from: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            op: PatchOp::Move,
            path: path.into(),
            value: None,
            from: Some(from.into()),
        }
    }

    pub fn copy_from(from: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            op: PatchOp::Copy,
            path: path.into(),
            value: None,
            from: Some(from.into()),
        }
    }

    pub fn test(path: impl Into<String>, value: Value) -> Self {
        Self {
            op: PatchOp::Test,
            path: path.into(),
            value: Some(value),
            from: None,
        }
    }
}

impl fmt::Display for PatchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.from {
            Some(from) => write!(f, "{} {} -> {}", self.op, from, self.path),
            None => write!(f, "{} {}", self.op, self.path),
        }
    }
}
