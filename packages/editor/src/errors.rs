//! Error types for the editor

use crate::history::HistoryError;
use crate::patch::{ApplyError, ValidationError};
use pagesmith_schema::SchemaError;
use pagesmith_translator::TranslateError;
use thiserror::Error;

pub type EditorResult<T> = Result<T, EditorError>;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Invalid patch: {0}")]
    Validation(#[from] ValidationError),

    #[error("Could not apply patch: {0}")]
    Apply(#[from] ApplyError),

    #[error("Layout is invalid: {0}")]
    Schema(#[from] SchemaError),

    #[error("{0}")]
    Translate(#[from] TranslateError),

    #[error("History error: {0}")]
    History(#[from] HistoryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("A translation is already in progress")]
    Busy,

    #[error("No translation is in progress")]
    NotAwaiting,

    #[error("Instruction is empty")]
    EmptyInstruction,

    #[error("Document is not file-backed")]
    NotFileBacked,
}

impl EditorError {
    /// Refusals leave the session untouched and add nothing to the transcript
    pub fn is_refusal(&self) -> bool {
        matches!(
            self,
            EditorError::Busy | EditorError::NotAwaiting | EditorError::EmptyInstruction
        )
    }
}
