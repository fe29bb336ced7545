use thiserror::Error;

pub type SchemaResult<T> = Result<T, SchemaError>;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Layout does not match the page schema: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("Invalid colour for {field}: {value:?}")]
    InvalidColor { field: &'static str, value: String },

    #[error("Value at {path} cannot be stored in the page schema (use `remove` to drop an optional field)")]
    NotRepresentable { path: String },
}

impl SchemaError {
    pub fn invalid_color(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidColor {
            field,
            value: value.into(),
        }
    }

    pub fn not_representable(path: impl Into<String>) -> Self {
        Self::NotRepresentable { path: path.into() }
    }
}
