use thiserror::Error;

#[derive(Debug, Error)]
pub enum LatticeError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Unrecognized value for {field}: '{value}'")]
    UnrecognizedValue { field: String, value: String },

    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },

    #[error("Node (down={down}, up={up}) has no continuation or exercise value")]
    UnvaluedNode { down: usize, up: usize },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl LatticeError {
    pub(crate) fn missing(field: &str) -> Self {
        LatticeError::MissingField {
            field: field.into(),
        }
    }
}

impl From<serde_json::Error> for LatticeError {
    fn from(e: serde_json::Error) -> Self {
        LatticeError::Serialization(e.to_string())
    }
}
