//! Error types for shape to JSON Schema conversion

/// Errors that can occur during shape to JSON Schema conversion
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// The shape ID does not belong to the graph being converted
    #[error("Invalid shape reference: {0}")]
    InvalidNode(usize),

    /// The shape kind has no JSON Schema encoding
    #[error("Shape kind `{0}` cannot be represented in JSON Schema")]
    UnrepresentableKind(&'static str),

    /// A definition was registered but its schema was never produced
    #[error("Definition `{0}` was never resolved")]
    PendingDefinition(String),
}
