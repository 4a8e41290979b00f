//! Error types for pattern definitions and rendering

use thiserror::Error;

/// Result type for pattern operations
pub type Result<T> = std::result::Result<T, PatternsError>;

/// Errors that can occur while building definitions or rendering patterns.
///
/// Only [`PatternsError::PatternNotFound`] and [`PatternsError::MissingPatternId`]
/// can abort a render; every other pipeline condition is recovered in place.
#[derive(Debug, Error)]
pub enum PatternsError {
    /// No definition registered under the requested pattern id
    #[error("pattern definition not found: {id}")]
    PatternNotFound { id: String },

    /// Render element does not reference a pattern
    #[error("render element has no pattern id")]
    MissingPatternId,

    /// Field slot not declared by the pattern
    #[error("field '{name}' not found in pattern '{pattern}'")]
    FieldNotFound { pattern: String, name: String },

    /// Setting slot not declared by the pattern
    #[error("setting '{name}' not found in pattern '{pattern}'")]
    SettingNotFound { pattern: String, name: String },

    /// Two slots of the same kind resolve to one name
    #[error("duplicate {kind} slot '{name}' in pattern '{pattern}'")]
    DuplicateSlot {
        pattern: String,
        kind: &'static str,
        name: String,
    },

    /// Declarative data could not be turned into a definition
    #[error("invalid pattern definition: {message}")]
    InvalidDefinition { message: String },

    /// No source plugin registered under the requested id
    #[error("pattern source plugin not found: {id}")]
    SourceNotFound { id: String },

    /// A definition file could not be read
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// YAML deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Configuration extraction error
    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PatternsError::PatternNotFound { id: "card".into() };
        assert_eq!(err.to_string(), "pattern definition not found: card");
    }

    #[test]
    fn test_duplicate_slot_names_everything() {
        let err = PatternsError::DuplicateSlot {
            pattern: "card".into(),
            kind: "field",
            name: "title".into(),
        };
        let message = err.to_string();
        assert!(message.contains("card"));
        assert!(message.contains("field"));
        assert!(message.contains("title"));
    }
}
