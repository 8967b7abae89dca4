//! Query error types
//!
//! Defines all error conditions that can occur during query translation and
//! execution.

use thiserror::Error;

/// Errors that abort a translation
///
/// All of them are deterministic functions of the query shape; none are
/// retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    /// Member has no column role in the entity schema
    #[error("Member '{member}' of '{entity}' is not mapped to a column")]
    UnmappedMember { entity: String, member: String },

    /// Source clause names an entity type without a schema
    #[error("No schema registered for entity type: {0}")]
    UnknownEntity(String),

    /// Expression node outside the translatable grammar
    #[error("Unsupported expression: {0}")]
    UnsupportedExpression(String),

    /// Result operator that has no Flux counterpart
    #[error("{0} is not supported.")]
    UnsupportedOperator(String),
}

/// Result type for translation
pub type TranslateResult<T> = Result<T, TranslateError>;

/// Errors that can occur while executing a query
#[derive(Error, Debug)]
pub enum QueryError {
    /// The query could not be translated
    #[error("Translation error: {0}")]
    Translate(#[from] TranslateError),

    /// The transport failed to run the query
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// A single result was required but none was returned
    #[error("Sequence contains no elements")]
    NoElements,

    /// A single result was required but several were returned
    #[error("Sequence contains more than one element")]
    MoreThanOneElement,
}

/// Failure reported by a `FluxTransport`
#[derive(Error, Debug)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TranslateError::UnsupportedOperator("CountResultOperator".to_string());
        assert_eq!(err.to_string(), "CountResultOperator is not supported.");

        let err = TranslateError::UnmappedMember {
            entity: "Sensor".to_string(),
            member: "Location".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Member 'Location' of 'Sensor' is not mapped to a column"
        );
    }

    #[test]
    fn test_translate_error_conversion() {
        let err: QueryError = TranslateError::UnknownEntity("Sensor".to_string()).into();
        assert!(matches!(err, QueryError::Translate(_)));
        assert_eq!(
            err.to_string(),
            "Translation error: No schema registered for entity type: Sensor"
        );
    }
}
