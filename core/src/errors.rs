use crate::pipeline::aggregate::ViolationReport;
use crate::types::Channel;
use thiserror::Error;

/// **PIPELINE ERROR CODES**
///
/// **MANDATE**: Use these standardized codes in every error payload.
pub mod error_codes {
    pub const CONTENT_TYPE_REJECTED: &str = "RUST_CORE_PIPELINE_CONTENT_TYPE_REJECTED";
    pub const INVALID_SCHEMA: &str = "RUST_CORE_PIPELINE_INVALID_SCHEMA";
    pub const MALFORMED_BODY: &str = "RUST_CORE_PIPELINE_MALFORMED_BODY";
    pub const INCOMPATIBLE_INPUT: &str = "RUST_CORE_PIPELINE_INCOMPATIBLE_INPUT";
    pub const MALFORMED_REQUEST: &str = "RUST_CORE_PIPELINE_MALFORMED_REQUEST";
}

/// Definition-time failure: a schema declares an element its channel cannot carry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {channel} schema: field '{field}' {reason}")]
pub struct SchemaDefinitionError {
    pub channel: Channel,
    pub field: String,
    pub reason: String,
}

/// Raised by a validation engine when raw data cannot be matched against a schema at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("incompatible input type: {0}")]
    IncompatibleInput(String),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("CONTENT TYPE REJECTED: '{content_type}' is not acceptable")]
    ContentTypeRejected { content_type: String },

    #[error("INVALID SCHEMA: {0}")]
    InvalidSchema(#[from] SchemaDefinitionError),

    #[error("MALFORMED BODY: {detail}")]
    MalformedBody { detail: String },

    #[error("INCOMPATIBLE INPUT: {channel} - {message}")]
    IncompatibleInput { channel: Channel, message: String },

    #[error("MALFORMED REQUEST: {} violation(s)", .0.violation_count())]
    Violations(ViolationReport),
}

impl PipelineError {
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::ContentTypeRejected { .. } => error_codes::CONTENT_TYPE_REJECTED,
            PipelineError::InvalidSchema(_) => error_codes::INVALID_SCHEMA,
            PipelineError::MalformedBody { .. } => error_codes::MALFORMED_BODY,
            PipelineError::IncompatibleInput { .. } => error_codes::INCOMPATIBLE_INPUT,
            PipelineError::Violations(_) => error_codes::MALFORMED_REQUEST,
        }
    }

    pub(crate) fn incompatible(channel: Channel, err: EngineError) -> Self {
        let EngineError::IncompatibleInput(message) = err;
        PipelineError::IncompatibleInput { channel, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_definition_error_message() {
        let err = SchemaDefinitionError {
            channel: Channel::Path,
            field: "tags".to_string(),
            reason: "must be a scalar element".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid path schema: field 'tags' must be a scalar element"
        );
    }

    #[test]
    fn test_error_codes_per_kind() {
        let err = PipelineError::MalformedBody {
            detail: "trailing comma".to_string(),
        };
        assert_eq!(err.code(), error_codes::MALFORMED_BODY);
        assert!(err.to_string().contains("trailing comma"));

        let err = PipelineError::incompatible(
            Channel::Body,
            EngineError::IncompatibleInput("expected object".to_string()),
        );
        assert_eq!(err.code(), error_codes::INCOMPATIBLE_INPUT);
        assert_eq!(err.to_string(), "INCOMPATIBLE INPUT: body - expected object");
    }
}
