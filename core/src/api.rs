//! Flat re-export of the types an integrator wires together.

pub use crate::config::PipelineConfig;
pub use crate::errors::{error_codes, EngineError, PipelineError, SchemaDefinitionError};
pub use crate::pipeline::{
    ContentTypePolicy, DefaultResponder, DispatchHooks, Endpoint, EndpointSchemas,
    FailureResponder, Handler, NoHooks, Pipeline, Stage, ValidatedRequest, ViolationReport,
};
pub use crate::request::{HttpMethod, HttpRequest};
pub use crate::response::{status, ErrorPayload, HttpResponse, ResponseBody};
pub use crate::types::{Channel, ChannelData, ChannelSet, ExtraData, JsonMap, RequestData};
pub use crate::validation::{
    Element, ScalarType, Schema, SchemaEngine, ValidationEngine, ValidationResult, Violation,
};
