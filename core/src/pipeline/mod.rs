//! # FORZIUM REQUEST PIPELINE
//!
//! **SINGLE ORCHESTRATOR, PARAMETERIZED BY THE ACTIVE CHANNEL SET**
//!
//! ## STAGES
//!
//! `ContentTypeCheck → SchemaBuild → Extraction → Validation → Aggregation → Dispatch → PostProcess → Done`
//!
//! Every stage before `Dispatch` may fail. A failure short-circuits: later stages never
//! run and the matching [`FailureResponder`] hook builds the response.
//!
//! ## USAGE
//!
//! ```rust
//! use forzium::pipeline::{Endpoint, Pipeline};
//! use forzium::request::{HttpMethod, HttpRequest};
//! use forzium::response::HttpResponse;
//! use forzium::types::{ExtraData, RequestData};
//! use forzium::validation::{Element, Schema};
//! use serde_json::json;
//! use std::convert::Infallible;
//!
//! let endpoint = Endpoint::json_only("create_item").body(Schema::new().field("id", Element::integer()));
//! let pipeline = Pipeline::new(endpoint);
//!
//! let request = HttpRequest::new(HttpMethod::POST, "/items").with_json(&json!({"id": 5}));
//! let response = pipeline
//!     .handle(&request, &|data: &RequestData, _: &ExtraData| {
//!         Ok::<_, Infallible>(HttpResponse::json(201, json!(data.body)))
//!     })
//!     .unwrap();
//! assert_eq!(response.status_code, 201);
//! ```

pub mod aggregate;
pub mod endpoint;
pub mod hooks;
pub mod schema;

pub use aggregate::{FieldReport, ViolationReport};
pub use endpoint::Endpoint;
pub use hooks::{DefaultResponder, DispatchHooks, FailureResponder, Handler, NoHooks};
pub use schema::{resolve_schema, resolve_schemas, ContentTypePolicy, EndpointSchemas, ResolvedSchemas};

use crate::config::PipelineConfig;
use crate::errors::{EngineError, PipelineError, SchemaDefinitionError};
use crate::request::{extract_channels, HttpRequest, RawChannels};
use crate::response::HttpResponse;
use crate::types::{Channel, ChannelData, ExtraData, RequestData};
use crate::validation::{SchemaEngine, ValidationEngine, ValidationResult};
use log::{debug, warn};
use once_cell::sync::OnceCell;
use rayon::prelude::*;

/// **PIPELINE STAGE**
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ContentTypeCheck,
    SchemaBuild,
    Extraction,
    Validation,
    Aggregation,
    Dispatch,
    PostProcess,
    Done,
}

impl PipelineError {
    /// Stage at which the pipeline stopped with this error.
    pub fn failed_stage(&self) -> Stage {
        match self {
            PipelineError::ContentTypeRejected { .. } => Stage::ContentTypeCheck,
            PipelineError::InvalidSchema(_) => Stage::SchemaBuild,
            PipelineError::MalformedBody { .. } => Stage::Extraction,
            PipelineError::IncompatibleInput { .. } => Stage::Validation,
            PipelineError::Violations(_) => Stage::Aggregation,
        }
    }
}

/// Output of a successful validation: what the handler receives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedRequest {
    pub data: RequestData,
    pub extra: ExtraData,
}

/// **REQUEST PIPELINE**
///
/// One per endpoint. Holds the endpoint definition, the validation engine and the
/// hooks composed at construction. Schemas are resolved on first use and the outcome
/// (success or definition error) is cached for the pipeline's lifetime.
pub struct Pipeline<E: ValidationEngine = SchemaEngine> {
    endpoint: Endpoint,
    engine: E,
    responder: Box<dyn FailureResponder>,
    hooks: Box<dyn DispatchHooks>,
    config: PipelineConfig,
    schemas: OnceCell<Result<ResolvedSchemas, SchemaDefinitionError>>,
}

impl Pipeline<SchemaEngine> {
    /// **CONSTRUCTOR** - reference engine, canned responses, no dispatch hooks
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            engine: SchemaEngine::new(),
            responder: Box::new(DefaultResponder),
            hooks: Box::new(NoHooks),
            config: PipelineConfig::default(),
            schemas: OnceCell::new(),
        }
    }
}

impl<E: ValidationEngine> Pipeline<E> {
    /// Swaps the validation engine.
    pub fn with_engine<E2: ValidationEngine>(self, engine: E2) -> Pipeline<E2> {
        Pipeline {
            endpoint: self.endpoint,
            engine,
            responder: self.responder,
            hooks: self.hooks,
            config: self.config,
            schemas: self.schemas,
        }
    }

    pub fn with_responder(mut self, responder: impl FailureResponder + 'static) -> Self {
        self.responder = Box::new(responder);
        self
    }

    pub fn with_hooks(mut self, hooks: impl DispatchHooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// **VALIDATE** - runs every stage up to and including Aggregation
    ///
    /// **RETURNS**: the handler's input, or the error of the first failing stage.
    pub fn validate(&self, request: &HttpRequest) -> Result<ValidatedRequest, PipelineError> {
        let name = &self.endpoint.name;

        debug!("[{}] {:?}", name, Stage::ContentTypeCheck);
        if !self.endpoint.content_types.accepts(request.content_type()) {
            let content_type = request.content_type().unwrap_or_default().to_string();
            debug!("[{}] content type '{}' rejected", name, content_type);
            return Err(PipelineError::ContentTypeRejected { content_type });
        }

        debug!("[{}] {:?}", name, Stage::SchemaBuild);
        let schemas = self.resolved_schemas()?;

        debug!("[{}] {:?}", name, Stage::Extraction);
        let raw = extract_channels(request, self.endpoint.channels, &self.config)?;

        debug!("[{}] {:?}", name, Stage::Validation);
        let mut results = Vec::new();
        for (channel, outcome) in self.validate_channels(schemas, &raw) {
            match outcome {
                Ok(result) => results.push((channel, result)),
                Err(err) => {
                    warn!("[{}] {} channel not validatable: {}", name, channel, err);
                    return Err(PipelineError::incompatible(channel, err));
                }
            }
        }

        debug!("[{}] {:?}", name, Stage::Aggregation);
        let report = ViolationReport::from_results(results.iter().map(|(c, r)| (*c, r)));
        if report.any_violations() {
            debug!("[{}] {} violation(s)", name, report.violation_count());
            return Err(PipelineError::Violations(report));
        }

        let mut data = ChannelData::default();
        let mut extra = ChannelData::default();
        for (channel, result) in results {
            data.set(channel, result.data);
            extra.set(channel, result.extra_data);
        }
        Ok(ValidatedRequest {
            data: RequestData::new(data),
            extra: ExtraData::new(extra),
        })
    }

    /// **HANDLE** - runs the whole state machine
    ///
    /// Every pipeline failure becomes a response through the responder hooks. Only
    /// the handler's own error is returned as `Err`, unmodified.
    pub fn handle<H: Handler>(&self, request: &HttpRequest, handler: &H) -> Result<HttpResponse, H::Error> {
        let ValidatedRequest { data, extra } = match self.validate(request) {
            Ok(validated) => validated,
            Err(err) => {
                debug!("[{}] failed at {:?}: {}", self.endpoint.name, err.failed_stage(), err);
                return Ok(self.failure_response(&err));
            }
        };

        debug!("[{}] {:?}", self.endpoint.name, Stage::Dispatch);
        self.hooks.before_handle(&data, &extra);
        let response = handler.handle(&data, &extra)?;

        debug!("[{}] {:?}", self.endpoint.name, Stage::PostProcess);
        let response = self.hooks.after_handle(response, &data, &extra);

        debug!("[{}] {:?} ({})", self.endpoint.name, Stage::Done, response.status_code);
        Ok(response)
    }

    /// Maps a pipeline error to the responder hook for its kind (and channel).
    pub fn failure_response(&self, error: &PipelineError) -> HttpResponse {
        let responder = &self.responder;
        match error {
            PipelineError::ContentTypeRejected { content_type } => {
                responder.content_type_rejected(content_type)
            }
            PipelineError::InvalidSchema(err) => match err.channel {
                Channel::Body => responder.invalid_body_schema(err),
                Channel::Headers => responder.invalid_headers_schema(err),
                Channel::Query => responder.invalid_query_schema(err),
                Channel::Path => responder.invalid_path_schema(err),
                Channel::Cookies => responder.invalid_cookies_schema(err),
            },
            PipelineError::MalformedBody { detail } => responder.malformed_body(detail),
            PipelineError::IncompatibleInput { channel, message } => {
                responder.incompatible_input(*channel, message)
            }
            PipelineError::Violations(report) => responder.malformed_request(report),
        }
    }

    fn resolved_schemas(&self) -> Result<&ResolvedSchemas, PipelineError> {
        self.schemas
            .get_or_init(|| {
                let resolved = resolve_schemas(&self.endpoint.schemas, self.endpoint.channels);
                if let Err(err) = &resolved {
                    warn!("[{}] {}", self.endpoint.name, err);
                }
                resolved
            })
            .as_ref()
            .map_err(|err| PipelineError::InvalidSchema(err.clone()))
    }

    // Results come back in fixed channel order in both modes.
    fn validate_channels(
        &self,
        schemas: &ResolvedSchemas,
        raw: &RawChannels,
    ) -> Vec<(Channel, Result<ValidationResult, EngineError>)> {
        let active: Vec<Channel> = self.endpoint.channels.iter().collect();
        let run = |channel: Channel| (channel, self.engine.validate(schemas.get(channel), raw.get(channel)));

        if self.config.parallel_validation {
            active.into_par_iter().map(run).collect()
        } else {
            active.into_iter().map(run).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::HttpMethod;
    use crate::types::ChannelSet;
    use crate::validation::{Element, Schema};
    use serde_json::json;

    fn post(body: &serde_json::Value) -> HttpRequest {
        HttpRequest::new(HttpMethod::POST, "/items").with_json(body)
    }

    #[test]
    fn test_validate_splits_data_and_extra() {
        let endpoint = Endpoint::json_only("create").body(Schema::new().field("id", Element::integer()));
        let pipeline = Pipeline::new(endpoint);

        let validated = pipeline.validate(&post(&json!({"id": 5, "note": "x"}))).unwrap();
        assert_eq!(json!(validated.data.body), json!({"id": 5}));
        assert_eq!(json!(validated.extra.body), json!({"note": "x"}));
        assert!(validated.data.query.is_empty());
    }

    #[test]
    fn test_failed_stage_per_error() {
        let pipeline = Pipeline::new(
            Endpoint::new("create")
                .allow_content_types(["application/json"])
                .body(Schema::new().field("id", Element::integer())),
        );

        let html = HttpRequest::new(HttpMethod::POST, "/").with_content_type("text/html");
        assert_eq!(pipeline.validate(&html).unwrap_err().failed_stage(), Stage::ContentTypeCheck);

        let broken = HttpRequest::new(HttpMethod::POST, "/")
            .with_content_type("application/json")
            .with_body("{");
        assert_eq!(pipeline.validate(&broken).unwrap_err().failed_stage(), Stage::Extraction);

        let array = post(&json!([1, 2]));
        assert_eq!(pipeline.validate(&array).unwrap_err().failed_stage(), Stage::Validation);

        let wrong = post(&json!({"id": "abc"}));
        assert_eq!(pipeline.validate(&wrong).unwrap_err().failed_stage(), Stage::Aggregation);
    }

    #[test]
    fn test_schema_error_cached() {
        let bad = Schema::new().field("ids", Element::collection(Element::integer()));
        let pipeline = Pipeline::new(Endpoint::new("show").path(bad));
        let request = HttpRequest::new(HttpMethod::GET, "/");

        for _ in 0..2 {
            match pipeline.validate(&request) {
                Err(PipelineError::InvalidSchema(err)) => {
                    assert_eq!(err.channel, Channel::Path);
                    assert_eq!(err.field, "ids");
                }
                other => panic!("expected schema error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_inactive_channels_stay_empty() {
        let pipeline = Pipeline::new(Endpoint::new("noop").with_channels(ChannelSet::empty()));
        let request = post(&json!({"id": 1})).with_query("page=2");

        let validated = pipeline.validate(&request).unwrap();
        assert_eq!(validated, ValidatedRequest::default());
    }

    #[test]
    fn test_failure_response_status_per_kind() {
        let pipeline = Pipeline::new(Endpoint::new("x"));
        let cases = [
            (PipelineError::ContentTypeRejected { content_type: "text/html".into() }, 406),
            (PipelineError::MalformedBody { detail: "eof".into() }, 400),
            (PipelineError::IncompatibleInput { channel: Channel::Body, message: "array".into() }, 406),
            (PipelineError::Violations(ViolationReport::default()), 400),
        ];
        for (err, expected) in cases {
            assert_eq!(pipeline.failure_response(&err).status_code, expected);
        }
    }
}
