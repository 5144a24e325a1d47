//! # PIPELINE CONFIGURATION
//!
//! **PURPOSE**: Runtime knobs shared by every endpoint a pipeline serves.
//! Loadable from JSON, every field optional.

use crate::validation::DEFAULT_MAX_BODY_SIZE;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// **MAXIMUM BODY SIZE** - bodies above this are rejected as malformed
    pub max_body_size: usize,

    /// **PARALLEL VALIDATION** - validate channels on the rayon pool
    pub parallel_validation: bool,

    /// **RESERVED ATTRIBUTE PREFIX** - attributes starting with it never reach the path channel
    pub reserved_attribute_prefix: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            parallel_validation: false,
            reserved_attribute_prefix: "_".to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
