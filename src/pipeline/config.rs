//! Pipeline configuration.

use serde::{Deserialize, Serialize};

use crate::samples::QuantizeConfig;

/// Configuration for turning a rollout set into a sample batch.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Re-encode features as bytes before materializing.
    /// `None` keeps full-precision features.
    #[serde(default)]
    pub quantize: Option<QuantizeConfig>,

    /// Check the advantage table covers every present pair before
    /// streaming, so a gap is reported before any work is done.
    #[serde(default)]
    pub check_advantage_coverage: bool,
}

impl PipelineConfig {
    /// Create a new pipeline config (dense features, no pre-checks).
    pub fn new() -> Self {
        Self::default()
    }

    /// Quantize `num_features` features per sample, unchecked.
    pub fn with_quantization(mut self, num_features: usize) -> Self {
        self.quantize = Some(QuantizeConfig::new(num_features));
        self
    }

    /// Set the quantizing stage explicitly.
    pub fn with_quantize_config(mut self, config: QuantizeConfig) -> Self {
        self.quantize = Some(config);
        self
    }

    /// Set whether advantage coverage is checked up front.
    pub fn with_coverage_check(mut self, check: bool) -> Self {
        self.check_advantage_coverage = check;
        self
    }
}
