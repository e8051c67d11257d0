//! End-to-end rollout → sample batch conversion.
//!
//! Composes the stages in [`crate::samples`] according to a
//! [`PipelineConfig`]: generate dense samples, optionally quantize them,
//! then drain everything into a [`SampleBatch`] for the tree builder.
//!
//! ```rust,ignore
//! let pipeline = Pipeline::new(PipelineConfig::new().with_quantization(num_features));
//! let batch = pipeline.run(&rollouts, &advantages)?;
//! ```

pub mod config;

pub use config::PipelineConfig;

use tracing::info;

use crate::core::{Advantages, RolloutSet};
use crate::error::Result;
use crate::samples::{RolloutSamples, SampleBatch, SampleStream};

/// Runs the sample pipeline over rollout sets.
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline with the given configuration.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// The pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Convert one rollout set and its advantages into a sample batch.
    ///
    /// The whole rollout is consumed; the first malformed timestep or
    /// missing advantage aborts the run.
    pub fn run(&self, rollouts: &RolloutSet, advantages: &Advantages) -> Result<SampleBatch> {
        if self.config.check_advantage_coverage {
            advantages.covers(rollouts)?;
        }

        let raw = RolloutSamples::new(rollouts, advantages);
        let batch = match &self.config.quantize {
            Some(quantize) => raw.quantize(quantize.clone()).materialize()?,
            None => raw.materialize()?,
        };

        info!(
            samples = batch.len(),
            timesteps = rollouts.num_steps(),
            lanes = rollouts.lane_count(),
            quantized = self.config.quantize.is_some(),
            "built training samples"
        );
        Ok(batch)
    }
}
