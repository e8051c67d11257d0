//! # treeagent
//!
//! Turns batches of RL rollouts into ordered training samples for
//! tree-based policy learning.
//!
//! ## Design Principles
//!
//! 1. **Order Is the Contract**: Samples come out timestep-major,
//!    lane-minor. Advantages are indexed the same way, so any reordering
//!    would pair observations with the wrong advantage.
//!
//! 2. **Pull, Don't Push**: Every stage is an iterator that builds one
//!    sample when asked. Memory stays bounded until the explicit
//!    materialization step, and dropping a stream early leaks nothing.
//!
//! 3. **Fail Loudly**: Malformed rollouts and missing advantages end the
//!    stream with an error instead of silently skipping timesteps.
//!
//! ## Modules
//!
//! - `core`: Packed batches, rollout sets, advantage tables, unpacking
//! - `samples`: Sample types, the rollout generator, quantizer, materializer
//! - `pipeline`: Configured end-to-end conversion
//! - `error`: Error types

pub mod core;
pub mod error;
pub mod pipeline;
pub mod samples;

#[cfg(feature = "python")]
pub mod python;

// Re-export commonly used types
pub use crate::core::{Advantages, PackedBatch, RolloutSet};

pub use crate::error::{BatchError, Result, SampleError};

pub use crate::pipeline::{Pipeline, PipelineConfig};

pub use crate::samples::{
    all_samples, AdvantageStats, DenseSample, QuantizeConfig, RolloutSamples, Sample, SampleBatch,
    SampleStream, Uint8Sample, Uint8Samples,
};
