//! Training samples and the streams that produce them.
//!
//! ## Overview
//!
//! - **Sample**: one observation, the action taken and its advantage
//! - **RolloutSamples**: lazily unpacks a rollout set into dense samples
//! - **Uint8Samples**: re-encodes a sample stream with byte features
//! - **SampleBatch**: a fully drained, ordered stream
//!
//! ## Usage
//!
//! ```rust,ignore
//! use treeagent::samples::{QuantizeConfig, RolloutSamples, SampleStream};
//!
//! let batch = RolloutSamples::new(&rollouts, &advantages)
//!     .quantize(QuantizeConfig::new(84 * 84))
//!     .materialize()?;
//! ```

pub mod materialize;
pub mod quantize;
pub mod rollout;
pub mod sample;
pub mod stream;

// Re-export main types
pub use materialize::{all_samples, AdvantageStats, SampleBatch};
pub use quantize::{QuantizeConfig, Uint8Samples};
pub use rollout::RolloutSamples;
pub use sample::{DenseSample, Sample, Uint8Sample};
pub use stream::SampleStream;
