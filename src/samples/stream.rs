//! Chaining helpers for sample streams.

use crate::error::{Result, SampleError};
use crate::samples::materialize::{all_samples, SampleBatch};
use crate::samples::quantize::{QuantizeConfig, Uint8Samples};
use crate::samples::sample::Sample;

/// Adapters available on any fallible sample stream.
///
/// ```rust,ignore
/// let batch = RolloutSamples::new(&rollouts, &advantages)
///     .quantize(QuantizeConfig::new(num_features))
///     .materialize()?;
/// ```
pub trait SampleStream: Iterator<Item = Result<Sample>> + Sized {
    /// Re-encode features as bytes. See [`Uint8Samples`].
    fn quantize(self, config: QuantizeConfig) -> Uint8Samples<Self> {
        Uint8Samples::new(config, self)
    }

    /// Drain the stream into a [`SampleBatch`]. See [`all_samples`].
    fn materialize(self) -> Result<SampleBatch> {
        all_samples(self)
    }
}

impl<I> SampleStream for I where I: Iterator<Item = std::result::Result<Sample, SampleError>> {}
