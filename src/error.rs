//! Error types for the rollout-to-sample pipeline.
//!
//! Every failure here is fatal for the current pipeline run: a sample
//! stream stops at the first error and the error surfaces to whoever is
//! draining it. Nothing is retried or skipped, since dropping a timestep
//! would misalign advantages with observations.

use thiserror::Error;

/// A packed batch (or pair of batches) that cannot be unpacked lane by lane.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BatchError {
    #[error("packed batch of {len} values cannot be split across {present} present lanes")]
    Misaligned { len: usize, present: usize },

    #[error("packed batch holds {len} values but no lane is present")]
    EmptyPresentData { len: usize },

    #[error("lane {lane} has {actual} values, expected {expected}")]
    RaggedLanes {
        lane: usize,
        expected: usize,
        actual: usize,
    },

    #[error("rollout has {inputs} observation batches but {actions} action batches")]
    StepMismatch { inputs: usize, actions: usize },

    #[error("timestep {timestep}: observation and action batches disagree on present lanes")]
    PresenceMismatch { timestep: usize },

    #[error("timestep {timestep}: action distributions are empty")]
    NoActions { timestep: usize },
}

/// Errors raised while generating, transcoding or materializing samples.
#[derive(Error, Debug)]
pub enum SampleError {
    #[error("action stream ended before the observation stream at timestep {timestep}")]
    ActionStreamEnded { timestep: usize },

    #[error("no advantage for lane {lane} at timestep {timestep}")]
    AdvantageOutOfRange { lane: usize, timestep: usize },

    #[error("malformed rollout batch: {0}")]
    Batch(#[from] BatchError),

    #[error("feature {index} has value {value}, which is not an 8-bit integer")]
    FeatureOutOfRange { index: usize, value: f64 },

    #[error("feature index {index} out of range for a sample with {width} features")]
    FeatureIndex { index: usize, width: usize },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("codec error: {0}")]
    Codec(#[from] bincode::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SampleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_error_converts() {
        let err: SampleError = BatchError::NoActions { timestep: 3 }.into();
        assert!(matches!(
            err,
            SampleError::Batch(BatchError::NoActions { timestep: 3 })
        ));
    }

    #[test]
    fn test_messages_name_location() {
        let err = SampleError::AdvantageOutOfRange {
            lane: 1,
            timestep: 4,
        };
        assert_eq!(err.to_string(), "no advantage for lane 1 at timestep 4");

        let err = SampleError::ActionStreamEnded { timestep: 2 };
        assert!(err.to_string().contains("timestep 2"));
    }
}
