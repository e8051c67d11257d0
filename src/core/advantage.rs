//! Advantage table indexed by lane, then timestep.
//!
//! The table is computed upstream (by whatever judges actions) before
//! samples are generated and is only read afterwards.

use serde::{Deserialize, Serialize};

use crate::core::batch::RolloutSet;
use crate::error::SampleError;

/// Per-lane advantage sequences: `advantages[lane][timestep]`.
///
/// Lanes may have different lengths; a lane only needs entries for the
/// timesteps at which it was present.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Advantages(Vec<Vec<f64>>);

impl Advantages {
    /// Wrap a lane-major advantage table.
    pub fn new(table: Vec<Vec<f64>>) -> Self {
        Self(table)
    }

    /// Advantage for `lane` at `timestep`.
    pub fn get(&self, lane: usize, timestep: usize) -> Result<f64, SampleError> {
        self.0
            .get(lane)
            .and_then(|lane| lane.get(timestep))
            .copied()
            .ok_or(SampleError::AdvantageOutOfRange { lane, timestep })
    }

    /// Number of lanes in the table.
    pub fn lane_count(&self) -> usize {
        self.0.len()
    }

    /// Number of timesteps recorded for `lane` (0 if the lane is missing).
    pub fn lane_len(&self, lane: usize) -> usize {
        self.0.get(lane).map_or(0, Vec::len)
    }

    /// Check that every present `(lane, timestep)` of `rollouts` has an entry.
    ///
    /// Reports the first uncovered pair in generation order.
    pub fn covers(&self, rollouts: &RolloutSet) -> Result<(), SampleError> {
        rollouts
            .present_pairs()
            .try_for_each(|(lane, timestep)| self.get(lane, timestep).map(|_| ()))
    }
}

impl From<Vec<Vec<f64>>> for Advantages {
    fn from(table: Vec<Vec<f64>>) -> Self {
        Self(table)
    }
}
