//! Packed, lane-batched rollout data.
//!
//! A rollout set is time-major: one [`PackedBatch`] of observations and one
//! of action distributions per timestep. Inside a batch only the lanes
//! flagged present contributed values, packed back to back in ascending
//! lane order. Absent lanes take no space.

use serde::{Deserialize, Serialize};

use crate::core::unpack;
use crate::error::BatchError;

/// Values for one timestep across all lanes, with a presence mask.
///
/// Deserialization goes through [`PackedBatch::new`], so a loaded batch is
/// always evenly packed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPackedBatch")]
pub struct PackedBatch {
    packed: Vec<f32>,
    present: Vec<bool>,
}

#[derive(Deserialize)]
struct RawPackedBatch {
    packed: Vec<f32>,
    present: Vec<bool>,
}

impl TryFrom<RawPackedBatch> for PackedBatch {
    type Error = BatchError;

    fn try_from(raw: RawPackedBatch) -> Result<Self, BatchError> {
        Self::new(raw.packed, raw.present)
    }
}

impl PackedBatch {
    /// Create a batch from already packed values.
    ///
    /// Fails if the values cannot be split evenly across the present lanes.
    pub fn new(packed: Vec<f32>, present: Vec<bool>) -> Result<Self, BatchError> {
        let batch = Self { packed, present };
        batch.lane_width()?;
        Ok(batch)
    }

    /// Pack per-lane vectors, one entry per lane (`None` = absent).
    ///
    /// Every present lane must have the same width.
    pub fn from_lanes(lanes: Vec<Option<Vec<f32>>>) -> Result<Self, BatchError> {
        let mut packed = Vec::new();
        let mut present = Vec::with_capacity(lanes.len());
        let mut width = None;

        for (lane, values) in lanes.into_iter().enumerate() {
            match values {
                Some(values) => {
                    let expected = *width.get_or_insert(values.len());
                    if values.len() != expected {
                        return Err(BatchError::RaggedLanes {
                            lane,
                            expected,
                            actual: values.len(),
                        });
                    }
                    packed.extend(values);
                    present.push(true);
                }
                None => present.push(false),
            }
        }

        Ok(Self { packed, present })
    }

    /// Pack byte observations, as recorded by uint8 input tapes.
    pub fn from_u8(packed: &[u8], present: Vec<bool>) -> Result<Self, BatchError> {
        Self::new(unpack::widen_u8s(packed), present)
    }

    /// An all-absent batch over `lane_count` lanes.
    pub fn absent(lane_count: usize) -> Self {
        Self {
            packed: Vec::new(),
            present: vec![false; lane_count],
        }
    }

    /// Raw packed values.
    pub fn packed(&self) -> &[f32] {
        &self.packed
    }

    /// Presence mask, one flag per lane.
    pub fn present(&self) -> &[bool] {
        &self.present
    }

    /// Total number of lanes, present or not.
    pub fn lane_count(&self) -> usize {
        self.present.len()
    }

    /// Number of lanes that contributed values.
    pub fn num_present(&self) -> usize {
        self.present.iter().filter(|&&p| p).count()
    }

    /// Whether `lane` contributed values. Out-of-range lanes are absent.
    pub fn is_present(&self, lane: usize) -> bool {
        self.present.get(lane).copied().unwrap_or(false)
    }

    /// Number of packed values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.packed.len()
    }

    /// Whether no values are packed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packed.is_empty()
    }

    /// Values per present lane (0 when no lane is present).
    pub fn lane_width(&self) -> Result<usize, BatchError> {
        let len = self.packed.len();
        match self.num_present() {
            0 if len == 0 => Ok(0),
            0 => Err(BatchError::EmptyPresentData { len }),
            present if len % present != 0 => Err(BatchError::Misaligned { len, present }),
            present => Ok(len / present),
        }
    }

    /// Indices of present lanes, ascending.
    pub fn present_lanes(&self) -> impl Iterator<Item = usize> + '_ {
        self.present
            .iter()
            .enumerate()
            .filter_map(|(lane, &p)| p.then_some(lane))
    }

    /// The values contributed by `lane`, if it is present.
    pub fn lane_values(&self, lane: usize) -> Option<&[f32]> {
        if !self.is_present(lane) {
            return None;
        }
        let width = self.lane_width().ok()?;
        let slot = self.present[..lane].iter().filter(|&&p| p).count();
        Some(unpack::lane_slice(&self.packed, slot, width))
    }
}

/// Observation and action-distribution batches for a whole rollout.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRolloutSet")]
pub struct RolloutSet {
    inputs: Vec<PackedBatch>,
    actions: Vec<PackedBatch>,
}

#[derive(Deserialize)]
struct RawRolloutSet {
    inputs: Vec<PackedBatch>,
    actions: Vec<PackedBatch>,
}

impl TryFrom<RawRolloutSet> for RolloutSet {
    type Error = BatchError;

    fn try_from(raw: RawRolloutSet) -> Result<Self, BatchError> {
        Self::new(raw.inputs, raw.actions)
    }
}

impl RolloutSet {
    /// Pair observation and action batches.
    ///
    /// Both sequences must have one batch per timestep with identical
    /// presence masks.
    pub fn new(inputs: Vec<PackedBatch>, actions: Vec<PackedBatch>) -> Result<Self, BatchError> {
        if inputs.len() != actions.len() {
            return Err(BatchError::StepMismatch {
                inputs: inputs.len(),
                actions: actions.len(),
            });
        }
        for (timestep, (input, action)) in inputs.iter().zip(&actions).enumerate() {
            if input.present() != action.present() {
                return Err(BatchError::PresenceMismatch { timestep });
            }
        }
        Ok(Self { inputs, actions })
    }

    /// Observation batches, one per timestep.
    pub fn inputs(&self) -> &[PackedBatch] {
        &self.inputs
    }

    /// Action-distribution batches, one per timestep.
    pub fn actions(&self) -> &[PackedBatch] {
        &self.actions
    }

    /// Number of timesteps.
    pub fn num_steps(&self) -> usize {
        self.inputs.len()
    }

    /// Check if there are no timesteps.
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Number of lanes (the widest presence mask).
    pub fn lane_count(&self) -> usize {
        self.inputs.iter().map(PackedBatch::lane_count).max().unwrap_or(0)
    }

    /// Total number of present (lane, timestep) pairs.
    pub fn total_present(&self) -> usize {
        self.inputs.iter().map(PackedBatch::num_present).sum()
    }

    /// Present `(lane, timestep)` pairs in timestep-major, lane-minor order.
    ///
    /// This is the order samples are generated in.
    pub fn present_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.inputs
            .iter()
            .enumerate()
            .flat_map(|(t, batch)| batch.present_lanes().map(move |lane| (lane, t)))
    }

    /// Number of present timesteps per lane.
    pub fn episode_lengths(&self) -> Vec<usize> {
        let mut lengths = vec![0; self.lane_count()];
        for (lane, _) in self.present_pairs() {
            lengths[lane] += 1;
        }
        lengths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_lane_rollout() -> RolloutSet {
        let inputs = vec![
            PackedBatch::from_lanes(vec![Some(vec![1.0, 2.0]), Some(vec![3.0, 4.0])]).unwrap(),
            PackedBatch::from_lanes(vec![Some(vec![5.0, 6.0]), None]).unwrap(),
        ];
        let actions = vec![
            PackedBatch::from_lanes(vec![Some(vec![0.9, 0.1]), Some(vec![0.2, 0.8])]).unwrap(),
            PackedBatch::from_lanes(vec![Some(vec![0.5, 0.5]), None]).unwrap(),
        ];
        RolloutSet::new(inputs, actions).unwrap()
    }

    #[test]
    fn test_from_lanes_packs_present_only() {
        let lanes = vec![None, Some(vec![1.0, 2.0]), Some(vec![3.0, 4.0])];
        let batch = PackedBatch::from_lanes(lanes).unwrap();

        assert_eq!(batch.packed(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(batch.present(), &[false, true, true]);
        assert_eq!(batch.lane_count(), 3);
        assert_eq!(batch.num_present(), 2);
        assert_eq!(batch.lane_width(), Ok(2));
    }

    #[test]
    fn test_from_lanes_rejects_ragged() {
        let err = PackedBatch::from_lanes(vec![Some(vec![1.0, 2.0]), Some(vec![3.0])]).unwrap_err();
        assert_eq!(
            err,
            BatchError::RaggedLanes {
                lane: 1,
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_new_rejects_misaligned() {
        let err = PackedBatch::new(vec![1.0, 2.0, 3.0], vec![true, true]).unwrap_err();
        assert_eq!(err, BatchError::Misaligned { len: 3, present: 2 });
    }

    #[test]
    fn test_new_rejects_data_without_lanes() {
        let err = PackedBatch::new(vec![1.0], vec![false, false]).unwrap_err();
        assert_eq!(err, BatchError::EmptyPresentData { len: 1 });
    }

    #[test]
    fn test_absent_batch() {
        let batch = PackedBatch::absent(3);
        assert!(batch.is_empty());
        assert_eq!(batch.num_present(), 0);
        assert_eq!(batch.lane_width(), Ok(0));
    }

    #[test]
    fn test_from_u8() {
        let batch = PackedBatch::from_u8(&[0, 7, 255, 1], vec![true, false, true]).unwrap();
        assert_eq!(batch.packed(), &[0.0, 7.0, 255.0, 1.0]);
        assert_eq!(batch.lane_values(2), Some(&[255.0, 1.0][..]));
    }

    #[test]
    fn test_lane_values() {
        let batch = PackedBatch::from_lanes(vec![Some(vec![1.0]), None, Some(vec![2.0])]).unwrap();
        assert_eq!(batch.lane_values(0), Some(&[1.0][..]));
        assert_eq!(batch.lane_values(1), None);
        assert_eq!(batch.lane_values(2), Some(&[2.0][..]));
        assert_eq!(batch.lane_values(9), None);
    }

    #[test]
    fn test_present_lanes() {
        let batch =
            PackedBatch::from_lanes(vec![None, Some(vec![1.0]), None, Some(vec![2.0])]).unwrap();
        let lanes: Vec<_> = batch.present_lanes().collect();
        assert_eq!(lanes, vec![1, 3]);
    }

    #[test]
    fn test_rollout_step_mismatch() {
        let err = RolloutSet::new(vec![PackedBatch::absent(1)], vec![]).unwrap_err();
        assert_eq!(err, BatchError::StepMismatch { inputs: 1, actions: 0 });
    }

    #[test]
    fn test_rollout_presence_mismatch() {
        let inputs = vec![PackedBatch::from_lanes(vec![Some(vec![1.0]), None]).unwrap()];
        let actions = vec![PackedBatch::from_lanes(vec![None, Some(vec![1.0])]).unwrap()];
        let err = RolloutSet::new(inputs, actions).unwrap_err();
        assert_eq!(err, BatchError::PresenceMismatch { timestep: 0 });
    }

    #[test]
    fn test_rollout_counts() {
        let rollouts = two_lane_rollout();
        assert_eq!(rollouts.num_steps(), 2);
        assert_eq!(rollouts.lane_count(), 2);
        assert_eq!(rollouts.total_present(), 3);
        assert_eq!(rollouts.episode_lengths(), vec![2, 1]);
    }

    #[test]
    fn test_present_pairs_order() {
        let rollouts = two_lane_rollout();
        let pairs: Vec<_> = rollouts.present_pairs().collect();
        assert_eq!(pairs, vec![(0, 0), (1, 0), (0, 1)]);
    }

    #[test]
    fn test_empty_rollout() {
        let rollouts = RolloutSet::default();
        assert!(rollouts.is_empty());
        assert_eq!(rollouts.lane_count(), 0);
        assert!(rollouts.episode_lengths().is_empty());
    }

    #[test]
    fn test_rollout_serialization() {
        let rollouts = two_lane_rollout();
        let json = serde_json::to_string(&rollouts).unwrap();
        let deserialized: RolloutSet = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, rollouts);
    }

    #[test]
    fn test_deserialize_rejects_misaligned_batch() {
        let json = r#"{"packed":[1.0,2.0,3.0],"present":[true,true]}"#;
        let err = serde_json::from_str::<PackedBatch>(json).unwrap_err();
        assert!(err.to_string().contains("cannot be split across 2 present lanes"));
    }

    #[test]
    fn test_deserialize_rejects_unpaired_tapes() {
        let json = r#"{"inputs":[{"packed":[1.0,2.0],"present":[true,true]}],"actions":[]}"#;
        assert!(serde_json::from_str::<RolloutSet>(json).is_err());

        let json = r#"{
            "inputs":[{"packed":[1.0],"present":[true,false]}],
            "actions":[{"packed":[1.0],"present":[false,true]}]
        }"#;
        assert!(serde_json::from_str::<RolloutSet>(json).is_err());
    }

    #[test]
    fn test_bincode_roundtrip_revalidates() {
        let rollouts = two_lane_rollout();
        let bytes = bincode::serialize(&rollouts).unwrap();
        let back: RolloutSet = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, rollouts);
    }
}
