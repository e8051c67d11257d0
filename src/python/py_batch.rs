//! Rollout batch bindings for Python.

use pyo3::prelude::*;

use crate::core::{PackedBatch, RolloutSet};

use super::value_error;

/// Python wrapper for PackedBatch.
#[pyclass(name = "PackedBatch")]
#[derive(Clone, Debug)]
pub struct PyPackedBatch(pub PackedBatch);

#[pymethods]
impl PyPackedBatch {
    /// Create a batch from packed values and a presence mask.
    #[new]
    fn new(packed: Vec<f32>, present: Vec<bool>) -> PyResult<Self> {
        PackedBatch::new(packed, present).map(Self).map_err(value_error)
    }

    /// Create a batch from one entry per lane (`None` for absent lanes).
    #[staticmethod]
    fn from_lanes(lanes: Vec<Option<Vec<f32>>>) -> PyResult<Self> {
        PackedBatch::from_lanes(lanes).map(Self).map_err(value_error)
    }

    /// Create a batch from byte observations.
    #[staticmethod]
    fn from_bytes(packed: Vec<u8>, present: Vec<bool>) -> PyResult<Self> {
        PackedBatch::from_u8(&packed, present).map(Self).map_err(value_error)
    }

    #[getter]
    fn packed(&self) -> Vec<f32> {
        self.0.packed().to_vec()
    }

    #[getter]
    fn present(&self) -> Vec<bool> {
        self.0.present().to_vec()
    }

    #[getter]
    fn lane_count(&self) -> usize {
        self.0.lane_count()
    }

    #[getter]
    fn num_present(&self) -> usize {
        self.0.num_present()
    }

    fn __len__(&self) -> usize {
        self.0.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "PackedBatch(lanes={}, present={}, values={})",
            self.0.lane_count(),
            self.0.num_present(),
            self.0.len()
        )
    }
}

/// Python wrapper for RolloutSet.
#[pyclass(name = "RolloutSet")]
#[derive(Clone, Debug)]
pub struct PyRolloutSet(pub RolloutSet);

#[pymethods]
impl PyRolloutSet {
    /// Pair observation batches with action-distribution batches.
    #[new]
    fn new(inputs: Vec<PyPackedBatch>, actions: Vec<PyPackedBatch>) -> PyResult<Self> {
        let inner = |batches: Vec<PyPackedBatch>| -> Vec<PackedBatch> {
            batches.into_iter().map(|b| b.0).collect()
        };
        RolloutSet::new(inner(inputs), inner(actions))
            .map(Self)
            .map_err(value_error)
    }

    #[getter]
    fn num_steps(&self) -> usize {
        self.0.num_steps()
    }

    #[getter]
    fn lane_count(&self) -> usize {
        self.0.lane_count()
    }

    /// Total number of present (lane, timestep) pairs.
    fn total_present(&self) -> usize {
        self.0.total_present()
    }

    /// Present timesteps per lane.
    fn episode_lengths(&self) -> Vec<usize> {
        self.0.episode_lengths()
    }

    fn __len__(&self) -> usize {
        self.0.num_steps()
    }

    fn __repr__(&self) -> String {
        format!(
            "RolloutSet(steps={}, lanes={}, present={})",
            self.0.num_steps(),
            self.0.lane_count(),
            self.0.total_present()
        )
    }
}
