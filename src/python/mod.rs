//! Python bindings for the treeagent sample pipeline.
//!
//! # Quick Start
//!
//! ```python
//! import treeagent as ta
//!
//! # One packed batch per timestep; lane 1 finished after step 0
//! inputs = [
//!     ta.PackedBatch.from_lanes([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]),
//!     ta.PackedBatch.from_lanes([[7.0, 8.0, 9.0], None]),
//! ]
//! actions = [
//!     ta.PackedBatch.from_lanes([[0.1, 0.9], [0.6, 0.4]]),
//!     ta.PackedBatch.from_lanes([[0.5, 0.5], None]),
//! ]
//! rollouts = ta.RolloutSet(inputs, actions)
//!
//! batch = ta.rollout_samples(rollouts, [[1.0, 0.5], [-0.2]])
//! features, actions, advantages = batch.to_numpy()
//! ```

use std::fmt::Display;

use pyo3::prelude::*;

mod py_batch;
mod py_samples;

pub use py_batch::*;
pub use py_samples::*;

fn value_error<E: Display>(err: E) -> PyErr {
    PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("{}", err))
}

/// treeagent: rollout-to-sample conversion for tree-based policies.
///
/// This module provides:
/// - Packed rollout batches with presence masks
/// - The sample pipeline (generation, quantization, materialization)
/// - Numpy export of sample batches
#[pymodule]
fn treeagent(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Rollout types
    m.add_class::<PyPackedBatch>()?;
    m.add_class::<PyRolloutSet>()?;

    // Pipeline
    m.add_class::<PyPipelineConfig>()?;
    m.add_class::<PySampleBatch>()?;
    m.add_function(wrap_pyfunction!(rollout_samples, m)?)?;

    Ok(())
}
