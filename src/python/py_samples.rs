//! Sample and pipeline bindings for Python.

use numpy::{PyArray1, PyArray2, PyArrayMethods};
use pyo3::prelude::*;

use crate::core::Advantages;
use crate::pipeline::{Pipeline, PipelineConfig};
use crate::samples::{QuantizeConfig, Sample, SampleBatch};

use super::py_batch::PyRolloutSet;
use super::value_error;

/// Python wrapper for PipelineConfig.
#[pyclass(name = "PipelineConfig")]
#[derive(Clone)]
pub struct PyPipelineConfig(pub PipelineConfig);

#[pymethods]
impl PyPipelineConfig {
    /// Create a new pipeline configuration.
    ///
    /// # Arguments
    /// - quantize_features: Store this many features per sample as bytes (default: None)
    /// - validate: Reject features that are not 8-bit integers when quantizing (default: False)
    /// - check_coverage: Check the advantage table before streaming (default: False)
    #[new]
    #[pyo3(signature = (quantize_features = None, validate = false, check_coverage = false))]
    fn new(quantize_features: Option<usize>, validate: bool, check_coverage: bool) -> Self {
        let mut config = PipelineConfig::new().with_coverage_check(check_coverage);
        if let Some(n) = quantize_features {
            config = config.with_quantize_config(QuantizeConfig::new(n).with_validation(validate));
        }
        Self(config)
    }

    #[getter]
    fn quantize_features(&self) -> Option<usize> {
        self.0.quantize.as_ref().map(|q| q.num_features)
    }

    #[getter]
    fn check_coverage(&self) -> bool {
        self.0.check_advantage_coverage
    }

    fn __repr__(&self) -> String {
        format!(
            "PipelineConfig(quantize_features={:?}, check_coverage={})",
            self.quantize_features(),
            self.0.check_advantage_coverage
        )
    }
}

/// Python wrapper for SampleBatch.
#[pyclass(name = "SampleBatch")]
pub struct PySampleBatch {
    inner: SampleBatch,
}

#[pymethods]
impl PySampleBatch {
    /// Load a batch saved with `save`.
    #[staticmethod]
    fn load(path: &str) -> PyResult<Self> {
        SampleBatch::load_from_file(path)
            .map(|inner| Self { inner })
            .map_err(value_error)
    }

    /// Save the batch to a file.
    fn save(&self, path: &str) -> PyResult<()> {
        self.inner.save_to_file(path).map_err(value_error)
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    /// Actions taken, in sample order.
    #[getter]
    fn actions(&self) -> Vec<usize> {
        self.inner.iter().map(Sample::action).collect()
    }

    /// Advantages, in sample order.
    #[getter]
    fn advantages(&self) -> Vec<f64> {
        self.inner.iter().map(Sample::advantage).collect()
    }

    /// Features of one sample.
    fn features(&self, index: usize) -> Option<Vec<f64>> {
        self.inner.get(index).map(Sample::features_f64)
    }

    /// Get all samples as numpy arrays.
    ///
    /// Returns (features, actions, advantages):
    /// - features: [N, num_features] float64
    /// - actions: [N] int64
    /// - advantages: [N] float64
    fn to_numpy<'py>(
        &self,
        py: Python<'py>,
    ) -> PyResult<(
        Bound<'py, PyArray2<f64>>,
        Bound<'py, PyArray1<i64>>,
        Bound<'py, PyArray1<f64>>,
    )> {
        let n = self.inner.len();
        let width = self.inner.num_features().unwrap_or(0);

        let mut features: Vec<f64> = Vec::with_capacity(n * width);
        for (i, sample) in self.inner.iter().enumerate() {
            if sample.num_features() != width {
                return Err(value_error(format!(
                    "Inconsistent feature count at sample {}: expected {}, got {}",
                    i,
                    width,
                    sample.num_features()
                )));
            }
            features.extend(sample.features_f64());
        }
        let actions: Vec<i64> = self.inner.iter().map(|s| s.action() as i64).collect();
        let advantages: Vec<f64> = self.inner.iter().map(Sample::advantage).collect();

        let features = PyArray1::from_vec_bound(py, features)
            .reshape([n, width])
            .map_err(value_error)?;
        Ok((
            features,
            PyArray1::from_vec_bound(py, actions),
            PyArray1::from_vec_bound(py, advantages),
        ))
    }

    fn __repr__(&self) -> String {
        format!(
            "SampleBatch(len={}, num_features={})",
            self.inner.len(),
            self.inner.num_features().unwrap_or(0)
        )
    }
}

/// Convert a rollout set and its advantage table into a sample batch.
///
/// `advantages[lane][timestep]` must cover every present pair.
#[pyfunction]
#[pyo3(signature = (rollouts, advantages, config = None))]
pub fn rollout_samples(
    rollouts: &PyRolloutSet,
    advantages: Vec<Vec<f64>>,
    config: Option<PyPipelineConfig>,
) -> PyResult<PySampleBatch> {
    let pipeline = Pipeline::new(config.map(|c| c.0).unwrap_or_default());
    pipeline
        .run(&rollouts.0, &Advantages::from(advantages))
        .map(|inner| PySampleBatch { inner })
        .map_err(value_error)
}
