//! Training samples for tree building.
//!
//! A sample maps one observation and the action taken on it to an
//! advantage. Features come in two storage flavours: full-precision
//! `f64`, or `u8` for observations that are already byte valued (screen
//! pixels, say), which cuts memory by 8x.

use serde::{Deserialize, Serialize};

/// Sample with full-precision features.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DenseSample {
    features: Vec<f64>,
    action: usize,
    advantage: f64,
}

impl DenseSample {
    /// Create a dense sample.
    pub fn new(features: Vec<f64>, action: usize, advantage: f64) -> Self {
        Self {
            features,
            action,
            advantage,
        }
    }

    /// Feature values.
    pub fn features(&self) -> &[f64] {
        &self.features
    }
}

/// Sample with byte-sized features.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Uint8Sample {
    features: Vec<u8>,
    action: usize,
    advantage: f64,
}

impl Uint8Sample {
    /// Create a quantized sample.
    pub fn new(features: Vec<u8>, action: usize, advantage: f64) -> Self {
        Self {
            features,
            action,
            advantage,
        }
    }

    /// Feature values as stored.
    pub fn features(&self) -> &[u8] {
        &self.features
    }
}

/// A training sample, dense or quantized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Sample {
    Dense(DenseSample),
    Uint8(Uint8Sample),
}

impl Sample {
    /// Feature at `idx`, widened to `f64`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.num_features()`.
    pub fn feature(&self, idx: usize) -> f64 {
        match self {
            Sample::Dense(s) => s.features[idx],
            Sample::Uint8(s) => f64::from(s.features[idx]),
        }
    }

    /// Feature at `idx`, or `None` if out of range.
    pub fn try_feature(&self, idx: usize) -> Option<f64> {
        match self {
            Sample::Dense(s) => s.features.get(idx).copied(),
            Sample::Uint8(s) => s.features.get(idx).copied().map(f64::from),
        }
    }

    /// The discrete action taken.
    pub fn action(&self) -> usize {
        match self {
            Sample::Dense(s) => s.action,
            Sample::Uint8(s) => s.action,
        }
    }

    /// The advantage of the action taken.
    pub fn advantage(&self) -> f64 {
        match self {
            Sample::Dense(s) => s.advantage,
            Sample::Uint8(s) => s.advantage,
        }
    }

    /// Number of features.
    pub fn num_features(&self) -> usize {
        match self {
            Sample::Dense(s) => s.features.len(),
            Sample::Uint8(s) => s.features.len(),
        }
    }

    /// All features widened to `f64`.
    pub fn features_f64(&self) -> Vec<f64> {
        match self {
            Sample::Dense(s) => s.features.clone(),
            Sample::Uint8(s) => s.features.iter().map(|&v| f64::from(v)).collect(),
        }
    }

    /// Whether features are stored as bytes.
    pub fn is_quantized(&self) -> bool {
        matches!(self, Sample::Uint8(_))
    }
}

impl From<DenseSample> for Sample {
    fn from(sample: DenseSample) -> Self {
        Sample::Dense(sample)
    }
}

impl From<Uint8Sample> for Sample {
    fn from(sample: Uint8Sample) -> Self {
        Sample::Uint8(sample)
    }
}
