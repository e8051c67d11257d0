//! Draining a sample stream into memory.
//!
//! This is the one point in the pipeline where a whole batch of samples is
//! held at once, right before it is handed to the tree builder.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::ops::Index;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::samples::sample::Sample;

/// Read every sample from a stream, preserving order.
///
/// Stops at and returns the first error. An empty stream gives an empty
/// batch.
pub fn all_samples<I>(samples: I) -> Result<SampleBatch>
where
    I: IntoIterator<Item = Result<Sample>>,
{
    let samples = samples.into_iter().collect::<Result<Vec<_>>>()?;
    debug!(samples = samples.len(), "materialized sample stream");
    Ok(SampleBatch::from(samples))
}

/// Summary statistics of the advantages in a batch.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdvantageStats {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

/// An ordered, in-memory batch of samples.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleBatch {
    samples: Vec<Sample>,
}

impl SampleBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the batch is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample at `index`.
    pub fn get(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index)
    }

    /// Iterate over samples in stream order.
    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    /// Samples as a slice.
    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }

    /// Take the samples out of the batch.
    pub fn into_vec(self) -> Vec<Sample> {
        self.samples
    }

    /// Feature width, taken from the first sample.
    pub fn num_features(&self) -> Option<usize> {
        self.samples.first().map(Sample::num_features)
    }

    /// Mean, spread and range of the advantages, or `None` if empty.
    pub fn advantage_stats(&self) -> Option<AdvantageStats> {
        if self.samples.is_empty() {
            return None;
        }
        let count = self.samples.len();
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for adv in self.samples.iter().map(Sample::advantage) {
            sum += adv;
            min = min.min(adv);
            max = max.max(adv);
        }
        let mean = sum / count as f64;
        let variance = self
            .samples
            .iter()
            .map(|s| (s.advantage() - mean).powi(2))
            .sum::<f64>()
            / count as f64;

        Some(AdvantageStats {
            count,
            mean,
            std_dev: variance.sqrt(),
            min,
            max,
        })
    }

    /// How often each action was taken, indexed by action.
    pub fn action_counts(&self) -> Vec<usize> {
        let width = self.samples.iter().map(|s| s.action() + 1).max().unwrap_or(0);
        let mut counts = vec![0; width];
        for sample in &self.samples {
            counts[sample.action()] += 1;
        }
        counts
    }

    /// Encode the batch with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode a batch produced by [`SampleBatch::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Write the batch to `path`.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(writer, self)?;
        debug!(samples = self.len(), path = %path.display(), "saved sample batch");
        Ok(())
    }

    /// Read a batch written by [`SampleBatch::save_to_file`].
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        Ok(bincode::deserialize_from(reader)?)
    }
}

impl From<Vec<Sample>> for SampleBatch {
    fn from(samples: Vec<Sample>) -> Self {
        Self { samples }
    }
}

impl Index<usize> for SampleBatch {
    type Output = Sample;

    fn index(&self, index: usize) -> &Sample {
        &self.samples[index]
    }
}

impl IntoIterator for SampleBatch {
    type Item = Sample;
    type IntoIter = std::vec::IntoIter<Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.into_iter()
    }
}

impl<'a> IntoIterator for &'a SampleBatch {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}
