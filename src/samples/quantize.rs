//! Shrinking sample streams to byte-sized features.
//!
//! Only use this when the features are known to be 8-bit integers (raw
//! pixels, for instance). Values are not clamped: anything fractional is
//! truncated and anything outside `[0, 255]` wraps, unless validation is
//! switched on in [`QuantizeConfig`].

use std::iter::FusedIterator;

use serde::{Deserialize, Serialize};

use crate::core::unpack;
use crate::error::SampleError;
use crate::samples::sample::{Sample, Uint8Sample};

/// Settings for the quantizing stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuantizeConfig {
    /// Features copied from each incoming sample.
    /// Must match the width produced upstream.
    pub num_features: usize,

    /// Reject features that do not fit in a `u8` instead of wrapping them.
    #[serde(default)]
    pub validate: bool,
}

impl QuantizeConfig {
    /// Unchecked quantization of `num_features` features.
    pub fn new(num_features: usize) -> Self {
        Self {
            num_features,
            validate: false,
        }
    }

    /// Enable or disable range checking.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }
}

/// Order-preserving stream of quantized samples.
///
/// Pulls one upstream sample per output sample. Action and advantage are
/// copied unchanged; upstream errors are passed through and end the
/// stream.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Uint8Samples<I> {
    incoming: I,
    config: QuantizeConfig,
    done: bool,
}

impl<I> Uint8Samples<I>
where
    I: Iterator<Item = Result<Sample, SampleError>>,
{
    /// Wrap an incoming sample stream.
    pub fn new(config: QuantizeConfig, incoming: I) -> Self {
        Self {
            incoming,
            config,
            done: false,
        }
    }

    /// The stage configuration.
    pub fn config(&self) -> &QuantizeConfig {
        &self.config
    }

    fn quantize(&self, sample: &Sample) -> Result<Sample, SampleError> {
        let mut features = Vec::with_capacity(self.config.num_features);
        for index in 0..self.config.num_features {
            let value = sample.try_feature(index).ok_or(SampleError::FeatureIndex {
                index,
                width: sample.num_features(),
            })?;
            if self.config.validate && !unpack::fits_u8(value) {
                return Err(SampleError::FeatureOutOfRange { index, value });
            }
            features.push(unpack::quantize_u8(value));
        }
        Ok(Uint8Sample::new(features, sample.action(), sample.advantage()).into())
    }
}

impl<I> Iterator for Uint8Samples<I>
where
    I: Iterator<Item = Result<Sample, SampleError>>,
{
    type Item = Result<Sample, SampleError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = match self.incoming.next()? {
            Ok(sample) => self.quantize(&sample),
            Err(err) => Err(err),
        };
        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }

    // A sample that fails to quantize ends the stream early, so only the
    // upper bound carries over from upstream.
    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            (0, Some(0))
        } else {
            (0, self.incoming.size_hint().1)
        }
    }
}

impl<I> FusedIterator for Uint8Samples<I> where I: Iterator<Item = Result<Sample, SampleError>> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples::sample::DenseSample;

    fn dense(features: Vec<f64>, action: usize, advantage: f64) -> Result<Sample, SampleError> {
        Ok(DenseSample::new(features, action, advantage).into())
    }

    #[test]
    fn test_quantizes_in_order() {
        let incoming = vec![
            dense(vec![0.0, 12.0, 255.0], 1, 0.5),
            dense(vec![3.0, 4.0, 5.0], 0, -1.5),
        ];
        let out: Vec<_> = Uint8Samples::new(QuantizeConfig::new(3), incoming.into_iter())
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(out.len(), 2);
        assert!(out.iter().all(Sample::is_quantized));
        assert_eq!(out[0].features_f64(), vec![0.0, 12.0, 255.0]);
        assert_eq!(out[0].action(), 1);
        assert_eq!(out[0].advantage(), 0.5);
        assert_eq!(out[1].features_f64(), vec![3.0, 4.0, 5.0]);
        assert_eq!(out[1].advantage(), -1.5);
    }

    #[test]
    fn test_unchecked_truncates_and_wraps() {
        let incoming = vec![dense(vec![2.7, 256.0, -1.0], 0, 0.0)];
        let out: Vec<_> = Uint8Samples::new(QuantizeConfig::new(3), incoming.into_iter())
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(out[0].features_f64(), vec![2.0, 0.0, 255.0]);
    }

    #[test]
    fn test_narrower_config_drops_trailing_features() {
        let incoming = vec![dense(vec![1.0, 2.0, 3.0], 0, 0.0)];
        let out: Vec<_> = Uint8Samples::new(QuantizeConfig::new(2), incoming.into_iter())
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(out[0].num_features(), 2);
    }

    #[test]
    fn test_wider_config_is_an_error() {
        let incoming = vec![dense(vec![1.0], 0, 0.0)];
        let result: Result<Vec<_>, _> =
            Uint8Samples::new(QuantizeConfig::new(2), incoming.into_iter()).collect();

        assert!(matches!(
            result,
            Err(SampleError::FeatureIndex { index: 1, width: 1 })
        ));
    }

    #[test]
    fn test_validation_rejects_out_of_range() {
        let incoming = vec![dense(vec![1.0, 300.0], 0, 0.0)];
        let config = QuantizeConfig::new(2).with_validation(true);
        let mut stream = Uint8Samples::new(config, incoming.into_iter());

        match stream.next() {
            Some(Err(SampleError::FeatureOutOfRange { index, value })) => {
                assert_eq!(index, 1);
                assert_eq!(value, 300.0);
            }
            other => panic!("expected FeatureOutOfRange, got {:?}", other),
        }
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_validation_rejects_fractions() {
        let incoming = vec![dense(vec![0.5], 0, 0.0)];
        let config = QuantizeConfig::new(1).with_validation(true);
        let result: Result<Vec<_>, _> = Uint8Samples::new(config, incoming.into_iter()).collect();
        assert!(result.is_err());
    }

    #[test]
    fn test_upstream_error_passes_through() {
        let incoming = vec![
            dense(vec![1.0], 0, 0.0),
            Err(SampleError::ActionStreamEnded { timestep: 1 }),
            dense(vec![2.0], 0, 0.0),
        ];
        let mut stream = Uint8Samples::new(QuantizeConfig::new(1), incoming.into_iter());

        assert!(stream.next().unwrap().is_ok());
        assert!(matches!(
            stream.next(),
            Some(Err(SampleError::ActionStreamEnded { timestep: 1 }))
        ));
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_size_hint_keeps_upstream_upper_bound() {
        let incoming = vec![dense(vec![1.0], 0, 0.0), dense(vec![2.0], 0, 0.0)];
        let stream = Uint8Samples::new(QuantizeConfig::new(1), incoming.into_iter());
        assert_eq!(stream.size_hint(), (0, Some(2)));
    }

    #[test]
    fn test_size_hint_holds_when_quantizing_fails() {
        let incoming = vec![dense(vec![1.0], 0, 0.0), dense(vec![2.0], 0, 0.0)];
        let stream = Uint8Samples::new(QuantizeConfig::new(2), incoming.into_iter());

        let (lower, upper) = stream.size_hint();
        let produced = stream.count();

        assert_eq!(produced, 1);
        assert!(lower <= produced);
        assert!(upper.map_or(true, |upper| produced <= upper));
    }

    #[test]
    fn test_config_serialization() {
        let config: QuantizeConfig = serde_json::from_str(r#"{"num_features": 4}"#).unwrap();
        assert_eq!(config, QuantizeConfig::new(4));

        let json = serde_json::to_string(&config.with_validation(true)).unwrap();
        let back: QuantizeConfig = serde_json::from_str(&json).unwrap();
        assert!(back.validate);
    }
}
