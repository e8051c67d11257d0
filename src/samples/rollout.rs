//! Generating samples from a batch of rollouts.
//!
//! [`RolloutSamples`] walks the observation and action tapes in lockstep
//! and yields one [`Sample`] per present `(lane, timestep)` pair. Samples
//! come out sorted first by timestep and then by lane, so samples from
//! time `t` always precede samples from `t + 1`. That is the same order
//! advantages are indexed in, which is what keeps each advantage attached
//! to the right observation.
//!
//! The stream is pull-based: nothing is unpacked until the consumer asks
//! for the next sample, and at most one sample is built at a time.

use std::iter::FusedIterator;
use std::slice;

use tracing::{debug, trace};

use crate::core::{unpack, Advantages, PackedBatch, RolloutSet};
use crate::error::{BatchError, SampleError};
use crate::samples::sample::{DenseSample, Sample};

/// The timestep currently being unpacked.
#[derive(Debug)]
struct Timestep<'a> {
    index: usize,
    input: &'a PackedBatch,
    output: &'a PackedBatch,
    num_features: usize,
    num_actions: usize,
    /// Next lane to inspect.
    lane: usize,
    /// Position of the next present lane in the packed data.
    slot: usize,
}

impl<'a> Timestep<'a> {
    fn new(
        index: usize,
        input: &'a PackedBatch,
        output: &'a PackedBatch,
    ) -> Result<Self, SampleError> {
        if input.present() != output.present() {
            return Err(BatchError::PresenceMismatch { timestep: index }.into());
        }
        let num_features = input.lane_width()?;
        let num_actions = output.lane_width()?;

        trace!(
            timestep = index,
            present = input.num_present(),
            num_features,
            num_actions,
            "unpacking timestep"
        );

        Ok(Self {
            index,
            input,
            output,
            num_features,
            num_actions,
            lane: 0,
            slot: 0,
        })
    }

    /// Advance to the next present lane, returning `(lane, slot)`.
    fn next_lane(&mut self) -> Option<(usize, usize)> {
        let present = self.input.present();
        while self.lane < present.len() {
            let lane = self.lane;
            self.lane += 1;
            if present[lane] {
                let slot = self.slot;
                self.slot += 1;
                return Some((lane, slot));
            }
        }
        None
    }
}

/// Lazy stream of dense samples over a rollout batch.
///
/// Yields `Err` once and then stops if the rollout is malformed: the
/// action tape ends before the observation tape, a batch is packed
/// inconsistently, or the advantage table lacks an entry for a present
/// pair.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct RolloutSamples<'a, I, O> {
    inputs: I,
    outputs: O,
    advantages: &'a Advantages,
    current: Option<Timestep<'a>>,
    next_timestep: usize,
    emitted: usize,
    done: bool,
}

impl<'a> RolloutSamples<'a, slice::Iter<'a, PackedBatch>, slice::Iter<'a, PackedBatch>> {
    /// Stream the samples of a rollout set.
    pub fn new(rollouts: &'a RolloutSet, advantages: &'a Advantages) -> Self {
        Self::from_tapes(
            rollouts.inputs().iter(),
            rollouts.actions().iter(),
            advantages,
        )
    }
}

impl<'a, I, O> RolloutSamples<'a, I, O>
where
    I: Iterator<Item = &'a PackedBatch>,
    O: Iterator<Item = &'a PackedBatch>,
{
    /// Stream samples from separate observation and action tapes.
    ///
    /// The tapes are read in lockstep. Action batches left over once the
    /// observation tape is exhausted are ignored.
    pub fn from_tapes(inputs: I, outputs: O, advantages: &'a Advantages) -> Self {
        Self {
            inputs,
            outputs,
            advantages,
            current: None,
            next_timestep: 0,
            emitted: 0,
            done: false,
        }
    }

    /// `(lane, timestep)` of the next sample within the current timestep.
    ///
    /// Returns `None` between timesteps and once the stream is finished.
    pub fn position(&self) -> Option<(usize, usize)> {
        if self.done {
            return None;
        }
        let step = self.current.as_ref()?;
        step.input.present()[step.lane..]
            .iter()
            .position(|&p| p)
            .map(|offset| (step.lane + offset, step.index))
    }

    /// Number of samples produced so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    fn next_sample(&mut self) -> Result<Option<Sample>, SampleError> {
        loop {
            if let Some(step) = self.current.as_mut() {
                if let Some((lane, slot)) = step.next_lane() {
                    let features = unpack::to_f64s(unpack::lane_slice(
                        step.input.packed(),
                        slot,
                        step.num_features,
                    ));
                    let action = unpack::max_index(unpack::lane_slice(
                        step.output.packed(),
                        slot,
                        step.num_actions,
                    ))
                    .ok_or(BatchError::NoActions {
                        timestep: step.index,
                    })?;
                    let advantage = self.advantages.get(lane, step.index)?;

                    return Ok(Some(DenseSample::new(features, action, advantage).into()));
                }
                self.current = None;
            }

            let Some(input) = self.inputs.next() else {
                return Ok(None);
            };
            let index = self.next_timestep;
            let output = self
                .outputs
                .next()
                .ok_or(SampleError::ActionStreamEnded { timestep: index })?;
            self.current = Some(Timestep::new(index, input, output)?);
            self.next_timestep += 1;
        }
    }
}

impl<'a, I, O> Iterator for RolloutSamples<'a, I, O>
where
    I: Iterator<Item = &'a PackedBatch>,
    O: Iterator<Item = &'a PackedBatch>,
{
    type Item = Result<Sample, SampleError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_sample() {
            Ok(Some(sample)) => {
                self.emitted += 1;
                Some(Ok(sample))
            }
            Ok(None) => {
                self.done = true;
                debug!(
                    samples = self.emitted,
                    timesteps = self.next_timestep,
                    "rollout samples exhausted"
                );
                None
            }
            Err(err) => {
                self.done = true;
                debug!(samples = self.emitted, error = %err, "rollout samples aborted");
                Some(Err(err))
            }
        }
    }

    // Any remaining sample may fail and end the stream, so no lower bound
    // is guaranteed.
    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            (0, Some(0))
        } else {
            (0, None)
        }
    }
}

impl<'a, I, O> FusedIterator for RolloutSamples<'a, I, O>
where
    I: Iterator<Item = &'a PackedBatch>,
    O: Iterator<Item = &'a PackedBatch>,
{
}
