//! Core rollout types: packed batches, advantage tables, unpacking helpers.
//!
//! These describe the data handed over by the rollout collector and the
//! advantage estimator. The sample pipeline only ever reads them.

pub mod advantage;
pub mod batch;
pub mod unpack;

pub use advantage::Advantages;
pub use batch::{PackedBatch, RolloutSet};
