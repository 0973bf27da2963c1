//! Vigil Session - from frame scores to a session summary
//!
//! This crate implements the temporal half of the pipeline:
//! - Clocks (monotonic and manual)
//! - EMA smoothing of frame scores
//! - The Sampler state machine (`idle → running → idle`)
//! - Session aggregation with duration weighting
//! - Snapshot series for single-shot sampling
//!
//! Nothing here spawns tasks or sleeps. Callers drive the sampler from one
//! execution context, which is what keeps ticks and frame callbacks from
//! interleaving mid-update.

pub mod aggregator;
pub mod clock;
pub mod sampler;
pub mod smoother;
pub mod snapshot;

pub use aggregator::*;
pub use clock::*;
pub use sampler::*;
pub use smoother::*;
pub use snapshot::*;
