//! Vigil Runtime - monitor orchestration
//!
//! This crate drives the attention pipeline on tokio:
//! 1. Acquire detector and camera (failures surface to the caller)
//! 2. Capture frames and run inference with a safety timeout
//! 3. Feed detector results to the sampler
//! 4. Tick the sampler at a fixed cadence, independent of frame rate
//! 5. Report samples best-effort
//! 6. On stop: release resources, summarize, report the summary
//!
//! Collaborators (camera, detector, visibility, reporter) are supplied by
//! the caller through the traits in [`ports`].

pub mod clock;
pub mod monitor;
pub mod ports;
pub mod snapshot;
pub mod telemetry;

pub use clock::*;
pub use monitor::*;
pub use ports::*;
pub use snapshot::*;
pub use telemetry::*;
