//! Vigil Core - Fundamental types and primitives
//!
//! This crate defines the types shared by every stage of the attention pipeline:
//! - Landmark input (Point, LandmarkSet)
//! - Per-frame signals and scores (SignalTriple, InstantScore)
//! - Temporal record (Sample, SampleOrigin, Timestamp)
//! - Session output and wire payloads (SessionSummary, SessionReport, SampleTelemetry)
//! - The single configuration structure and the error taxonomy

pub mod config;
pub mod error;
pub mod landmark;
pub mod sample;
pub mod signal;
pub mod summary;
pub mod time;

pub use config::*;
pub use error::*;
pub use landmark::*;
pub use sample::*;
pub use signal::*;
pub use summary::*;
pub use time::*;
