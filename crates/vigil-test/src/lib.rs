//! Vigil Test - harness for the attention pipeline
//!
//! - [`faces`]: synthetic 468-point face meshes in known poses
//! - [`mocks`]: scripted camera, detector and reporter for the monitor
//! - [`simulator`]: deterministic session runs on a manual clock

pub mod faces;
pub mod mocks;
pub mod simulator;

pub use faces::*;
pub use mocks::*;
pub use simulator::*;
