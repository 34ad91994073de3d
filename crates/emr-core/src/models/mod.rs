//! Domain models for the EMR core.

mod attendance;
mod bed;
mod common;
mod patient;
mod pharmacy;
mod staff;

pub use attendance::*;
pub use bed::*;
pub use common::*;
pub use patient::*;
pub use pharmacy::*;
pub use staff::*;
