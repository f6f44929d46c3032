//! Clinic status: who is on duty, and whether the doors are open.
//!
//! - [`aggregator`]: open/closed per clinic, derived from doctor presence
//! - [`hours`]: open/closing-soon/closed from the local clock

mod aggregator;
mod hours;

pub use aggregator::*;
pub use hours::*;
