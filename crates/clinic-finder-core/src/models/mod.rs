//! Domain models for the clinic-finder core.

mod clinic;
mod coordinates;
mod doctor;
mod sos;

pub use clinic::*;
pub use coordinates::*;
pub use doctor::*;
pub use sos::*;
