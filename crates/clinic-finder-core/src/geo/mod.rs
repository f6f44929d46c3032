//! Distance math and the location/directions collaborators.
//!
//! The platform supplies position fixes and routes; this module decides how
//! their failures degrade. Nothing here is fatal: a denied permission or an
//! unreachable routing service only removes the dependent readout.

mod directions;
mod distance;
mod location;

pub use directions::*;
pub use distance::*;
pub use location::*;

use thiserror::Error;

/// Geo errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeoError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location unavailable: {0}")]
    Unavailable(String),

    #[error("Directions credential missing")]
    MissingCredential,

    #[error("External service failure: {0}")]
    ExternalService(String),
}

pub type GeoResult<T> = Result<T, GeoError>;

#[cfg(test)]
pub(crate) use location::stub;
