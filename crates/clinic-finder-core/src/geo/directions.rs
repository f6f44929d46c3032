//! Driving directions to a clinic.

use super::{GeoError, GeoResult, LocationProvider, LocationService};
use crate::models::Coordinates;

/// Clinic position used when a location label is not known.
pub const FALLBACK_CLINIC_COORDINATES: Coordinates = Coordinates {
    latitude: 8.4822,
    longitude: 124.6477,
};

/// A route returned by the routing service.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSummary {
    /// Route geometry, origin first
    pub polyline: Vec<Coordinates>,
    /// Driving distance
    pub distance_km: f64,
}

/// Third-party routing service.
pub trait DirectionsProvider {
    fn route(&self, origin: Coordinates, destination: Coordinates) -> GeoResult<RouteSummary>;
}

/// Ask for a route, treating any failure as "no route".
///
/// A missing credential, an unreachable service and a nonsensical distance
/// all end the same way: the route overlay and distance readout are omitted.
pub fn route_or_none<D: DirectionsProvider + ?Sized>(
    provider: &D,
    origin: Coordinates,
    destination: Coordinates,
) -> Option<RouteSummary> {
    let result = provider.route(origin, destination).and_then(|route| {
        if route.distance_km.is_finite() && route.distance_km >= 0.0 {
            Ok(route)
        } else {
            Err(GeoError::ExternalService(format!(
                "invalid route distance {}",
                route.distance_km
            )))
        }
    });

    match result {
        Ok(route) => Some(route),
        Err(e) => {
            tracing::warn!(error = %e, "Directions unavailable, omitting route");
            None
        }
    }
}

/// Destination pin for a clinic location label.
pub fn clinic_coordinates_for_label(label: &str) -> Coordinates {
    match label {
        "Carmen, Cagayan de Oro" => Coordinates::new(8.4893, 124.6319),
        "Tablon, Cagayan de Oro" => Coordinates::new(8.5215, 124.7531),
        _ => FALLBACK_CLINIC_COORDINATES,
    }
}

/// What the route screen shows.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteView {
    pub clinic: Coordinates,
    /// Device position, when permission and a fix are available
    pub user: Option<Coordinates>,
    /// Present only when the user position is known and routing succeeded
    pub route: Option<RouteSummary>,
}

impl RouteView {
    pub fn distance_km(&self) -> Option<f64> {
        self.route.as_ref().map(|route| route.distance_km)
    }
}

/// Build the route screen for a clinic location label.
pub fn plan_route_to_clinic<P, D>(
    location: &LocationService<P>,
    directions: &D,
    clinic_label: &str,
) -> RouteView
where
    P: LocationProvider,
    D: DirectionsProvider + ?Sized,
{
    let clinic = clinic_coordinates_for_label(clinic_label);
    let user = location.current_position();
    let route = user.and_then(|origin| route_or_none(directions, origin, clinic));

    RouteView {
        clinic,
        user,
        route,
    }
}
