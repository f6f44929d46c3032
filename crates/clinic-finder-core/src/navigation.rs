//! Screen-to-screen parameters.
//!
//! The router passes a flat map of strings between screens, so numbers travel
//! as text and must be parsed and checked on arrival.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::models::{ClinicStatusEntry, Coordinates};

/// Navigation parameter errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NavigationError {
    #[error("Missing parameter: {0}")]
    Missing(&'static str),

    #[error("Invalid parameter {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

pub type NavigationResult<T> = Result<T, NavigationError>;

/// Parameters of the clinic route screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ClinicRouteParams {
    pub clinic: Coordinates,
    pub name: String,
    /// Location label of the clinic
    pub location: String,
    pub patient: Coordinates,
}

impl ClinicRouteParams {
    /// Route from `patient` to the clinic of a status entry.
    pub fn for_entry(entry: &ClinicStatusEntry, patient: Coordinates) -> Self {
        Self {
            clinic: entry.coordinates(),
            name: entry.clinic_name.clone(),
            location: entry.location.clone(),
            patient,
        }
    }

    /// Flatten into router parameters.
    pub fn to_params(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert("latitude".to_string(), self.clinic.latitude.to_string());
        params.insert("longitude".to_string(), self.clinic.longitude.to_string());
        params.insert("name".to_string(), self.name.clone());
        params.insert("location".to_string(), self.location.clone());
        params.insert("patientLat".to_string(), self.patient.latitude.to_string());
        params.insert("patientLon".to_string(), self.patient.longitude.to_string());
        params
    }

    /// Parse router parameters, rejecting missing fields and bad coordinates.
    pub fn from_params(params: &BTreeMap<String, String>) -> NavigationResult<Self> {
        let clinic = Coordinates::new(
            number(params, "latitude")?,
            number(params, "longitude")?,
        );
        let patient = Coordinates::new(
            number(params, "patientLat")?,
            number(params, "patientLon")?,
        );

        for (name, point) in [("latitude", clinic), ("patientLat", patient)] {
            if !point.is_valid() {
                return Err(NavigationError::Invalid {
                    name,
                    value: format!("{}, {}", point.latitude, point.longitude),
                });
            }
        }

        Ok(Self {
            clinic,
            name: text(params, "name")?.to_string(),
            location: text(params, "location")?.to_string(),
            patient,
        })
    }
}

fn text<'p>(params: &'p BTreeMap<String, String>, name: &'static str) -> NavigationResult<&'p str> {
    params
        .get(name)
        .map(String::as_str)
        .ok_or(NavigationError::Missing(name))
}

fn number(params: &BTreeMap<String, String>, name: &'static str) -> NavigationResult<f64> {
    let raw = text(params, name)?;
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(NavigationError::Invalid {
            name,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClinicStatus;

    fn entry() -> ClinicStatusEntry {
        ClinicStatusEntry {
            clinic_name: "Carmen Clinic".into(),
            doctor: "Jane Doe".into(),
            status: ClinicStatus::Open,
            location: "Carmen, Cagayan de Oro".into(),
            latitude: 8.4542,
            longitude: 124.6319,
        }
    }

    #[test]
    fn test_params_survive_the_router() {
        let params = ClinicRouteParams::for_entry(&entry(), Coordinates::new(8.47, 124.64));
        let flat = params.to_params();
        assert_eq!(flat.get("patientLat"), Some(&"8.47".to_string()));

        assert_eq!(ClinicRouteParams::from_params(&flat).unwrap(), params);
    }

    #[test]
    fn test_missing_parameter() {
        let mut flat = ClinicRouteParams::for_entry(&entry(), Coordinates::new(8.47, 124.64))
            .to_params();
        flat.remove("name");
        assert_eq!(
            ClinicRouteParams::from_params(&flat),
            Err(NavigationError::Missing("name"))
        );
    }

    #[test]
    fn test_non_numeric_and_non_finite() {
        let base = ClinicRouteParams::for_entry(&entry(), Coordinates::new(8.47, 124.64))
            .to_params();

        let mut flat = base.clone();
        flat.insert("latitude".into(), "north".into());
        assert!(matches!(
            ClinicRouteParams::from_params(&flat),
            Err(NavigationError::Invalid { name: "latitude", .. })
        ));

        let mut flat = base.clone();
        flat.insert("patientLon".into(), "NaN".into());
        assert!(ClinicRouteParams::from_params(&flat).is_err());

        let mut flat = base;
        flat.insert("patientLat".into(), "95".into());
        assert!(matches!(
            ClinicRouteParams::from_params(&flat),
            Err(NavigationError::Invalid { name: "patientLat", .. })
        ));
    }
}
