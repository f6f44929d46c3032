//! Clinic registry and derived status models.

use serde::{Deserialize, Serialize};

use super::Coordinates;

/// Display name used when a clinic's doctor has no stored profile.
pub const NO_DOCTOR_ASSIGNED: &str = "No doctor assigned";

/// A clinic in the static registry.
///
/// The registry is seeded at start-up and never mutated at runtime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClinicRecord {
    /// Unique registry ID
    pub id: String,
    /// Clinic display name
    pub name: String,
    /// Email of the assigned doctor (foreign key into doctor profiles)
    pub doctor_email: String,
    /// Human-readable location label
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl ClinicRecord {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// The registry the app ships with.
pub fn default_registry() -> Vec<ClinicRecord> {
    vec![
        ClinicRecord {
            id: "1".into(),
            name: "Carmen Clinic".into(),
            doctor_email: "doctor1@clinic.com".into(),
            location: "Carmen, Cagayan de Oro".into(),
            latitude: 8.4542,
            longitude: 124.6319,
        },
        ClinicRecord {
            id: "2".into(),
            name: "Tablon Clinic".into(),
            doctor_email: "doctor2@clinic.com".into(),
            location: "Tablon, Cagayan de Oro".into(),
            latitude: 8.4600,
            longitude: 124.6340,
        },
    ]
}

/// Open/closed state derived from doctor presence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ClinicStatus {
    /// The assigned doctor has a stored profile
    Open,
    /// No profile for the assigned doctor
    Closed,
}

impl ClinicStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClinicStatus::Open => "Open",
            ClinicStatus::Closed => "Closed",
        }
    }
}

/// One row of an aggregation pass. Rebuilt from scratch on every pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClinicStatusEntry {
    pub clinic_name: String,
    /// Doctor display name, or [`NO_DOCTOR_ASSIGNED`]
    pub doctor: String,
    pub status: ClinicStatus,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl ClinicStatusEntry {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    pub fn is_open(&self) -> bool {
        self.status == ClinicStatus::Open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_ids_unique() {
        let registry = default_registry();
        let mut ids: Vec<_> = registry.iter().map(|c| c.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), registry.len());
    }

    #[test]
    fn test_registry_json_uses_camel_case() {
        let json = serde_json::to_string(&default_registry()[0]).unwrap();
        assert!(json.contains("\"doctorEmail\":\"doctor1@clinic.com\""));
    }
}
