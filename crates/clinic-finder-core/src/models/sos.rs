//! SOS request and fall history models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Coordinates;

/// An emergency request filed by a patient.
///
/// At most one live request exists per patient; filing again overwrites it.
/// Once acknowledged, the request is appended to the patient's fall history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SosRequest {
    /// Patient email (the request's key)
    pub patient_email: String,
    pub patient_name: String,
    pub age: u32,
    pub gender: String,
    /// Free-text condition reported by the patient
    pub condition: String,
    /// Label of the clinic the request is routed to
    pub clinic: String,
    /// When the request was filed
    pub timestamp: DateTime<Utc>,
    /// Patient position at the time of the request
    pub latitude: f64,
    pub longitude: f64,
    /// Fall severity label ("High", "Medium", ...), if the patient flow recorded one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

impl SosRequest {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    pub fn fall_severity(&self) -> FallSeverity {
        FallSeverity::from_label(self.severity.as_deref())
    }
}

/// Severity bucket used for the fall trend chart.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum FallSeverity {
    Low,
    Medium,
    High,
}

impl FallSeverity {
    /// Unknown or missing labels count as low.
    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            Some("High") => FallSeverity::High,
            Some("Medium") => FallSeverity::Medium,
            _ => FallSeverity::Low,
        }
    }

    pub fn score(&self) -> u8 {
        match self {
            FallSeverity::High => 3,
            FallSeverity::Medium => 2,
            FallSeverity::Low => 1,
        }
    }
}

/// One point on a patient's fall trend chart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FallTrendPoint {
    /// Calendar date of the fall (YYYY-MM-DD)
    pub label: String,
    pub severity: FallSeverity,
    pub score: u8,
}

impl From<&SosRequest> for FallTrendPoint {
    fn from(request: &SosRequest) -> Self {
        let severity = request.fall_severity();
        Self {
            label: request.timestamp.format("%Y-%m-%d").to_string(),
            severity,
            score: severity.score(),
        }
    }
}

/// A live request together with the patient's recent history.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientSnapshot {
    pub request: SosRequest,
    pub location: Coordinates,
    /// Oldest first
    pub recent_history: Vec<SosRequest>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORED: &str = r#"{
        "patientEmail": "pat@mail.com",
        "patientName": "Pat Santos",
        "age": 71,
        "gender": "Female",
        "condition": "Fell in the kitchen",
        "clinic": "Carmen Clinic",
        "timestamp": "2025-03-02T08:15:00.000Z",
        "latitude": 8.47,
        "longitude": 124.63
    }"#;

    #[test]
    fn test_decode_stored_request() {
        let request: SosRequest = serde_json::from_str(STORED).unwrap();
        assert_eq!(request.patient_email, "pat@mail.com");
        assert_eq!(request.age, 71);
        assert_eq!(request.severity, None);
        assert_eq!(request.coordinates(), Coordinates::new(8.47, 124.63));
    }

    #[test]
    fn test_missing_field_fails_decode() {
        let result: Result<SosRequest, _> =
            serde_json::from_str(r#"{"patientEmail":"pat@mail.com"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_severity_scores() {
        assert_eq!(FallSeverity::from_label(Some("High")).score(), 3);
        assert_eq!(FallSeverity::from_label(Some("Medium")).score(), 2);
        assert_eq!(FallSeverity::from_label(Some("Low")).score(), 1);
        assert_eq!(FallSeverity::from_label(Some("high")).score(), 1);
        assert_eq!(FallSeverity::from_label(None).score(), 1);
    }

    #[test]
    fn test_trend_point_from_request() {
        let mut request: SosRequest = serde_json::from_str(STORED).unwrap();
        request.severity = Some("Medium".into());
        let point = FallTrendPoint::from(&request);
        assert_eq!(point.label, "2025-03-02");
        assert_eq!(point.severity, FallSeverity::Medium);
        assert_eq!(point.score, 2);
    }
}
