//! Doctor profile model.

use serde::{Deserialize, Serialize};

/// A doctor's stored profile.
///
/// A stored profile for a clinic's doctor email is what marks the clinic open.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DoctorProfile {
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub last_name: String,
    /// Login email, also the lookup key
    pub email: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinic_name: Option<String>,
    /// URI of the profile picture
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

impl DoctorProfile {
    /// Create a profile with the required fields.
    pub fn new(first_name: String, last_name: String, email: String, role: String) -> Self {
        Self {
            first_name,
            middle_name: None,
            last_name,
            email,
            role,
            clinic_name: None,
            profile_picture: None,
        }
    }

    /// "First Middle Last", single-spaced, with an absent or blank middle name dropped.
    pub fn display_name(&self) -> String {
        let middle = self.middle_name.as_deref().unwrap_or("");
        [self.first_name.as_str(), middle, self.last_name.as_str()]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jane() -> DoctorProfile {
        DoctorProfile::new("Jane".into(), "Doe".into(), "jane@clinic.com".into(), "Doctor".into())
    }

    #[test]
    fn test_display_name_without_middle() {
        assert_eq!(jane().display_name(), "Jane Doe");
    }

    #[test]
    fn test_display_name_with_middle() {
        let mut doctor = jane();
        doctor.middle_name = Some("Q".into());
        assert_eq!(doctor.display_name(), "Jane Q Doe");
    }

    #[test]
    fn test_display_name_blank_middle() {
        let mut doctor = jane();
        doctor.middle_name = Some("  ".into());
        assert_eq!(doctor.display_name(), "Jane Doe");
    }

    #[test]
    fn test_decode_stored_profile() {
        let json = r#"{"firstName":"Ana","lastName":"Cruz","email":"a@c.com","role":"Doctor"}"#;
        let doctor: DoctorProfile = serde_json::from_str(json).unwrap();
        assert_eq!(doctor.middle_name, None);
        assert_eq!(doctor.display_name(), "Ana Cruz");
    }
}
