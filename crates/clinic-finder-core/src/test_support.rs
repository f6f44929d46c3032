//! Fixtures shared by unit tests.

use chrono::{TimeZone, Utc};

use crate::models::{ClinicRecord, DoctorProfile, SosRequest};

/// A request filed `minute` minutes past 08:00 on 2025-03-02.
pub fn sos_at(patient_email: &str, minute: u32) -> SosRequest {
    SosRequest {
        patient_email: patient_email.into(),
        patient_name: format!("Patient {}", patient_email),
        age: 70,
        gender: "Female".into(),
        condition: "Fall".into(),
        clinic: "Carmen Clinic".into(),
        timestamp: Utc.with_ymd_and_hms(2025, 3, 2, 8, minute, 0).unwrap(),
        latitude: 8.47,
        longitude: 124.63,
        severity: None,
    }
}

pub fn doctor(first: &str, last: &str, email: &str) -> DoctorProfile {
    DoctorProfile::new(first.into(), last.into(), email.into(), "Doctor".into())
}

pub fn clinic(id: &str, name: &str, doctor_email: &str) -> ClinicRecord {
    ClinicRecord {
        id: id.into(),
        name: name.into(),
        doctor_email: doctor_email.into(),
        location: format!("{} area", name),
        latitude: 8.45,
        longitude: 124.63,
    }
}
