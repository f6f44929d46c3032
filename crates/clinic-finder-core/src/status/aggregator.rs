//! Status aggregation over the clinic registry.

use std::collections::HashMap;

use crate::config::DecodeErrorPolicy;
use crate::db::{DbResult, DoctorRepository, KeyValueStore};
use crate::models::{
    ClinicRecord, ClinicStatus, ClinicStatusEntry, DoctorProfile, NO_DOCTOR_ASSIGNED,
};

/// Join the registry against a doctor lookup.
///
/// One entry per clinic, in registry order. A clinic is open exactly when its
/// doctor resolves; an unresolved doctor is not an error.
pub fn compute_clinic_status<F>(registry: &[ClinicRecord], mut lookup_doctor: F) -> Vec<ClinicStatusEntry>
where
    F: FnMut(&str) -> Option<DoctorProfile>,
{
    registry
        .iter()
        .map(|clinic| {
            let (doctor, status) = match lookup_doctor(&clinic.doctor_email) {
                Some(profile) => (profile.display_name(), ClinicStatus::Open),
                None => (NO_DOCTOR_ASSIGNED.to_string(), ClinicStatus::Closed),
            };

            ClinicStatusEntry {
                clinic_name: clinic.name.clone(),
                doctor,
                status,
                location: clinic.location.clone(),
                latitude: clinic.latitude,
                longitude: clinic.longitude,
            }
        })
        .collect()
}

/// Runs aggregation passes against the device store.
///
/// Nothing is cached: every [`StatusAggregator::refresh`] reads the store again
/// and returns a fresh list.
pub struct StatusAggregator<'a, S: KeyValueStore> {
    doctors: DoctorRepository<'a, S>,
    registry: &'a [ClinicRecord],
    policy: DecodeErrorPolicy,
}

impl<'a, S: KeyValueStore> StatusAggregator<'a, S> {
    pub fn new(store: &'a S, registry: &'a [ClinicRecord], policy: DecodeErrorPolicy) -> Self {
        Self {
            doctors: DoctorRepository::new(store),
            registry,
            policy,
        }
    }

    /// One aggregation pass.
    ///
    /// A corrupt doctor profile counts as absent under the skip policy and
    /// fails the pass under abort.
    pub fn refresh(&self) -> DbResult<Vec<ClinicStatusEntry>> {
        let mut profiles: HashMap<&str, Option<DoctorProfile>> = HashMap::new();
        for clinic in self.registry {
            let email = clinic.doctor_email.as_str();
            if profiles.contains_key(email) {
                continue;
            }
            let profile = self.policy.apply(self.doctors.get(email))?.flatten();
            profiles.insert(email, profile);
        }

        let entries = compute_clinic_status(self.registry, |email| {
            profiles.get(email).cloned().flatten()
        });

        tracing::debug!(
            clinics = entries.len(),
            open = entries.iter().filter(|e| e.is_open()).count(),
            "Clinic status refreshed"
        );
        Ok(entries)
    }
}
