//! Live SOS request repository.

use super::keys::{patient_from_sos_key, sos_key, SOS_PREFIX};
use super::{decode_record, DbResult, KeyValueStore};
use crate::models::SosRequest;

/// Live (unacknowledged) SOS requests, one per patient.
pub struct SosRepository<'a, S: KeyValueStore> {
    store: &'a S,
}

impl<'a, S: KeyValueStore> SosRepository<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// File a request, replacing any live request from the same patient.
    pub fn file(&self, request: &SosRequest) -> DbResult<()> {
        let json = serde_json::to_string(request)?;
        self.store.set(&sos_key(&request.patient_email), &json)
    }

    pub fn get(&self, patient_email: &str) -> DbResult<Option<SosRequest>> {
        Ok(self.get_with_raw(patient_email)?.map(|(request, _)| request))
    }

    /// Emails of every patient with a live request, in key order.
    pub fn live_patients(&self) -> DbResult<Vec<String>> {
        Ok(self
            .store
            .keys_with_prefix(SOS_PREFIX)?
            .iter()
            .filter_map(|key| patient_from_sos_key(key))
            .map(str::to_string)
            .collect())
    }

    pub fn remove(&self, patient_email: &str) -> DbResult<bool> {
        self.store.remove(&sos_key(patient_email))
    }

    /// Decoded request plus the exact stored text, for compare-and-delete.
    pub(crate) fn get_with_raw(
        &self,
        patient_email: &str,
    ) -> DbResult<Option<(SosRequest, String)>> {
        let key = sos_key(patient_email);
        match self.store.get(&key)? {
            Some(raw) => {
                let request = decode_record(&key, &raw)?;
                Ok(Some((request, raw)))
            }
            None => Ok(None),
        }
    }

    /// Remove the live request only if it is still the one read as `raw`.
    pub(crate) fn remove_if_unchanged(&self, patient_email: &str, raw: &str) -> DbResult<bool> {
        self.store.remove_if(&sos_key(patient_email), raw)
    }
}
