//! Fall history (report log) repository.

use super::keys::report_key;
use super::{decode_record, DbResult, KeyValueStore};
use crate::models::SosRequest;

/// Per-patient, append-only history of handled SOS requests.
pub struct ReportRepository<'a, S: KeyValueStore> {
    store: &'a S,
}

impl<'a, S: KeyValueStore> ReportRepository<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Full history in append order. A patient with no history gets an empty log.
    pub fn load(&self, patient_email: &str) -> DbResult<Vec<SosRequest>> {
        let key = report_key(patient_email);
        match self.store.get(&key)? {
            Some(raw) => decode_record(&key, &raw),
            None => Ok(Vec::new()),
        }
    }

    /// Append to the end of the patient's history. Returns the new length.
    ///
    /// Fails without writing if the existing log cannot be decoded, so a
    /// corrupt log is never replaced by a shorter one.
    pub fn append(&self, request: &SosRequest) -> DbResult<usize> {
        let mut history = self.load(&request.patient_email)?;
        history.push(request.clone());
        let json = serde_json::to_string(&history)?;
        self.store.set(&report_key(&request.patient_email), &json)?;
        Ok(history.len())
    }

    /// The last `limit` entries, in append order.
    pub fn recent(&self, patient_email: &str, limit: usize) -> DbResult<Vec<SosRequest>> {
        let mut history = self.load(patient_email)?;
        let start = history.len().saturating_sub(limit);
        Ok(history.split_off(start))
    }
}
