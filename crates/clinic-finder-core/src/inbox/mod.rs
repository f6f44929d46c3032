//! SOS inbox.
//!
//! Live requests sit under one key per patient. A doctor acknowledges a
//! request ("mark handled"), which moves it to the end of that patient's fall
//! history:
//!
//! ```text
//!   patient files SOS ──► live inbox ──acknowledge──► fall history (append-only)
//!                          ▲      │
//!                          └──────┘ poll: full rescan every tick
//! ```

mod poller;

pub use poller::*;

use crate::config::{CoreConfig, DecodeErrorPolicy};
use crate::db::{DbResult, KeyValueStore, ReportRepository, SosRepository};
use crate::models::{FallTrendPoint, PatientSnapshot, SosRequest};

/// Reads and acknowledges SOS requests.
pub struct SosInbox<'a, S: KeyValueStore> {
    store: &'a S,
    policy: DecodeErrorPolicy,
    history_limit: usize,
}

impl<'a, S: KeyValueStore> SosInbox<'a, S> {
    pub fn new(store: &'a S, policy: DecodeErrorPolicy, history_limit: usize) -> Self {
        Self {
            store,
            policy,
            history_limit,
        }
    }

    pub fn from_config(store: &'a S, config: &CoreConfig) -> Self {
        Self::new(store, config.on_decode_error, config.history_limit)
    }

    fn live(&self) -> SosRepository<'a, S> {
        SosRepository::new(self.store)
    }

    fn reports(&self) -> ReportRepository<'a, S> {
        ReportRepository::new(self.store)
    }

    /// All live requests, newest first.
    ///
    /// Read-only. A request removed between the key scan and its read is simply
    /// missing from the result.
    pub fn list_live(&self) -> DbResult<Vec<SosRequest>> {
        let live = self.live();
        let mut requests = Vec::new();

        for patient in live.live_patients()? {
            if let Some(request) = self.policy.apply(live.get(&patient))?.flatten() {
                requests.push(request);
            }
        }

        // Stable sort: equal timestamps keep key order.
        requests.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(requests)
    }

    /// Mark a patient's live request handled.
    ///
    /// The request is appended to the patient's history and only then removed
    /// from the live inbox, both inside one store unit. The removal only
    /// happens if the live record is still the one that was appended, so a
    /// newer SOS filed in between survives. Returns the moved request, or
    /// `None` if there was nothing to acknowledge.
    pub fn acknowledge(&self, patient_email: &str) -> DbResult<Option<SosRequest>> {
        let result = self.store.atomically(|store| {
            let live = SosRepository::new(store);
            let Some((request, raw)) = live.get_with_raw(patient_email)? else {
                return Ok(None);
            };

            let history_len = ReportRepository::new(store).append(&request)?;
            let removed = live.remove_if_unchanged(patient_email, &raw)?;
            if !removed {
                tracing::warn!(
                    patient = %patient_email,
                    "Live request changed while acknowledging, keeping the newer one"
                );
            }

            tracing::info!(
                patient = %patient_email,
                history_len,
                "SOS request moved to fall history"
            );
            Ok(Some(request))
        });

        match self.policy.apply(result)?.flatten() {
            Some(request) => Ok(Some(request)),
            None => {
                tracing::debug!(patient = %patient_email, "Nothing to acknowledge");
                Ok(None)
            }
        }
    }

    /// The last `limit` history entries in append order (oldest of them first).
    pub fn recent_history(&self, patient_email: &str, limit: usize) -> DbResult<Vec<SosRequest>> {
        Ok(self
            .policy
            .apply(self.reports().recent(patient_email, limit))?
            .unwrap_or_default())
    }

    /// [`SosInbox::recent_history`] with the configured limit.
    pub fn default_recent_history(&self, patient_email: &str) -> DbResult<Vec<SosRequest>> {
        self.recent_history(patient_email, self.history_limit)
    }

    /// A live request's location plus the patient's recent history.
    ///
    /// `None` when the patient has no live request.
    pub fn patient_snapshot(&self, patient_email: &str) -> DbResult<Option<PatientSnapshot>> {
        let Some(request) = self.policy.apply(self.live().get(patient_email))?.flatten() else {
            return Ok(None);
        };

        Ok(Some(PatientSnapshot {
            location: request.coordinates(),
            recent_history: self.default_recent_history(patient_email)?,
            request,
        }))
    }

    /// Chart series for the patient's recent falls, oldest first.
    pub fn fall_trend(&self, patient_email: &str) -> DbResult<Vec<FallTrendPoint>> {
        Ok(self
            .default_recent_history(patient_email)?
            .iter()
            .map(FallTrendPoint::from)
            .collect())
    }
}
