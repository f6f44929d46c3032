//! Clinic-Finder Core Library
//!
//! Local-first core of the clinic-finder app: clinic open/closed status, the
//! doctor's SOS inbox and each patient's fall history.
//!
//! # Architecture
//!
//! ```text
//!                       ┌──────────────────────────────┐
//!                       │   device key-value store     │
//!                       │  user:*  sos:*  report:*     │
//!                       └──────┬───────────────┬───────┘
//!                              │               │
//!               DoctorRepository           SosRepository / ReportRepository
//!                              │               │
//!     clinic registry ──► StatusAggregator   SosInbox ──acknowledge──► history
//!                              │               │
//!                     clinic status list    live inbox (polled)
//! ```
//!
//! # Core Principle
//!
//! **Status is derived, never stored.** A clinic is open exactly when its
//! doctor has a stored profile, recomputed on every pass.
//!
//! # Modules
//!
//! - [`db`]: SQLite-backed key-value store and typed repositories
//! - [`models`]: Domain types (ClinicRecord, DoctorProfile, SosRequest, etc.)
//! - [`status`]: Clinic status aggregation and opening hours
//! - [`inbox`]: SOS inbox, acknowledgement and fall history
//! - [`geo`]: Haversine distance, location and directions collaborators
//! - [`poll`]: Cancellable recurring tasks
//! - [`config`]: JSON configuration
//! - [`navigation`]: Screen parameter encoding

pub mod config;
pub mod db;
pub mod geo;
pub mod inbox;
pub mod logging;
pub mod models;
pub mod navigation;
pub mod poll;
pub mod status;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::{CoreConfig, DecodeErrorPolicy};
pub use db::{Database, KeyValueStore};
pub use geo::{distance_km, haversine_km};
pub use inbox::SosInbox;
pub use models::{
    ClinicRecord, ClinicStatus, ClinicStatusEntry, Coordinates, DoctorProfile, FallTrendPoint,
    SosRequest,
};
pub use poll::{PollHandle, Poller};
pub use status::{compute_clinic_status, HoursStatus, OpeningHours, StatusAggregator};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use db::{DoctorRepository, SessionRepository, SosRepository};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum ClinicFinderError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Corrupt record: {0}")]
    DecodeFailure(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Location permission denied")]
    PermissionDenied,

    #[error("External service error: {0}")]
    ExternalService(String),
}

impl From<db::DbError> for ClinicFinderError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::Decode { .. } => ClinicFinderError::DecodeFailure(e.to_string()),
            other => ClinicFinderError::Storage(other.to_string()),
        }
    }
}

impl From<config::ConfigError> for ClinicFinderError {
    fn from(e: config::ConfigError) -> Self {
        ClinicFinderError::InvalidInput(e.to_string())
    }
}

impl From<geo::GeoError> for ClinicFinderError {
    fn from(e: geo::GeoError) -> Self {
        match e {
            geo::GeoError::PermissionDenied => ClinicFinderError::PermissionDenied,
            other => ClinicFinderError::ExternalService(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ClinicFinderError {
    fn from(e: serde_json::Error) -> Self {
        ClinicFinderError::InvalidInput(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for ClinicFinderError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ClinicFinderError::Storage(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create the device store at the given path.
///
/// `config_json` is a [`CoreConfig`] document; `None` uses the defaults.
#[uniffi::export]
pub fn open_database(
    path: String,
    config_json: Option<String>,
) -> Result<Arc<ClinicFinderCore>, ClinicFinderError> {
    let config = match config_json {
        Some(json) => CoreConfig::from_json_str(&json)?,
        None => CoreConfig::default(),
    };
    let db = Database::open(&path)?;
    Ok(Arc::new(ClinicFinderCore::new(db, config)))
}

/// Create an in-memory store with default configuration (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<ClinicFinderCore>, ClinicFinderError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(ClinicFinderCore::new(db, CoreConfig::default())))
}

/// Great-circle distance in kilometres.
#[uniffi::export]
pub fn distance_between(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    haversine_km(lat1, lon1, lat2, lon2)
}

/// Install the log subscriber. Returns false if one was already installed.
#[uniffi::export]
pub fn configure_logging(filter: String) -> bool {
    logging::init_logging(&filter)
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe store wrapper for FFI.
#[derive(uniffi::Object)]
pub struct ClinicFinderCore {
    db: Arc<Mutex<Database>>,
    config: CoreConfig,
}

impl ClinicFinderCore {
    pub fn new(db: Database, config: CoreConfig) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            config,
        }
    }

    /// Shared store handle, for pollers.
    pub fn store(&self) -> Arc<Mutex<Database>> {
        Arc::clone(&self.db)
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Rescan the live inbox on the configured interval.
    pub fn watch_inbox<F>(&self, on_refresh: F) -> PollHandle
    where
        F: FnMut(Vec<SosRequest>) + Send + 'static,
    {
        inbox::spawn_inbox_poller(
            self.store(),
            self.config.on_decode_error,
            self.config.poll.sos_inbox(),
            on_refresh,
        )
    }

    /// Rebuild a clinic's hours card on the configured clock interval.
    pub fn watch_clock<F>(
        &self,
        clinic: Coordinates,
        user: Option<Coordinates>,
        on_tick: F,
    ) -> PollHandle
    where
        F: FnMut(status::HoursReport) + Send + 'static,
    {
        self.config
            .hours
            .spawn_clock(self.config.poll.clock(), clinic, user, on_tick)
    }

    /// Watch the device position with the configured watch options.
    ///
    /// `None` without location permission.
    pub fn watch_location<P, F>(
        &self,
        location: &geo::LocationService<P>,
        on_update: F,
    ) -> Option<PollHandle>
    where
        P: geo::LocationProvider + 'static,
        F: FnMut(Coordinates) + Send + 'static,
    {
        location.watch(&self.config.location_watch, on_update)
    }
}

#[uniffi::export]
impl ClinicFinderCore {
    // =========================================================================
    // Clinic Status
    // =========================================================================

    /// One aggregation pass over the clinic registry.
    pub fn clinic_statuses(&self) -> Result<Vec<FfiClinicStatus>, ClinicFinderError> {
        let db = self.db.lock()?;
        let aggregator =
            StatusAggregator::new(&*db, &self.config.clinics, self.config.on_decode_error);
        let entries = aggregator.refresh()?;
        Ok(entries.into_iter().map(|e| e.into()).collect())
    }

    /// Opening-hours card for a clinic at the given local hour.
    pub fn clinic_hours(
        &self,
        hour: u32,
        clinic_latitude: f64,
        clinic_longitude: f64,
        user_latitude: Option<f64>,
        user_longitude: Option<f64>,
    ) -> FfiHoursStatus {
        let hours = &self.config.hours;
        let status = hours.status_at_hour(hour);
        let clinic = Coordinates::new(clinic_latitude, clinic_longitude);
        let distance_km = match (user_latitude, user_longitude) {
            (Some(lat), Some(lon)) => Some(distance_km(Coordinates::new(lat, lon), clinic)),
            _ => None,
        };

        FfiHoursStatus {
            label: status.label().to_string(),
            message: hours.message(status),
            distance_km,
        }
    }

    // =========================================================================
    // SOS Inbox
    // =========================================================================

    /// Live SOS requests, newest first.
    pub fn list_live_sos(&self) -> Result<Vec<FfiSosRequest>, ClinicFinderError> {
        let db = self.db.lock()?;
        let requests = SosInbox::from_config(&*db, &self.config).list_live()?;
        Ok(requests.into_iter().map(|r| r.into()).collect())
    }

    /// Mark a patient's SOS handled. Returns the moved request, if there was one.
    pub fn acknowledge_sos(
        &self,
        patient_email: String,
    ) -> Result<Option<FfiSosRequest>, ClinicFinderError> {
        let db = self.db.lock()?;
        let moved = SosInbox::from_config(&*db, &self.config).acknowledge(&patient_email)?;
        Ok(moved.map(|r| r.into()))
    }

    /// File (or replace) a patient's live SOS request.
    pub fn file_sos(&self, request: FfiSosRequest) -> Result<(), ClinicFinderError> {
        let request = SosRequest::try_from(request)?;
        let db = self.db.lock()?;
        SosRepository::new(&*db).file(&request)?;
        Ok(())
    }

    /// Last `limit` handled requests (configured limit if `None`), oldest first.
    pub fn recent_history(
        &self,
        patient_email: String,
        limit: Option<u32>,
    ) -> Result<Vec<FfiSosRequest>, ClinicFinderError> {
        let db = self.db.lock()?;
        let inbox = SosInbox::from_config(&*db, &self.config);
        let history = match limit {
            Some(limit) => inbox.recent_history(&patient_email, limit as usize)?,
            None => inbox.default_recent_history(&patient_email)?,
        };
        Ok(history.into_iter().map(|r| r.into()).collect())
    }

    /// Fall trend chart series for a patient.
    pub fn fall_trend(
        &self,
        patient_email: String,
    ) -> Result<Vec<FfiFallTrendPoint>, ClinicFinderError> {
        let db = self.db.lock()?;
        let points = SosInbox::from_config(&*db, &self.config).fall_trend(&patient_email)?;
        Ok(points.into_iter().map(|p| p.into()).collect())
    }

    /// A live request's location plus recent history, for the patient view.
    pub fn patient_snapshot(
        &self,
        patient_email: String,
    ) -> Result<Option<FfiPatientSnapshot>, ClinicFinderError> {
        let db = self.db.lock()?;
        let snapshot = SosInbox::from_config(&*db, &self.config).patient_snapshot(&patient_email)?;
        Ok(snapshot.map(|s| s.into()))
    }

    // =========================================================================
    // Doctors & Session
    // =========================================================================

    pub fn save_doctor_profile(&self, profile: FfiDoctorProfile) -> Result<(), ClinicFinderError> {
        let db = self.db.lock()?;
        DoctorRepository::new(&*db).save(&profile.into())?;
        Ok(())
    }

    pub fn get_doctor_profile(
        &self,
        email: String,
    ) -> Result<Option<FfiDoctorProfile>, ClinicFinderError> {
        let db = self.db.lock()?;
        let profile = DoctorRepository::new(&*db).get(&email)?;
        Ok(profile.map(|p| p.into()))
    }

    /// Start a session for a doctor with a stored profile.
    pub fn login(&self, email: String) -> Result<FfiDoctorProfile, ClinicFinderError> {
        let db = self.db.lock()?;
        let profile = DoctorRepository::new(&*db)
            .get(&email)?
            .ok_or_else(|| ClinicFinderError::NotFound(format!("doctor {}", email)))?;
        SessionRepository::new(&*db).login(&email)?;
        tracing::info!(doctor = %email, "Doctor logged in");
        Ok(profile.into())
    }

    pub fn logout(&self) -> Result<(), ClinicFinderError> {
        let db = self.db.lock()?;
        if SessionRepository::new(&*db).logout()? {
            tracing::info!("Doctor logged out");
        }
        Ok(())
    }

    pub fn current_doctor(&self) -> Result<Option<FfiDoctorProfile>, ClinicFinderError> {
        let db = self.db.lock()?;
        let profile = SessionRepository::new(&*db).current_doctor()?;
        Ok(profile.map(|p| p.into()))
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe clinic status entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiClinicStatus {
    pub clinic_name: String,
    pub doctor: String,
    pub is_open: bool,
    pub status: String,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<ClinicStatusEntry> for FfiClinicStatus {
    fn from(entry: ClinicStatusEntry) -> Self {
        Self {
            is_open: entry.is_open(),
            status: entry.status.as_str().to_string(),
            clinic_name: entry.clinic_name,
            doctor: entry.doctor,
            location: entry.location,
            latitude: entry.latitude,
            longitude: entry.longitude,
        }
    }
}

/// FFI-safe opening-hours card.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiHoursStatus {
    pub label: String,
    pub message: String,
    pub distance_km: Option<f64>,
}

/// FFI-safe SOS request.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSosRequest {
    pub patient_email: String,
    pub patient_name: String,
    pub age: u32,
    pub gender: String,
    pub condition: String,
    pub clinic: String,
    /// RFC 3339
    pub timestamp: String,
    pub latitude: f64,
    pub longitude: f64,
    pub severity: Option<String>,
}

impl From<SosRequest> for FfiSosRequest {
    fn from(request: SosRequest) -> Self {
        Self {
            patient_email: request.patient_email,
            patient_name: request.patient_name,
            age: request.age,
            gender: request.gender,
            condition: request.condition,
            clinic: request.clinic,
            timestamp: request.timestamp.to_rfc3339(),
            latitude: request.latitude,
            longitude: request.longitude,
            severity: request.severity,
        }
    }
}

impl TryFrom<FfiSosRequest> for SosRequest {
    type Error = ClinicFinderError;

    fn try_from(request: FfiSosRequest) -> Result<Self, Self::Error> {
        let timestamp = chrono::DateTime::parse_from_rfc3339(&request.timestamp)
            .map_err(|e| {
                ClinicFinderError::InvalidInput(format!(
                    "timestamp {:?}: {}",
                    request.timestamp, e
                ))
            })?
            .with_timezone(&chrono::Utc);

        if !Coordinates::new(request.latitude, request.longitude).is_valid() {
            return Err(ClinicFinderError::InvalidInput(format!(
                "coordinates {}, {}",
                request.latitude, request.longitude
            )));
        }

        Ok(SosRequest {
            patient_email: request.patient_email,
            patient_name: request.patient_name,
            age: request.age,
            gender: request.gender,
            condition: request.condition,
            clinic: request.clinic,
            timestamp,
            latitude: request.latitude,
            longitude: request.longitude,
            severity: request.severity,
        })
    }
}

/// FFI-safe doctor profile.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDoctorProfile {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub email: String,
    pub role: String,
    pub clinic_name: Option<String>,
    pub profile_picture: Option<String>,
    /// Read-only on the way out; ignored on the way in
    pub display_name: String,
}

impl From<DoctorProfile> for FfiDoctorProfile {
    fn from(profile: DoctorProfile) -> Self {
        Self {
            display_name: profile.display_name(),
            first_name: profile.first_name,
            middle_name: profile.middle_name,
            last_name: profile.last_name,
            email: profile.email,
            role: profile.role,
            clinic_name: profile.clinic_name,
            profile_picture: profile.profile_picture,
        }
    }
}

impl From<FfiDoctorProfile> for DoctorProfile {
    fn from(profile: FfiDoctorProfile) -> Self {
        DoctorProfile {
            first_name: profile.first_name,
            middle_name: profile.middle_name,
            last_name: profile.last_name,
            email: profile.email,
            role: profile.role,
            clinic_name: profile.clinic_name,
            profile_picture: profile.profile_picture,
        }
    }
}

/// FFI-safe patient view.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientSnapshot {
    pub request: FfiSosRequest,
    pub latitude: f64,
    pub longitude: f64,
    /// Oldest first
    pub recent_history: Vec<FfiSosRequest>,
}

impl From<models::PatientSnapshot> for FfiPatientSnapshot {
    fn from(snapshot: models::PatientSnapshot) -> Self {
        Self {
            latitude: snapshot.location.latitude,
            longitude: snapshot.location.longitude,
            request: snapshot.request.into(),
            recent_history: snapshot.recent_history.into_iter().map(|r| r.into()).collect(),
        }
    }
}

/// FFI-safe fall trend point.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFallTrendPoint {
    pub label: String,
    pub score: u8,
}

impl From<FallTrendPoint> for FfiFallTrendPoint {
    fn from(point: FallTrendPoint) -> Self {
        Self {
            label: point.label,
            score: point.score,
        }
    }
}
