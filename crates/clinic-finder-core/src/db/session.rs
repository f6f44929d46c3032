//! Logged-in doctor session.

use super::keys::SESSION_KEY;
use super::{DbResult, DoctorRepository, KeyValueStore};
use crate::models::DoctorProfile;

/// Pointer to the doctor currently logged in on this device.
pub struct SessionRepository<'a, S: KeyValueStore> {
    store: &'a S,
}

impl<'a, S: KeyValueStore> SessionRepository<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn login(&self, email: &str) -> DbResult<()> {
        self.store.set(SESSION_KEY, email)
    }

    /// Clear the session. Returns whether anyone was logged in.
    pub fn logout(&self) -> DbResult<bool> {
        self.store.remove(SESSION_KEY)
    }

    pub fn current_email(&self) -> DbResult<Option<String>> {
        self.store.get(SESSION_KEY)
    }

    /// Profile of the logged-in doctor, if both the session and the profile exist.
    pub fn current_doctor(&self) -> DbResult<Option<DoctorProfile>> {
        match self.current_email()? {
            Some(email) => DoctorRepository::new(self.store).get(&email),
            None => Ok(None),
        }
    }
}
