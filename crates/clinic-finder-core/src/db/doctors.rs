//! Doctor profile repository.

use super::keys::user_key;
use super::{decode_record, DbResult, KeyValueStore};
use crate::models::DoctorProfile;

/// Stored doctor profiles, keyed by email.
pub struct DoctorRepository<'a, S: KeyValueStore> {
    store: &'a S,
}

impl<'a, S: KeyValueStore> DoctorRepository<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Insert or replace the profile stored under the doctor's email.
    pub fn save(&self, profile: &DoctorProfile) -> DbResult<()> {
        let json = serde_json::to_string(profile)?;
        self.store.set(&user_key(&profile.email), &json)
    }

    /// Look up a profile. A corrupt profile is a [`super::DbError::Decode`].
    pub fn get(&self, email: &str) -> DbResult<Option<DoctorProfile>> {
        let key = user_key(email);
        self.store
            .get(&key)?
            .map(|raw| decode_record(&key, &raw))
            .transpose()
    }

    pub fn remove(&self, email: &str) -> DbResult<bool> {
        self.store.remove(&user_key(email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, DbError};

    fn doctor(email: &str) -> DoctorProfile {
        DoctorProfile::new("Jose".into(), "Rizal".into(), email.into(), "Doctor".into())
    }

    #[test]
    fn test_save_and_get() {
        let db = Database::open_in_memory().unwrap();
        let repo = DoctorRepository::new(&db);

        repo.save(&doctor("doctor1@clinic.com")).unwrap();

        let found = repo.get("doctor1@clinic.com").unwrap().unwrap();
        assert_eq!(found.display_name(), "Jose Rizal");
        assert!(repo.get("doctor2@clinic.com").unwrap().is_none());
    }

    #[test]
    fn test_stored_under_user_prefix() {
        let db = Database::open_in_memory().unwrap();
        DoctorRepository::new(&db)
            .save(&doctor("doctor1@clinic.com"))
            .unwrap();
        assert!(db.get("user:doctor1@clinic.com").unwrap().is_some());
    }

    #[test]
    fn test_corrupt_profile_is_decode_error() {
        let db = Database::open_in_memory().unwrap();
        db.set("user:doctor1@clinic.com", "{broken").unwrap();

        let result = DoctorRepository::new(&db).get("doctor1@clinic.com");
        assert!(matches!(result, Err(DbError::Decode { .. })));
    }

    #[test]
    fn test_remove() {
        let db = Database::open_in_memory().unwrap();
        let repo = DoctorRepository::new(&db);
        repo.save(&doctor("doctor1@clinic.com")).unwrap();

        assert!(repo.remove("doctor1@clinic.com").unwrap());
        assert!(repo.get("doctor1@clinic.com").unwrap().is_none());
    }
}
