//! Key layout of the device store.
//!
//! Record kinds share one flat namespace and are separated by prefix. Nothing
//! outside `db` should build or parse these keys.

pub(crate) const USER_PREFIX: &str = "user:";
pub(crate) const SOS_PREFIX: &str = "sos:";
pub(crate) const REPORT_PREFIX: &str = "report:";
pub(crate) const SESSION_KEY: &str = "loggedInEmail";

pub(crate) fn user_key(email: &str) -> String {
    format!("{}{}", USER_PREFIX, email)
}

pub(crate) fn sos_key(patient_email: &str) -> String {
    format!("{}{}", SOS_PREFIX, patient_email)
}

pub(crate) fn report_key(patient_email: &str) -> String {
    format!("{}{}", REPORT_PREFIX, patient_email)
}

/// Patient email of a live SOS key.
pub(crate) fn patient_from_sos_key(key: &str) -> Option<&str> {
    key.strip_prefix(SOS_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_roundtrip() {
        let key = sos_key("pat@mail.com");
        assert_eq!(key, "sos:pat@mail.com");
        assert_eq!(patient_from_sos_key(&key), Some("pat@mail.com"));
        assert_eq!(patient_from_sos_key("report:pat@mail.com"), None);
    }
}
