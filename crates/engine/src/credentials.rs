//! Password hashing.
//!
//! Hashes are bcrypt strings (`$2b$<cost>$<salt><digest>`), so the salt and
//! the cost travel with the stored value.

use crate::{EngineError, ResultEngine};

const MIN_PASSWORD_LEN: usize = 6;

/// Hashes `password` with a freshly generated salt.
pub fn hash_password(password: &str) -> ResultEngine<String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(EngineError::InvalidInput(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|err| EngineError::InvalidInput(format!("cannot hash password: {err}")))
}

/// Checks `password` against a hash produced by [`hash_password`].
///
/// Malformed stored hashes never verify.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    bcrypt::verify(password, stored).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let stored = hash_password("correct horse").unwrap();
        assert!(stored.starts_with("$2"));
        assert!(verify_password("correct horse", &stored));
        assert!(!verify_password("correct horsE", &stored));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("secret-pw").unwrap();
        let b = hash_password("secret-pw").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("secret-pw", &a));
        assert!(verify_password("secret-pw", &b));
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert_eq!(
            hash_password("abc"),
            Err(EngineError::InvalidInput(
                "password must be at least 6 characters".to_string()
            ))
        );
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!verify_password("anything", "no-separator"));
        assert!(!verify_password("anything", "salt$deadbeef"));
        assert!(!verify_password("anything", ""));
    }
}
