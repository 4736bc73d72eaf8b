use tracing::error;

/// bcrypt work factor, kept at 10 to match the hashes already in the users
/// table.
const BCRYPT_COST: u32 = 10;

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    bcrypt::hash(plain, BCRYPT_COST).map_err(|e| {
        error!(error = %e, "bcrypt hash error");
        anyhow::anyhow!(e.to_string())
    })
}

/// `bcrypt::verify` does the constant-time comparison; a mismatch is
/// `Ok(false)`, only a malformed stored hash is an error.
pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    bcrypt::verify(plain, hash).map_err(|e| {
        error!(error = %e, "bcrypt verify error");
        anyhow::anyhow!(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn hash_is_not_the_plaintext() {
        let password = "hunter22";
        let hash = hash_password(password).expect("hashing should succeed");
        assert_ne!(hash, password);
    }

    #[test]
    fn same_password_hashes_differently() {
        let password = "same-password";
        let first = hash_password(password).expect("hashing should succeed");
        let second = hash_password(password).expect("hashing should succeed");
        assert_ne!(first, second);
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert!(!err.to_string().is_empty());
    }
}
