//! PBKDF2-HMAC-SHA256 password hashing.
//!
//! Hashes are stored as `pbkdf2-sha256$<iterations>$<salt hex>$<hash hex>`
//! so the iteration count can be raised without invalidating old hashes.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::domain::PasswordHash;
use crate::domain::ports::{PasswordHasher, PasswordHasherError};

const SCHEME: &str = "pbkdf2-sha256";
const SALT_LENGTH: usize = 16;
const HASH_LENGTH: usize = 32;

/// Iteration count used in production.
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 210_000;

/// [`PasswordHasher`] backed by `pbkdf2`.
#[derive(Debug, Clone, Copy)]
pub struct Pbkdf2PasswordHasher {
    iterations: u32,
}

impl Default for Pbkdf2PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_PBKDF2_ITERATIONS)
    }
}

impl Pbkdf2PasswordHasher {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    fn derive(password: &str, salt: &[u8], iterations: u32) -> Zeroizing<[u8; HASH_LENGTH]> {
        let mut out = Zeroizing::new([0_u8; HASH_LENGTH]);
        pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, out.as_mut());
        out
    }
}

struct Encoded {
    iterations: u32,
    salt: Vec<u8>,
    hash: Vec<u8>,
}

fn decode(encoded: &str) -> Option<Encoded> {
    let mut parts = encoded.split('$');
    if parts.next()? != SCHEME {
        return None;
    }
    let iterations = parts.next()?.parse().ok().filter(|n| *n > 0)?;
    let salt = hex::decode(parts.next()?).ok()?;
    let hash = hex::decode(parts.next()?).ok()?;
    if parts.next().is_some() || hash.len() != HASH_LENGTH {
        return None;
    }
    Some(Encoded {
        iterations,
        salt,
        hash,
    })
}

impl PasswordHasher for Pbkdf2PasswordHasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError> {
        let mut salt = [0_u8; SALT_LENGTH];
        rand::thread_rng()
            .try_fill_bytes(&mut salt)
            .map_err(|err| PasswordHasherError::hash(err.to_string()))?;
        let derived = Self::derive(password, &salt, self.iterations);
        Ok(PasswordHash::from_encoded(format!(
            "{SCHEME}${}${}${}",
            self.iterations,
            hex::encode(salt),
            hex::encode(derived.as_ref())
        )))
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> bool {
        let Some(encoded) = decode(hash.as_str()) else {
            return false;
        };
        let derived = Self::derive(password, &encoded.salt, encoded.iterations);
        derived.as_ref().ct_eq(encoded.hash.as_slice()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hasher() -> Pbkdf2PasswordHasher {
        Pbkdf2PasswordHasher::new(2)
    }

    #[rstest]
    fn hash_then_verify(hasher: Pbkdf2PasswordHasher) {
        let hash = hasher.hash("correct horse").expect("hash");
        assert!(hash.as_str().starts_with("pbkdf2-sha256$2$"));
        assert!(hasher.verify("correct horse", &hash));
        assert!(!hasher.verify("wrong horse", &hash));
    }

    #[rstest]
    fn salts_differ_between_hashes(hasher: Pbkdf2PasswordHasher) {
        let a = hasher.hash("pw").expect("hash");
        let b = hasher.hash("pw").expect("hash");
        assert_ne!(a, b);
    }

    #[rstest]
    fn verification_uses_stored_iterations(hasher: Pbkdf2PasswordHasher) {
        let hash = Pbkdf2PasswordHasher::new(3).hash("pw").expect("hash");
        assert!(hasher.verify("pw", &hash));
    }

    #[rstest]
    #[case("")]
    #[case("bcrypt$2$00$00")]
    #[case("pbkdf2-sha256$0$00$00")]
    #[case("pbkdf2-sha256$2$zz$00")]
    #[case("pbkdf2-sha256$2$00$abcd")]
    fn malformed_hashes_never_verify(hasher: Pbkdf2PasswordHasher, #[case] encoded: &str) {
        assert!(!hasher.verify("pw", &PasswordHash::from_encoded(encoded)));
    }
}
