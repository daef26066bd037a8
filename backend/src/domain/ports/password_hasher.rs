//! Port for password hashing.

use crate::domain::PasswordHash;

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashers.
    pub enum PasswordHasherError {
        /// Hashing could not be performed.
        Hash { message: String } => "password hashing failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError>;

    /// Constant-time verification. Malformed hashes never verify.
    fn verify(&self, password: &str, hash: &PasswordHash) -> bool;
}
