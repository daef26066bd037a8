//! Credential hashing and bearer-token signing adapters.

mod password;
mod token;

pub use password::{DEFAULT_PBKDF2_ITERATIONS, Pbkdf2PasswordHasher};
pub use token::HmacTokenService;
