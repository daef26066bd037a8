//! Port for issuing and verifying bearer tokens.

use crate::domain::TokenClaims;

use super::define_port_error;

define_port_error! {
    /// Errors raised by token services.
    pub enum TokenError {
        /// The token is not in the expected compact form.
        Malformed { message: String } => "token is malformed: {message}",
        /// The signature does not match.
        BadSignature => "token signature mismatch",
        /// The token's expiry has passed.
        Expired => "token has expired",
        /// Claims could not be encoded.
        Encode { message: String } => "token could not be encoded: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Sign `claims` into a compact token.
    fn issue(&self, claims: &TokenClaims) -> Result<String, TokenError>;

    /// Verify signature and expiry, returning the claims.
    fn verify(&self, token: &str) -> Result<TokenClaims, TokenError>;

    /// Seconds a freshly issued token stays valid.
    fn ttl_seconds(&self) -> i64;
}
