//! Compact HMAC-SHA256 signed bearer tokens.
//!
//! Format: `base64url(claims json) "." base64url(hmac)` without padding.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use mockable::Clock;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::domain::TokenClaims;
use crate::domain::ports::{TokenError, TokenService};

type HmacSha256 = Hmac<Sha256>;

/// [`TokenService`] signing with a shared secret.
pub struct HmacTokenService {
    secret: Zeroizing<Vec<u8>>,
    ttl_seconds: i64,
    clock: Arc<dyn Clock>,
}

impl HmacTokenService {
    pub fn new(secret: &[u8], ttl_seconds: i64, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: Zeroizing::new(secret.to_vec()),
            ttl_seconds,
            clock,
        }
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|err| TokenError::encode(err.to_string()))
    }
}

impl TokenService for HmacTokenService {
    fn issue(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        let payload =
            serde_json::to_vec(claims).map_err(|err| TokenError::encode(err.to_string()))?;
        let encoded = URL_SAFE_NO_PAD.encode(payload);
        let mut mac = self.mac()?;
        mac.update(encoded.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{encoded}.{signature}"))
    }

    fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let (encoded, signature) = token
            .split_once('.')
            .ok_or_else(|| TokenError::malformed("missing signature"))?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|err| TokenError::malformed(err.to_string()))?;
        let mut mac = self.mac()?;
        mac.update(encoded.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::bad_signature())?;

        let payload = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|err| TokenError::malformed(err.to_string()))?;
        let claims: TokenClaims =
            serde_json::from_slice(&payload).map_err(|err| TokenError::malformed(err.to_string()))?;
        if claims.exp <= self.clock.utc().timestamp() {
            return Err(TokenError::expired());
        }
        Ok(claims)
    }

    fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Role, UserId};
    use crate::test_support::MutableClock;
    use chrono::Utc;
    use rstest::rstest;
    use std::time::Duration;

    fn service(clock: Arc<MutableClock>) -> HmacTokenService {
        HmacTokenService::new(b"test-secret", 60, clock)
    }

    fn claims(exp: i64) -> TokenClaims {
        TokenClaims {
            sub: UserId::random(),
            email: "dr@example.com".to_owned(),
            role: Role::Doctor,
            exp,
        }
    }

    #[test]
    fn issued_tokens_verify_until_expiry() {
        let now = Utc::now();
        let clock = Arc::new(MutableClock::new(now));
        let tokens = service(clock.clone());
        let issued = claims(now.timestamp() + 60);
        let token = tokens.issue(&issued).expect("issue");

        assert_eq!(tokens.verify(&token).expect("valid"), issued);
        clock.advance(Duration::from_secs(61));
        assert_eq!(tokens.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn tampered_payload_fails_signature() {
        let now = Utc::now();
        let tokens = service(Arc::new(MutableClock::new(now)));
        let token = tokens.issue(&claims(now.timestamp() + 60)).expect("issue");
        let (_, signature) = token.split_once('.').expect("two parts");
        let forged_claims = serde_json::to_vec(&TokenClaims {
            role: Role::Admin,
            ..claims(now.timestamp() + 60)
        })
        .expect("json");
        let forged = format!("{}.{signature}", URL_SAFE_NO_PAD.encode(forged_claims));
        assert_eq!(tokens.verify(&forged), Err(TokenError::BadSignature));
    }

    #[test]
    fn other_secret_fails_signature() {
        let now = Utc::now();
        let clock = Arc::new(MutableClock::new(now));
        let token = HmacTokenService::new(b"other", 60, clock.clone())
            .issue(&claims(now.timestamp() + 60))
            .expect("issue");
        assert_eq!(service(clock).verify(&token), Err(TokenError::BadSignature));
    }

    #[rstest]
    #[case("")]
    #[case("no-dot")]
    #[case("abc.!!!")]
    fn malformed_tokens_are_rejected(#[case] token: &str) {
        let tokens = service(Arc::new(MutableClock::new(Utc::now())));
        assert!(matches!(
            tokens.verify(token),
            Err(TokenError::Malformed { .. })
        ));
    }
}
