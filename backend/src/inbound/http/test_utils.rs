//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::web;

use crate::domain::ports::{
    MockAccounts, MockAlertInbox, MockRiskAssessment, MockRiskPredictor, MockStoreStatus,
    MockTokenService, MockVitalsIntake,
};
use crate::domain::{Identity, Role, TokenClaims, UserId};

use super::state::HttpState;

/// Mocked driving and driven ports that make up an [`HttpState`].
///
/// Tests set expectations on the fields they care about and call
/// [`TestPorts::into_state`].
#[derive(Default)]
pub struct TestPorts {
    pub accounts: MockAccounts,
    pub alerts: MockAlertInbox,
    pub risk: MockRiskAssessment,
    pub intake: MockVitalsIntake,
    pub tokens: MockTokenService,
    pub predictor: MockRiskPredictor,
    pub store: MockStoreStatus,
}

impl TestPorts {
    /// Accept `token-<uuid>-<role>` bearer tokens and reject the rest.
    pub fn accepting_test_tokens(mut self) -> Self {
        self.tokens.expect_verify().returning(|token| {
            parse_test_token(token).ok_or_else(crate::domain::ports::TokenError::bad_signature)
        });
        self
    }

    pub fn into_state(self) -> HttpState {
        HttpState {
            accounts: Arc::new(self.accounts),
            alerts: Arc::new(self.alerts),
            risk: Arc::new(self.risk),
            intake: Arc::new(self.intake),
            tokens: Arc::new(self.tokens),
            predictor: Arc::new(self.predictor),
            store: Arc::new(self.store),
        }
    }

    pub fn into_data(self) -> web::Data<HttpState> {
        web::Data::new(self.into_state())
    }
}

fn parse_test_token(token: &str) -> Option<TokenClaims> {
    let rest = token.strip_prefix("token-")?;
    let (id, role) = rest.rsplit_once('-')?;
    Some(TokenClaims {
        sub: id.parse().ok()?,
        email: "caller@example.com".to_owned(),
        role: role.parse().ok()?,
        exp: i64::MAX,
    })
}

/// Token accepted by [`TestPorts::accepting_test_tokens`].
pub fn test_token(user_id: UserId, role: Role) -> String {
    format!("token-{user_id}-{role}")
}

/// `Authorization` header value for `token`.
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Identity matching [`test_token`].
pub fn identity(user_id: UserId, role: Role) -> Identity {
    Identity {
        user_id,
        email: "caller@example.com".to_owned(),
        role,
    }
}
