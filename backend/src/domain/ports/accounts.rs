//! Driving port for registration, login, and profile use-cases.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, Registration, SymptomTags, UserId, UserProfile};

/// Profile plus a freshly issued bearer token.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub profile: UserProfile,
    pub token: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Accounts: Send + Sync {
    async fn register(&self, registration: Registration) -> Result<AuthSession, Error>;

    async fn login(&self, credentials: LoginCredentials) -> Result<AuthSession, Error>;

    async fn profile(&self, user_id: UserId) -> Result<UserProfile, Error>;

    async fn update_symptoms(
        &self,
        user_id: UserId,
        symptoms: SymptomTags,
    ) -> Result<UserProfile, Error>;
}
