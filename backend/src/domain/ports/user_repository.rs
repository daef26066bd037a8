//! Port for account persistence and doctor lookup.

use async_trait::async_trait;

use crate::domain::{EmailAddress, NewUser, SymptomTags, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "user repository query failed: {message}",
        /// An account with the same normalised email already exists.
        DuplicateEmail { email: String } =>
            "an account already exists for {email}",
    }
}

/// Account store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account.
    async fn insert(&self, user: &NewUser) -> Result<User, UserRepositoryError>;

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Replace an account's symptom tags.
    async fn update_symptoms(
        &self,
        id: &UserId,
        symptoms: &SymptomTags,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Doctors whose tags share at least one entry with `symptoms`.
    async fn find_doctors_with_any_symptom(
        &self,
        symptoms: &SymptomTags,
    ) -> Result<Vec<User>, UserRepositoryError>;
}
