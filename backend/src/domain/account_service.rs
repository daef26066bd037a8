//! Registration, login, and profile maintenance.
//!
//! Password hashing is CPU-bound, so it runs on the blocking pool. Logins for
//! unknown emails still verify against a dummy hash to keep response times
//! uniform.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tokio::sync::OnceCell;
use tokio::task;
use tracing::info;
use zeroize::Zeroizing;

use crate::domain::ports::{
    Accounts, AuthSession, PasswordHasher, TokenService, UserRepository, UserRepositoryError,
};
use crate::domain::{
    Error, LoginCredentials, NewUser, PasswordHash, Registration, SymptomTags, TokenClaims, User,
    UserId, UserProfile,
};

const DUMMY_PASSWORD: &str = "vitalwatch-absent-account";

fn map_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::DuplicateEmail { .. } => Error::conflict("email already registered"),
    }
}

/// Implements [`Accounts`].
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
    clock: Arc<dyn Clock>,
    dummy_hash: Arc<OnceCell<PasswordHash>>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            clock,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    async fn hash_password(&self, password: Zeroizing<String>) -> Result<PasswordHash, Error> {
        let hasher = Arc::clone(&self.hasher);
        task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
            .map_err(|err| Error::internal(err.to_string()))
    }

    async fn verify_password(
        &self,
        password: Zeroizing<String>,
        hash: PasswordHash,
    ) -> Result<bool, Error> {
        let hasher = Arc::clone(&self.hasher);
        task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|err| Error::internal(format!("password verification task failed: {err}")))
    }

    /// Hash compared against when no account matches, computed once.
    async fn dummy_hash(&self) -> Result<PasswordHash, Error> {
        self.dummy_hash
            .get_or_try_init(|| self.hash_password(Zeroizing::new(DUMMY_PASSWORD.to_owned())))
            .await
            .cloned()
    }

    fn session_for(&self, user: &User) -> Result<AuthSession, Error> {
        let claims = TokenClaims {
            sub: user.id,
            email: user.email.to_string(),
            role: user.role,
            exp: self.clock.utc().timestamp() + self.tokens.ttl_seconds(),
        };
        let token = self
            .tokens
            .issue(&claims)
            .map_err(|err| Error::internal(format!("failed to issue token: {err}")))?;
        Ok(AuthSession {
            profile: UserProfile::from(user),
            token,
        })
    }
}

#[async_trait]
impl Accounts for AccountService {
    async fn register(&self, registration: Registration) -> Result<AuthSession, Error> {
        let email = registration.credentials.email().clone();
        if self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_repository_error)?
            .is_some()
        {
            return Err(Error::conflict("email already registered"));
        }
        let password_hash = self
            .hash_password(Zeroizing::new(registration.credentials.password().to_owned()))
            .await?;
        let user = self
            .users
            .insert(&NewUser {
                name: registration.name,
                email,
                password_hash,
                role: registration.role,
                number: registration.number,
                symptoms: registration.symptoms,
            })
            .await
            .map_err(map_repository_error)?;
        info!(user_id = %user.id, role = %user.role, "account registered");
        self.session_for(&user)
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<AuthSession, Error> {
        let user = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_repository_error)?;
        let hash = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.dummy_hash().await?,
        };
        let verified = self
            .verify_password(Zeroizing::new(credentials.password().to_owned()), hash)
            .await?;
        match user {
            Some(user) if verified => self.session_for(&user),
            _ => Err(Error::unauthorized("invalid credentials")),
        }
    }

    async fn profile(&self, user_id: UserId) -> Result<UserProfile, Error> {
        self.users
            .find_by_id(&user_id)
            .await
            .map_err(map_repository_error)?
            .as_ref()
            .map(UserProfile::from)
            .ok_or_else(|| Error::not_found("user not found"))
    }

    async fn update_symptoms(
        &self,
        user_id: UserId,
        symptoms: SymptomTags,
    ) -> Result<UserProfile, Error> {
        self.users
            .update_symptoms(&user_id, &symptoms)
            .await
            .map_err(map_repository_error)?
            .as_ref()
            .map(UserProfile::from)
            .ok_or_else(|| Error::not_found("user not found"))
    }
}
