//! Account store keyed by id with a unique normalised email.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use super::recover;
use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{EmailAddress, NewUser, SymptomTags, User, UserId, is_matching_doctor};

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    rows: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    /// Seed an existing account, replacing any with the same id.
    pub fn seed(&self, user: User) {
        let mut rows = recover(self.rows.write());
        rows.retain(|existing| existing.id != user.id);
        rows.push(user);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &NewUser) -> Result<User, UserRepositoryError> {
        let mut rows = recover(self.rows.write());
        if rows.iter().any(|existing| existing.email == user.email) {
            return Err(UserRepositoryError::duplicate_email(user.email.as_str()));
        }
        let stored = User {
            id: UserId::random(),
            name: user.name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role,
            number: user.number.clone(),
            symptoms: user.symptoms.clone(),
            created_at: Utc::now(),
        };
        rows.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(recover(self.rows.read())
            .iter()
            .find(|u| u.id == *id)
            .cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError> {
        Ok(recover(self.rows.read())
            .iter()
            .find(|u| u.email == *email)
            .cloned())
    }

    async fn update_symptoms(
        &self,
        id: &UserId,
        symptoms: &SymptomTags,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut rows = recover(self.rows.write());
        Ok(rows.iter_mut().find(|u| u.id == *id).map(|user| {
            user.symptoms = symptoms.clone();
            user.clone()
        }))
    }

    async fn find_doctors_with_any_symptom(
        &self,
        symptoms: &SymptomTags,
    ) -> Result<Vec<User>, UserRepositoryError> {
        Ok(recover(self.rows.read())
            .iter()
            .filter(|u| is_matching_doctor(u, symptoms))
            .cloned()
            .collect())
    }
}
