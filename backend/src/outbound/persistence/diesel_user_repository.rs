//! PostgreSQL-backed [`UserRepository`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{
    EmailAddress, NewUser, PasswordHash, Role, SymptomTags, User, UserId, is_matching_doctor,
};

use super::error_mapping::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserRow};
use super::pool::DbPool;
use super::schema::users;

#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: super::pool::PoolError) -> UserRepositoryError {
    map_pool_error(error, UserRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    map_diesel_error(
        error,
        UserRepositoryError::query,
        UserRepositoryError::connection,
    )
}

fn row_to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    let email = EmailAddress::parse(&row.email).map_err(|err| {
        warn!(user_id = %row.id, error = %err, "stored email failed validation");
        UserRepositoryError::query("stored email is invalid")
    })?;
    let role: Role = row.role.parse().map_err(|err| {
        warn!(user_id = %row.id, error = %err, "stored role failed validation");
        UserRepositoryError::query("stored role is invalid")
    })?;
    Ok(User {
        id: UserId::from_uuid(row.id),
        name: row.name,
        email,
        password_hash: PasswordHash::from_encoded(row.password_hash),
        role,
        number: row.number,
        symptoms: SymptomTags::new(row.symptoms),
        created_at: row.created_at,
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &NewUser) -> Result<User, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = NewUserRow {
            id: Uuid::new_v4(),
            name: &user.name,
            email: user.email.as_str(),
            password_hash: user.password_hash.as_str(),
            role: user.role.as_str(),
            number: user.number.as_deref(),
            symptoms: user.symptoms.as_slice(),
        };
        let stored: UserRow = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    UserRepositoryError::duplicate_email(user.email.as_str())
                } else {
                    diesel_error(err)
                }
            })?;
        row_to_user(stored)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        users::table
            .find(*id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(row_to_user)
            .transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        users::table
            .filter(users::email.eq(email.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(row_to_user)
            .transpose()
    }

    async fn update_symptoms(
        &self,
        id: &UserId,
        symptoms: &SymptomTags,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::update(users::table.find(*id.as_uuid()))
            .set(users::symptoms.eq(symptoms.as_slice()))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(row_to_user)
            .transpose()
    }

    async fn find_doctors_with_any_symptom(
        &self,
        symptoms: &SymptomTags,
    ) -> Result<Vec<User>, UserRepositoryError> {
        if symptoms.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<UserRow> = users::table
            .filter(users::role.eq(Role::Doctor.as_str()))
            .filter(users::symptoms.overlaps_with(symptoms.as_slice().to_vec()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        let doctors = rows
            .into_iter()
            .map(row_to_user)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(doctors
            .into_iter()
            .filter(|doctor| is_matching_doctor(doctor, symptoms))
            .collect())
    }
}
