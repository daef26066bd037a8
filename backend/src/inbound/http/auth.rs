//! Bearer-token extractors.
//!
//! Handlers name [`Authenticated`] when a token is mandatory and
//! [`MaybeAuthenticated`] when identity only refines the request.

use std::future::{Ready, ready};

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use tracing::{debug, warn};

use crate::domain::{Error, Identity, Role, UserId};

use super::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Identity of a caller who presented a valid token.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Identity);

impl Authenticated {
    pub fn user_id(&self) -> UserId {
        self.0.user_id
    }
}

/// Identity when a valid token was presented; `None` otherwise.
#[derive(Debug, Clone)]
pub struct MaybeAuthenticated(pub Option<Identity>);

impl MaybeAuthenticated {
    /// The caller's id if they are a patient, else `fallback`.
    pub fn patient_or(&self, fallback: Option<UserId>) -> Option<UserId> {
        match &self.0 {
            Some(identity) if identity.role == Role::Patient => Some(identity.user_id),
            _ => fallback,
        }
    }
}

fn bearer_token(req: &HttpRequest) -> Result<Option<&str>, Error> {
    let Some(header) = req.headers().get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("Unauthorized"))?;
    value
        .strip_prefix(BEARER_PREFIX)
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(Some)
        .ok_or_else(|| Error::unauthorized("Unauthorized"))
}

fn verify(req: &HttpRequest, token: &str) -> Result<Identity, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state not configured"))?;
    state.tokens.verify(token).map(Identity::from).map_err(|err| {
        debug!(error = %err, "rejected bearer token");
        Error::unauthorized("Unauthorized")
    })
}

impl FromRequest for Authenticated {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = bearer_token(req).and_then(|token| {
            let token = token.ok_or_else(|| Error::unauthorized("Unauthorized"))?;
            verify(req, token).map(Authenticated)
        });
        ready(result)
    }
}

impl FromRequest for MaybeAuthenticated {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let identity = match bearer_token(req) {
            Ok(Some(token)) => match verify(req, token) {
                Ok(identity) => Some(identity),
                Err(err) => {
                    warn!(code = ?err.code(), "ignoring invalid optional bearer token");
                    None
                }
            },
            Ok(None) | Err(_) => None,
        };
        ready(Ok(MaybeAuthenticated(identity)))
    }
}
