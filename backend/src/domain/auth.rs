//! Authentication primitives: credentials, registrations, and token claims.
//!
//! Inbound payload parsing stays outside the domain; these constructors
//! validate raw strings before a handler talks to a port or service.

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::{EmailAddress, EmailError, Role, SymptomTags, UserId};

/// Reasons a login or registration payload is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsError {
    #[error("name is required")]
    MissingName,
    #[error("email is required")]
    MissingEmail,
    #[error("password is required")]
    MissingPassword,
    #[error(transparent)]
    InvalidEmail(#[from] EmailError),
}

/// Validated login credentials.
///
/// The password keeps caller whitespace and is wiped from memory on drop.
///
/// # Examples
/// ```
/// use vitalwatch::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("Ada@Example.com", "pw").unwrap();
/// assert_eq!(creds.email().as_str(), "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

fn require_email(raw: &str) -> Result<EmailAddress, CredentialsError> {
    if raw.trim().is_empty() {
        return Err(CredentialsError::MissingEmail);
    }
    Ok(EmailAddress::parse(raw)?)
}

fn require_password(raw: &str) -> Result<Zeroizing<String>, CredentialsError> {
    if raw.is_empty() {
        return Err(CredentialsError::MissingPassword);
    }
    Ok(Zeroizing::new(raw.to_owned()))
}

impl LoginCredentials {
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsError> {
        Ok(Self {
            email: require_email(email)?,
            password: require_password(password)?,
        })
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub credentials: LoginCredentials,
    pub role: Role,
    pub number: Option<String>,
    pub symptoms: SymptomTags,
}

/// Raw registration fields as received from an adapter.
#[derive(Debug, Clone, Default)]
pub struct RegistrationDraft<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub role: Role,
    pub number: Option<&'a str>,
    pub symptoms: SymptomTags,
}

impl Registration {
    /// Validate a draft, checking name, email, then password.
    pub fn try_from_draft(draft: RegistrationDraft<'_>) -> Result<Self, CredentialsError> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(CredentialsError::MissingName);
        }
        let credentials = LoginCredentials::try_from_parts(draft.email, draft.password)?;
        let number = draft
            .number
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_owned);
        Ok(Self {
            name: name.to_owned(),
            credentials,
            role: draft.role,
            number,
            symptoms: draft.symptoms,
        })
    }
}

/// Claims carried inside a signed bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: UserId,
    pub email: String,
    pub role: Role,
    /// Expiry as seconds since the Unix epoch.
    pub exp: i64,
}

/// Caller identity established from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", CredentialsError::MissingEmail)]
    #[case("   ", "pw", CredentialsError::MissingEmail)]
    #[case("ada@example.com", "", CredentialsError::MissingPassword)]
    #[case("ada", "pw", CredentialsError::InvalidEmail(EmailError::Malformed))]
    fn invalid_credentials(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: CredentialsError,
    ) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[test]
    fn password_whitespace_is_preserved() {
        let creds = LoginCredentials::try_from_parts("a@b.c", " pw ").expect("valid");
        assert_eq!(creds.password(), " pw ");
    }

    #[rstest]
    #[case("", "a@b.c", "pw", CredentialsError::MissingName)]
    #[case("Ada", "", "pw", CredentialsError::MissingEmail)]
    #[case("Ada", "a@b.c", "", CredentialsError::MissingPassword)]
    fn registration_reports_first_missing_field(
        #[case] name: &str,
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: CredentialsError,
    ) {
        let draft = RegistrationDraft {
            name,
            email,
            password,
            ..RegistrationDraft::default()
        };
        assert_eq!(Registration::try_from_draft(draft), Err(expected));
    }

    #[test]
    fn registration_trims_name_and_drops_blank_number() {
        let registration = Registration::try_from_draft(RegistrationDraft {
            name: "  Ada ",
            email: "ADA@example.com",
            password: "pw",
            role: Role::Doctor,
            number: Some("  "),
            symptoms: SymptomTags::new(["Asthma"]),
        })
        .expect("valid registration");
        assert_eq!(registration.name, "Ada");
        assert_eq!(registration.number, None);
        assert_eq!(registration.role, Role::Doctor);
        assert_eq!(registration.credentials.email().as_str(), "ada@example.com");
    }
}
