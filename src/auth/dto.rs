use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::User;
use crate::error::{AppError, ValidationErrors};

pub const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    let email = email.trim();
    if email.is_empty() {
        errors.add("email", "Email is required");
    } else if !is_valid_email(email) {
        errors.add("email", "Email is not valid");
    }
}

/// Request body for user registration.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = ValidationErrors::new();
        check_email(&mut errors, &self.email);

        if self.password.is_empty() {
            errors.add("password", "Password is required");
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.add(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
            );
        }
        if self.confirm_password != self.password {
            errors.add("confirmPassword", "Passwords do not match");
        }
        if self.first_name.trim().is_empty() {
            errors.add("firstName", "First name is required");
        }
        if self.last_name.trim().is_empty() {
            errors.add("lastName", "Last name is required");
        }

        errors.into_result()
    }
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = ValidationErrors::new();
        check_email(&mut errors, &self.email);
        if self.password.is_empty() {
            errors.add("password", "Password is required");
        }
        errors.into_result()
    }
}

/// Returned after register and login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> RegisterRequest {
        RegisterRequest {
            email: "a@x.com".into(),
            password: "Secret1!".into(),
            confirm_password: "Secret1!".into(),
            first_name: "Ana".into(),
            last_name: "Souza".into(),
        }
    }

    fn field_errors(err: AppError, field: &str) -> Vec<String> {
        match err {
            AppError::Validation(errors) => errors.field(field).unwrap_or_default().to_vec(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn complete_registration_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn short_password_and_mismatch_are_reported_per_field() {
        let req = RegisterRequest {
            password: "12345".into(),
            confirm_password: "123456".into(),
            ..valid()
        };
        let err = req.validate().unwrap_err();
        let AppError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(
            errors.field("password").unwrap(),
            ["Password must be at least 6 characters"]
        );
        assert_eq!(errors.field("confirmPassword").unwrap(), ["Passwords do not match"]);
        assert!(errors.field("email").is_none());
    }

    #[test]
    fn missing_names_and_bad_email_fail() {
        let req = RegisterRequest {
            email: "not-an-email".into(),
            first_name: "  ".into(),
            ..valid()
        };
        let err = req.validate().unwrap_err();
        let AppError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.field("email").is_some());
        assert!(errors.field("firstName").is_some());
        assert!(errors.field("lastName").is_none());
    }

    #[test]
    fn login_requires_both_fields() {
        let err = LoginRequest::default().validate().unwrap_err();
        assert_eq!(field_errors(err, "password"), ["Password is required"]);
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("user@example.com"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email("user example.com"));
    }

    #[test]
    fn public_user_serializes_camel_case_without_hash() {
        let user = User::new("ana@x.com", "$argon2id$secret".into(), "Ana", "Souza");
        let json = serde_json::to_value(PublicUser::from(user)).unwrap();
        assert_eq!(json["firstName"], "Ana");
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
    }
}
