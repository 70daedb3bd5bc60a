use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{
    dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest},
    jwt::JwtKeys,
    password::{hash_password, verify_password},
    repo::UserRepository,
    repo_types::{normalize_email, User},
};
use crate::error::AppError;
use crate::storage::RepositoryError;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Registration, login and profile lookup on top of the credential store.
///
/// Requests reach these methods already validated at the HTTP boundary.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt: JwtKeys,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, jwt: JwtKeys) -> Self {
        Self { users, jwt }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse, AppError> {
        let email = normalize_email(&req.email);
        if self.users.exists(&email).await? {
            warn!(email = %email, "email already registered");
            return Err(AppError::conflict("Email already exists"));
        }

        let hash = hash_password(&req.password)?;
        let user = User::new(&email, hash, req.first_name.trim(), req.last_name.trim());

        match self.users.create(&user).await {
            Ok(()) => {}
            Err(RepositoryError::AlreadyExists { .. }) => {
                warn!(email = %email, "email registered concurrently");
                return Err(AppError::conflict("Email already exists"));
            }
            Err(e) => return Err(e.into()),
        }

        info!(user_id = %user.id, email = %user.email, "user registered");
        self.respond_with_token(&user)
    }

    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, AppError> {
        let email = normalize_email(&req.email);
        let user = match self.users.get_by_email(&email).await? {
            Some(u) if u.is_active => u,
            Some(u) => {
                warn!(user_id = %u.id, "login on inactive account");
                return Err(AppError::unauthorized(INVALID_CREDENTIALS));
            }
            None => {
                warn!(email = %email, "login unknown email");
                return Err(AppError::unauthorized(INVALID_CREDENTIALS));
            }
        };

        let ok = verify_password(&req.password, &user.password_hash).unwrap_or_else(|e| {
            warn!(user_id = %user.id, error = %e, "stored password hash unreadable");
            false
        });
        if !ok {
            warn!(user_id = %user.id, "login invalid password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        info!(user_id = %user.id, "user logged in");
        self.respond_with_token(&user)
    }

    pub async fn me(&self, user_id: Uuid) -> Result<PublicUser, AppError> {
        match self.users.get_by_id(user_id).await? {
            Some(user) if user.is_active => Ok(user.into()),
            _ => Err(AppError::unauthorized("User not found")),
        }
    }

    fn respond_with_token(&self, user: &User) -> Result<AuthResponse, AppError> {
        let issued =
            self.jwt
                .issue_token(user.id, &user.email, &user.first_name, &user.last_name)?;
        Ok(AuthResponse {
            token: issued.token,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            expires_at: issued.expires_at,
        })
    }
}
