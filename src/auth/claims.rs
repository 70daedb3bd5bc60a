use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload issued on register and login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,           // user ID
    pub email: String,
    pub given_name: String,
    pub family_name: String,
    pub name: String,        // display name, "first last"
    pub jti: Uuid,           // unique per token
    pub iat: i64,            // issued at (unix timestamp)
    pub exp: i64,            // expires at (unix timestamp)
    pub iss: String,
    pub aud: String,
}
