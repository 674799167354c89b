use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const SERVICE_USER_PREFIX: &str = "service:";
pub const SERVICE_EMAIL_SUFFIX: &str = "@service.vire.local";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub provider: String,
    pub role: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navexa_key: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub modified_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    pub fn is_service(&self) -> bool {
        self.role == "service" && self.user_id.starts_with(SERVICE_USER_PREFIX)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
    // Accepted for API symmetry with UpdateUser but always ignored: role
    // changes go through the dedicated admin role endpoint only.
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub navexa_key: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertUser {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleChange {
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthTokenResponse {
    pub token: String,
    pub user: PublicUser,
}

/// User shape returned inside auth responses — never carries the hash.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub user_id: String,
    pub email: String,
    pub provider: String,
    pub role: String,
    pub name: String,
}

impl From<&User> for PublicUser {
    fn from(u: &User) -> Self {
        Self {
            user_id: u.user_id.clone(),
            email: u.email.clone(),
            provider: u.provider.clone(),
            role: u.role.clone(),
            name: u.name.clone(),
        }
    }
}
