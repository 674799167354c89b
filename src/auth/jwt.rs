use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub name: String,
    pub client_id: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

pub fn issue_access_token(
    signing_key: &str,
    user_id: &str,
    role: &str,
    name: &str,
    client_id: Option<&str>,
    ttl_secs: i64,
) -> Result<String, AppError> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        role: role.to_string(),
        name: name.to_string(),
        client_id: client_id.map(str::to_string),
        exp: now + ttl_secs,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(signing_key.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("failed to sign access token: {e}")))
}

pub fn verify_access_token(signing_key: &str, token: &str) -> Result<Claims, AppError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(signing_key.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthenticationRequired {
        resource_metadata: None,
    })?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_signed_token() {
        let token = issue_access_token(
            "secret",
            "user-1",
            "admin",
            "Ada Lovelace",
            Some("client-a"),
            3600,
        )
        .expect("sign");
        let claims = verify_access_token("secret", &token).expect("verify");
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.name, "Ada Lovelace");
        assert_eq!(claims.client_id.as_deref(), Some("client-a"));
    }

    #[test]
    fn rejects_a_token_signed_with_a_different_key() {
        let token = issue_access_token("secret-a", "user-1", "user", "Grace Hopper", None, 3600)
            .expect("sign");
        let err = verify_access_token("secret-b", &token).unwrap_err();
        assert!(matches!(err, AppError::AuthenticationRequired { .. }));
    }

    #[test]
    fn rejects_an_expired_token() {
        let token = issue_access_token("secret", "user-1", "user", "Grace Hopper", None, -10)
            .expect("sign");
        let err = verify_access_token("secret", &token).unwrap_err();
        assert!(matches!(err, AppError::AuthenticationRequired { .. }));
    }
}
