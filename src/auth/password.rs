use crate::errors::AppError;

const BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

pub fn hash(password: &str) -> Result<String, AppError> {
    bcrypt::hash(password, BCRYPT_COST)
        .map_err(|e| AppError::Internal(format!("failed to hash password: {e}")))
}

pub fn verify(password: &str, hash: &str) -> Result<bool, AppError> {
    bcrypt::verify(password, hash)
        .map_err(|e| AppError::Internal(format!("failed to verify password: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_verifies() {
        let hashed = hash("correct horse battery staple").unwrap();
        assert!(verify("correct horse battery staple", &hashed).unwrap());
    }

    #[test]
    fn wrong_password_fails() {
        let hashed = hash("correct horse battery staple").unwrap();
        assert!(!verify("wrong password", &hashed).unwrap());
    }
}
