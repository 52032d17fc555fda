use argon2::Config;
use polls_errors::AppError;
use rand::Rng;

pub struct PasswordHasher;

impl PasswordHasher {
    /// Argon2 encoded hash with a fresh random salt.
    pub fn hash(password: &str) -> Result<String, AppError> {
        let salt = rand::thread_rng().gen::<[u8; 32]>();
        let config = Config::default();
        argon2::hash_encoded(password.as_bytes(), &salt, &config)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// An unreadable stored hash never verifies.
    pub fn verify(hash: &str, password: &str) -> bool {
        match argon2::verify_encoded(hash, password.as_bytes()) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!("Stored password hash could not be decoded: {}", e);
                false
            }
        }
    }
}
