use polls_errors::AppError;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::{env, fmt::Display, str::FromStr};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_MEDIA_ROOT: &str = "media";
const DEFAULT_MAX_UPLOAD_BYTES: &str = "5242880";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub media_root: PathBuf,
    pub max_upload_bytes: usize,
    pub session_secure: bool,
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AppError::Configuration("DATABASE_URL must be set".to_string()))?;

        Ok(Self {
            database_url,
            bind_addr: try_load(&lookup, "BIND_ADDR", DEFAULT_BIND_ADDR)?,
            media_root: try_load(&lookup, "MEDIA_ROOT", DEFAULT_MEDIA_ROOT)?,
            max_upload_bytes: try_load(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            session_secure: try_load(&lookup, "SESSION_SECURE", "false")?,
        })
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<T, AppError>
where
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        tracing::info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse()
        .map_err(|e| AppError::Configuration(format!("Invalid {key} value {raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_apply() {
        let config = Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://db/polls")]))
            .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(config.media_root, PathBuf::from("media"));
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert!(!config.session_secure);
    }

    #[test]
    fn test_database_url_required() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn test_invalid_value_is_reported() {
        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/polls"),
            ("BIND_ADDR", "not an address"),
        ]))
        .unwrap_err();
        match err {
            AppError::Configuration(msg) => assert!(msg.contains("BIND_ADDR")),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
