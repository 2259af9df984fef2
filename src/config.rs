use std::env;
use std::path::PathBuf;

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::error::ConfigError;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_SESSION_TTL_HOURS: i64 = 24;
const GENERATED_SECRET_LEN: usize = 48;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    /// Directory holding one `<collection>.json` file per collection.
    pub data_dir: PathBuf,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
}

impl Config {
    /// Reads settings from the environment. Call `dotenv::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR));

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                log::warn!("JWT_SECRET is not set; using a random secret, sessions will not survive a restart");
                random_secret()
            }
        };

        let session_ttl_hours = match env::var("SESSION_TTL_HOURS") {
            Ok(value) => {
                let parsed = value.trim().parse::<i64>();
                match parsed {
                    Ok(hours) if hours > 0 => hours,
                    _ => {
                        return Err(ConfigError::InvalidTtl {
                            name: "SESSION_TTL_HOURS",
                            value,
                        })
                    }
                }
            }
            Err(_) => DEFAULT_SESSION_TTL_HOURS,
        };

        Ok(Config {
            bind_addr,
            data_dir,
            jwt_secret,
            session_ttl_hours,
        })
    }

    /// Settings for a store rooted at `data_dir`, used by tests and tooling.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Config {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            data_dir: data_dir.into(),
            jwt_secret: random_secret(),
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
        }
    }
}

fn random_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_SECRET_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_secrets_differ() {
        let a = Config::with_data_dir("a");
        let b = Config::with_data_dir("b");
        assert_eq!(a.jwt_secret.len(), GENERATED_SECRET_LEN);
        assert_ne!(a.jwt_secret, b.jwt_secret);
    }
}
