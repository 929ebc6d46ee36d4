use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

/// Runtime configuration, loaded once at startup and carried in [`crate::state::AppState`].
/// Nothing else reads the environment.
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub seed_on_start: bool,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("RUST_PORT", "4000"),
            database_url: try_load("DATABASE_URL", "sqlite://uniroute.sqlite?mode=rwc"),
            seed_on_start: try_load("SEED_ON_START", "true"),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
