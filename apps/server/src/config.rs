use std::{net::SocketAddr, time::Duration};

use anyhow::{anyhow, Context};
use chrono_tz::Tz;
use novanest_core::utils::time_utils::{parse_timezone, DEFAULT_LEDGER_TZ};

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// Timezone whose calendar days drive log streaks.
    pub timezone: Tz,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("NN_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid NN_LISTEN_ADDR")?;
        let db_path = std::env::var("NN_DB_PATH").unwrap_or_else(|_| "./db/app.db".into());
        let cors_allow = std::env::var("NN_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = std::env::var("NN_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".into())
            .parse()
            .unwrap_or(30000);
        let timezone = match std::env::var("NN_TIMEZONE") {
            Ok(name) if !name.trim().is_empty() => parse_timezone(&name)
                .ok_or_else(|| anyhow!("Invalid NN_TIMEZONE '{}'", name))?,
            _ => DEFAULT_LEDGER_TZ,
        };
        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            timezone,
        })
    }
}
