use std::env;
use std::str::FromStr;

use anyhow::{anyhow, Context};
use rust_decimal::Decimal;

use crate::domain::delivery::DeliveryFeeSchedule;
use crate::domain::order::StatusPolicy;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Postgres connection string; `None` runs on the in-memory store
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,

    pub status_policy: StatusPolicy,
    pub order_number_max_attempts: u32,
    pub delivery: DeliveryFeeSchedule,
}

impl Settings {
    /// Load from the process environment, reading `.env` first if present
    pub fn from_env() -> anyhow::Result<Self> {
        // Loads .env if present (no crash if missing)
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let database_max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?;
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_or(&lookup, "PORT", 8000)?;

        let status_policy = match lookup("ORDER_STATUS_POLICY") {
            Some(raw) => raw
                .parse::<StatusPolicy>()
                .map_err(|e| anyhow!(e))
                .context("Invalid ORDER_STATUS_POLICY")?,
            None => StatusPolicy::default(),
        };

        let order_number_max_attempts: u32 = parse_or(&lookup, "ORDER_NUMBER_MAX_ATTEMPTS", 5)?;
        if order_number_max_attempts == 0 {
            return Err(anyhow!("ORDER_NUMBER_MAX_ATTEMPTS must be at least 1"));
        }

        let defaults = DeliveryFeeSchedule::default();
        let flat_fee: Decimal = parse_or(&lookup, "DELIVERY_FLAT_FEE", defaults.flat_fee)?;
        if flat_fee.is_sign_negative() {
            return Err(anyhow!("DELIVERY_FLAT_FEE must not be negative"));
        }
        let free_from_items = parse_or(&lookup, "DELIVERY_FREE_FROM_ITEMS", defaults.free_from_items)?;

        Ok(Settings {
            database_url,
            database_max_connections,
            host,
            port,
            status_policy,
            order_number_max_attempts,
            delivery: DeliveryFeeSchedule::new(flat_fee, free_from_items),
        })
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Invalid {key}: {raw:?}")),
        None => Ok(default),
    }
}
