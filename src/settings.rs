use crate::{Result, DEFAULT_PAYMENT_DELAY, DEFAULT_TOTAL_SEATS};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub application_id: String,
    pub listen_addr: String,
    pub port: u16,
    pub payment_delay_ms: u64,
    pub default_total_seats: u32,
    pub additional_properties: HashMap<String, String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            application_id: "booking-service".to_string(),
            listen_addr: "0.0.0.0".to_string(),
            port: 8080,
            payment_delay_ms: DEFAULT_PAYMENT_DELAY.as_millis() as u64,
            default_total_seats: DEFAULT_TOTAL_SEATS,
            additional_properties: HashMap::new(),
        }
    }
}

/// Values read from `CINEMA_*` environment variables.
#[derive(Debug, Default, Deserialize)]
struct EnvOverrides {
    listen_addr: Option<String>,
    port: Option<u16>,
    payment_delay_ms: Option<u64>,
    default_total_seats: Option<u32>,
}

impl ServiceConfig {
    pub fn payment_delay(&self) -> Duration {
        Duration::from_millis(self.payment_delay_ms)
    }

    /// Apply `CINEMA_LISTEN_ADDR`, `CINEMA_PORT`, `CINEMA_PAYMENT_DELAY_MS`
    /// and `CINEMA_DEFAULT_TOTAL_SEATS` on top of the current values.
    pub fn apply_env_overrides(self) -> Result<Self> {
        let source = config::Environment::with_prefix("CINEMA").try_parsing(true);
        self.apply_overrides(source)
    }

    fn apply_overrides<S>(mut self, source: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let overrides: EnvOverrides = config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()?;

        if let Some(listen_addr) = overrides.listen_addr {
            self.listen_addr = listen_addr;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(payment_delay_ms) = overrides.payment_delay_ms {
            self.payment_delay_ms = payment_delay_ms;
        }
        if let Some(default_total_seats) = overrides.default_total_seats {
            self.default_total_seats = default_total_seats;
        }

        Ok(self)
    }
}
