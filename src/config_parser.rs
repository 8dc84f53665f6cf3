use crate::{BookingError, Result, ServiceConfig};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

/// Parse a Java properties file into ServiceConfig
pub fn parse_properties_file<P: AsRef<Path>>(path: P, application_id: &str) -> Result<ServiceConfig> {
    let properties = read_properties(path.as_ref())?;

    let config = ServiceConfig {
        application_id: application_id.to_string(),
        ..ServiceConfig::default()
    };
    apply_properties(config, properties)
}

/// Parse a second properties file and layer it over an existing config
pub fn merge_properties<P: AsRef<Path>>(config: ServiceConfig, path: P) -> Result<ServiceConfig> {
    let properties = read_properties(path.as_ref())?;
    apply_properties(config, properties)
}

fn read_properties(path: &Path) -> Result<HashMap<String, String>> {
    let file = File::open(path).map_err(|e| {
        BookingError::InvalidArgument(format!("Failed to open config file {:?}: {}", path, e))
    })?;

    let reader = BufReader::new(file);
    java_properties::read(reader)
        .map_err(|e| BookingError::InvalidArgument(format!("Failed to parse properties: {}", e)))
}

fn apply_properties(mut config: ServiceConfig, properties: HashMap<String, String>) -> Result<ServiceConfig> {
    for (key, value) in properties {
        match key.as_str() {
            "listen.addr" => config.listen_addr = value,
            "port" => config.port = parse_value(&key, &value)?,
            "payment.delay.ms" => config.payment_delay_ms = parse_value(&key, &value)?,
            "show.default.seats" => config.default_total_seats = parse_value(&key, &value)?,
            _ => {
                config.additional_properties.insert(key, value);
            }
        }
    }

    Ok(config)
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        BookingError::InvalidArgument(format!("Invalid value for {}: {}", key, value))
    })
}
