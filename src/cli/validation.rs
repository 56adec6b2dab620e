//! Value parsers for command-line arguments.

use std::net::IpAddr;
use std::path::PathBuf;

/// Upper bound on `migrate --rollback`.
pub const MAX_ROLLBACK_STEPS: u32 = 100;

/// Port in 1..=65535.
pub fn validate_port(port_str: &str) -> Result<u16, String> {
    match port_str.parse::<u16>() {
        Ok(0) => Err("Port must be between 1 and 65535. Port 0 is not allowed.".to_string()),
        Ok(port) => Ok(port),
        Err(_) => Err(format!(
            "Port must be a valid number between 1 and 65535, got: '{}'",
            port_str
        )),
    }
}

/// Existing, readable regular file.
pub fn validate_config_file_path(path_str: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(format!("Configuration file does not exist: '{}'", path_str));
    }
    if !path.is_file() {
        return Err(format!("Configuration path is not a file: '{}'", path_str));
    }
    std::fs::File::open(&path)
        .map(|_| path.clone())
        .map_err(|e| format!("Cannot read configuration file '{}': {}", path_str, e))
}

/// Rollback step count in 1..=100.
pub fn validate_rollback_steps(steps_str: &str) -> Result<u32, String> {
    let steps: u32 = steps_str.parse().map_err(|_| {
        format!(
            "Rollback steps must be a valid positive number, got: '{}'",
            steps_str
        )
    })?;

    if steps == 0 {
        return Err("Rollback steps must be greater than 0".to_string());
    }
    if steps > MAX_ROLLBACK_STEPS {
        return Err(format!(
            "Rollback steps cannot exceed {}",
            MAX_ROLLBACK_STEPS
        ));
    }

    Ok(steps)
}

/// IP address or hostname.
///
/// Dotted-digit strings must be valid IPv4 addresses; anything else is
/// accepted as a hostname of at most 253 characters without whitespace.
pub fn validate_host_address(host_str: &str) -> Result<String, String> {
    let host = host_str.trim();

    if host.is_empty() {
        return Err("Host address cannot be empty".to_string());
    }
    if host.chars().any(char::is_whitespace) {
        return Err("Host address cannot contain spaces".to_string());
    }
    if host.parse::<IpAddr>().is_ok() {
        return Ok(host.to_string());
    }
    if host.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(format!("Invalid IPv4 address format: '{}'", host_str));
    }
    if host.len() > 253 {
        return Err("Host address is too long (maximum 253 characters)".to_string());
    }

    Ok(host.to_string())
}
