//! Custom validation functions referenced from the schema.

use std::net::SocketAddr;
use validator::ValidationError;

/// Validate a log level name.
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    match level {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ValidationError::new("invalid_log_level")),
    }
}

/// Validate a log format name.
pub fn validate_log_format(format: &str) -> Result<(), ValidationError> {
    match format {
        "pretty" | "compact" | "json" => Ok(()),
        _ => Err(ValidationError::new("invalid_log_format")),
    }
}

/// Validate a `host:port` socket address.
pub fn validate_socket_addr(address: &str) -> Result<(), ValidationError> {
    address
        .parse::<SocketAddr>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("invalid_socket_address"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level() {
        assert!(validate_log_level("debug").is_ok());
        assert!(validate_log_level("verbose").is_err());
    }

    #[test]
    fn test_socket_addr() {
        assert!(validate_socket_addr("0.0.0.0:8080").is_ok());
        assert!(validate_socket_addr("127.0.0.1:0").is_ok());
        assert!(validate_socket_addr("localhost").is_err());
        assert!(validate_socket_addr("0.0.0.0:99999").is_err());
    }
}
