//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Whether to enable console output (for development)
    pub console_output: bool,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,

    /// Deployment environment (dev, staging, production)
    pub environment: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "ncf-sequencing".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            environment: "dev".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `NCF_SERVICE_NAME`: Service name (default: ncf-sequencing)
    /// - `NCF_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `NCF_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `NCF_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    /// - `NCF_ENVIRONMENT`: Environment name (default: dev)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("NCF_SERVICE_NAME")
                .unwrap_or_else(|_| "ncf-sequencing".to_string()),

            log_level: env::var("NCF_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: env::var("NCF_CONSOLE_OUTPUT")
                .map(|v| parse_flag(&v, true))
                .unwrap_or(true),

            json_logs: env::var("NCF_JSON_LOGS")
                .map(|v| parse_flag(&v, false))
                .unwrap_or(is_container),

            environment: env::var("NCF_ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()),
        }
    }

    /// Configuration suited to test binaries: debug level, plain text.
    pub fn for_testing() -> Self {
        Self {
            log_level: "debug".to_string(),
            environment: "test".to_string(),
            ..Self::default()
        }
    }
}

/// Interpret a boolean environment flag, falling back to `default` for
/// anything that is neither truthy nor falsy.
fn parse_flag(value: &str, default: bool) -> bool {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}
