//! API configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use domain_validation::{CircuitBreakerConfig, ResilienceConfig, RetryConfig};

/// API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Log level
    pub log_level: String,
    /// Absolute timeout per validation attempt, seconds
    pub validation_timeout_secs: u64,
    /// Retries after the initial validation attempt
    pub validation_max_retries: u32,
    /// First retry delay, seconds (doubles on each retry)
    pub validation_retry_delay_secs: u64,
    /// Consecutive failures before a validator's circuit opens
    pub breaker_failure_threshold: u32,
    /// Seconds the circuit stays open before the half-open probe
    pub breaker_open_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            validation_timeout_secs: 10,
            validation_max_retries: 3,
            validation_retry_delay_secs: 2,
            breaker_failure_threshold: 5,
            breaker_open_secs: 30,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Config::try_from(&ApiConfig::default())?)
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Resilience policy settings for one validation client
    pub fn resilience(&self) -> ResilienceConfig {
        ResilienceConfig {
            retry: RetryConfig {
                max_retries: self.validation_max_retries,
                initial_delay: Duration::from_secs(self.validation_retry_delay_secs),
            },
            breaker: CircuitBreakerConfig {
                failure_threshold: self.breaker_failure_threshold,
                open_duration: Duration::from_secs(self.breaker_open_secs),
            },
            attempt_timeout: Duration::from_secs(self.validation_timeout_secs),
        }
    }
}
