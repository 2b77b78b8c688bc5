//! Application configuration module
//! Handles environment variable loading, configuration validation, and application settings

use std::env;

use crate::payments::providers::midtrans::{
    PRODUCTION_API_BASE_URL, PRODUCTION_SNAP_BASE_URL, SANDBOX_API_BASE_URL,
    SANDBOX_SNAP_BASE_URL,
};

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub gateway: GatewayConfig,
    pub checkout: CheckoutConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Payment gateway configuration
#[derive(Clone)]
pub struct GatewayConfig {
    pub server_key: String,
    pub client_key: Option<String>,
    pub is_production: bool,
    pub api_base_url_override: Option<String>,
    pub snap_base_url_override: Option<String>,
    pub timeout_secs: u64,
}

/// Order creation rules
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub min_amount: i64,
    pub expiry_minutes: u32,
    pub reject_terminal_regression: bool,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log format options
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Plain,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        let _ = dotenv::dotenv().ok();

        Ok(AppConfig {
            server: ServerConfig::from_env()?,
            gateway: GatewayConfig::from_env()?,
            checkout: CheckoutConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.gateway.validate()?;
        self.checkout.validate()?;
        self.logging.validate()?;

        Ok(())
    }
}

fn parse_bool(name: &str, default: &str) -> Result<bool, ConfigError> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .trim()
        .to_lowercase()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name.to_string()))
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(ServerConfig {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue("PORT cannot be 0".to_string()));
        }

        if self.host.is_empty() {
            return Err(ConfigError::InvalidValue("HOST cannot be empty".to_string()));
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(GatewayConfig {
            server_key: non_empty("MIDTRANS_SERVER_KEY")
                .ok_or_else(|| ConfigError::MissingVariable("MIDTRANS_SERVER_KEY".to_string()))?,
            client_key: non_empty("MIDTRANS_CLIENT_KEY"),
            is_production: parse_bool("MIDTRANS_IS_PRODUCTION", "false")?,
            api_base_url_override: non_empty("MIDTRANS_API_BASE_URL"),
            snap_base_url_override: non_empty("MIDTRANS_SNAP_BASE_URL"),
            timeout_secs: env::var("GATEWAY_TIMEOUT_SECS")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("GATEWAY_TIMEOUT_SECS".to_string()))?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server_key.trim().is_empty() {
            return Err(ConfigError::MissingVariable("MIDTRANS_SERVER_KEY".to_string()));
        }

        for url in [self.api_base_url(), self.snap_base_url()] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidValue(format!(
                    "gateway URL must be http(s): {}",
                    url
                )));
            }
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "GATEWAY_TIMEOUT_SECS".to_string(),
            ));
        }

        Ok(())
    }

    pub fn api_base_url(&self) -> String {
        self.api_base_url_override.clone().unwrap_or_else(|| {
            if self.is_production {
                PRODUCTION_API_BASE_URL.to_string()
            } else {
                SANDBOX_API_BASE_URL.to_string()
            }
        })
    }

    pub fn snap_base_url(&self) -> String {
        self.snap_base_url_override.clone().unwrap_or_else(|| {
            if self.is_production {
                PRODUCTION_SNAP_BASE_URL.to_string()
            } else {
                SANDBOX_SNAP_BASE_URL.to_string()
            }
        })
    }

    /// Browser script that opens the Snap popup.
    pub fn snap_js_url(&self) -> String {
        format!("{}/snap.js", self.snap_base_url().trim_end_matches('/'))
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("server_key", &crate::logging::mask_secret(&self.server_key))
            .field("client_key", &self.client_key)
            .field("is_production", &self.is_production)
            .field("api_base_url", &self.api_base_url())
            .field("snap_base_url", &self.snap_base_url())
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            min_amount: 1000,
            expiry_minutes: 15,
            reject_terminal_regression: false,
        }
    }
}

impl CheckoutConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(CheckoutConfig {
            min_amount: env::var("CHECKOUT_MIN_AMOUNT")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("CHECKOUT_MIN_AMOUNT".to_string()))?,
            expiry_minutes: env::var("CHECKOUT_EXPIRY_MINUTES")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("CHECKOUT_EXPIRY_MINUTES".to_string()))?,
            reject_terminal_regression: parse_bool("CHECKOUT_REJECT_TERMINAL_REGRESSION", "false")?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_amount <= 0 {
            return Err(ConfigError::ValidationFailed(
                "CHECKOUT_MIN_AMOUNT must be positive".to_string(),
            ));
        }

        if self.expiry_minutes == 0 {
            return Err(ConfigError::ValidationFailed(
                "CHECKOUT_EXPIRY_MINUTES must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

impl LoggingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "INFO".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "plain".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Plain,
            },
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];
        if !valid_levels.contains(&self.level.to_uppercase().as_str()) {
            return Err(ConfigError::InvalidValue("LOG_LEVEL".to_string()));
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),

    #[error("Invalid value for configuration: {0}")]
    InvalidValue(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> GatewayConfig {
        GatewayConfig {
            server_key: "SB-Mid-server-abc".to_string(),
            client_key: Some("SB-Mid-client-abc".to_string()),
            is_production: false,
            api_base_url_override: None,
            snap_base_url_override: None,
            timeout_secs: 15,
        }
    }

    #[test]
    fn test_server_config_validation() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
        };

        assert!(config.validate().is_ok());
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_invalid_port_validation() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_gateway_urls_follow_environment() {
        let sandbox = gateway();
        assert_eq!(sandbox.api_base_url(), SANDBOX_API_BASE_URL);
        assert_eq!(
            sandbox.snap_js_url(),
            "https://app.sandbox.midtrans.com/snap/snap.js"
        );

        let production = GatewayConfig {
            is_production: true,
            ..gateway()
        };
        assert_eq!(production.api_base_url(), PRODUCTION_API_BASE_URL);
        assert_eq!(production.snap_base_url(), PRODUCTION_SNAP_BASE_URL);

        let overridden = GatewayConfig {
            api_base_url_override: Some("http://localhost:9000".to_string()),
            ..gateway()
        };
        assert_eq!(overridden.api_base_url(), "http://localhost:9000");
    }

    #[test]
    fn test_gateway_validation() {
        assert!(gateway().validate().is_ok());
        assert!(GatewayConfig {
            server_key: " ".to_string(),
            ..gateway()
        }
        .validate()
        .is_err());
        assert!(GatewayConfig {
            snap_base_url_override: Some("ftp://nope".to_string()),
            ..gateway()
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_server_key_is_not_printed() {
        let printed = format!("{:?}", gateway());
        assert!(!printed.contains("SB-Mid-server-abc"));
    }

    #[test]
    fn test_checkout_validation() {
        assert!(CheckoutConfig::default().validate().is_ok());
        assert!(CheckoutConfig {
            min_amount: 0,
            ..CheckoutConfig::default()
        }
        .validate()
        .is_err());
    }
}
