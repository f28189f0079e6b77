use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoyaltyTier {
    /// Inclusive lower bound of the tier, subtotal in cents.
    pub min_subtotal: i64,
    pub percent: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Hour (0-23) from which the evening delivery surcharge applies.
    pub evening_start_hour: u32,
    /// Hour (0-23) up to which the early-morning surcharge still applies.
    pub early_morning_end_hour: u32,
    /// Flat delivery surcharge in cents.
    pub delivery_charge: i64,
    /// Ascending spend tiers; subtotal at or above a tier earns its percent.
    pub loyalty_tiers: Vec<LoyaltyTier>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            evening_start_hour: 19,
            early_morning_end_hour: 5,
            delivery_charge: 5_000,
            loyalty_tiers: vec![
                LoyaltyTier {
                    min_subtotal: 100_000,
                    percent: 10,
                },
                LoyaltyTier {
                    min_subtotal: 150_000,
                    percent: 12,
                },
                LoyaltyTier {
                    min_subtotal: 200_000,
                    percent: 13,
                },
                LoyaltyTier {
                    min_subtotal: 300_000,
                    percent: 15,
                },
            ],
        }
    }
}

impl PricingConfig {
    pub fn validate(&self) -> AppResult<()> {
        if self.evening_start_hour > 23 || self.early_morning_end_hour > 23 {
            return Err(AppError::ConfigError(
                "Delivery window hours must be within 0-23".to_string(),
            ));
        }
        if self.delivery_charge < 0 {
            return Err(AppError::ConfigError(
                "Delivery charge must not be negative".to_string(),
            ));
        }
        let ascending = self
            .loyalty_tiers
            .windows(2)
            .all(|w| w[0].min_subtotal < w[1].min_subtotal);
        if !ascending {
            return Err(AppError::ConfigError(
                "Loyalty tier thresholds must be strictly increasing".to_string(),
            ));
        }
        if self.loyalty_tiers.iter().any(|t| !(0..=100).contains(&t.percent)) {
            return Err(AppError::ConfigError(
                "Loyalty tier percent must be within 0-100".to_string(),
            ));
        }
        Ok(())
    }
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                // Config file present: parse it, env overrides applied below
                toml::from_str(&config_str)
                    .map_err(|e| format!("Failed to parse config file: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // No config file: build from environment with defaults
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                // The database URL has no sensible default
                let database_url = get_env("DATABASE_URL")
                    .ok_or("Missing DATABASE_URL and no config.toml found")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    pricing: PricingConfig {
                        evening_start_hour: get_env_parse("PRICING_EVENING_START_HOUR", 19u32),
                        early_morning_end_hour: get_env_parse(
                            "PRICING_EARLY_MORNING_END_HOUR",
                            5u32,
                        ),
                        delivery_charge: get_env_parse("PRICING_DELIVERY_CHARGE", 5_000i64),
                        loyalty_tiers: PricingConfig::default().loyalty_tiers,
                    },
                }
            }
            Err(e) => return Err(Box::new(e)),
        };

        // Environment overrides apply even when the file exists
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("PRICING_EVENING_START_HOUR")
            && let Ok(h) = v.parse()
        {
            config.pricing.evening_start_hour = h;
        }
        if let Ok(v) = env::var("PRICING_EARLY_MORNING_END_HOUR")
            && let Ok(h) = v.parse()
        {
            config.pricing.early_morning_end_hour = h;
        }
        if let Ok(v) = env::var("PRICING_DELIVERY_CHARGE")
            && let Ok(c) = v.parse()
        {
            config.pricing.delivery_charge = c;
        }

        config.pricing.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_overrides_win_over_config_file() {
        let path = std::env::temp_dir().join("restro-backend-config-override.toml");
        std::fs::write(
            &path,
            concat!(
                "[server]\nhost = \"127.0.0.1\"\nport = 8080\n\n",
                "[database]\nurl = \"sqlite::memory:\"\nmax_connections = 10\n",
            ),
        )
        .unwrap();

        unsafe {
            env::set_var("CONFIG_PATH", &path);
            env::set_var("PRICING_DELIVERY_CHARGE", "7500");
        }
        let config = Config::from_toml().unwrap();
        unsafe {
            env::remove_var("CONFIG_PATH");
            env::remove_var("PRICING_DELIVERY_CHARGE");
        }
        std::fs::remove_file(&path).ok();

        assert_eq!(config.pricing.delivery_charge, 7_500);
        // Untouched fields keep their file / default values
        assert_eq!(config.pricing.evening_start_hour, 19);
    }

    #[test]
    fn test_validation_rejects_unsorted_tiers() {
        let mut pricing = PricingConfig::default();
        pricing.loyalty_tiers.reverse();
        assert!(pricing.validate().is_err());

        assert!(PricingConfig::default().validate().is_ok());
    }
}
