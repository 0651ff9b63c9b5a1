use derive_more::Display;
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

use crate::payroll::accrual::AccrualModel;

#[derive(Debug, Display)]
pub enum ConfigError {
    #[display(fmt = "{} must be set", _0)]
    Missing(&'static str),
    #[display(fmt = "{} has an invalid value: {}", key, value)]
    Invalid { key: &'static str, value: String },
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    MySql,
    Memory,
}

#[derive(Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_register_per_min: u32,
    pub rate_refresh_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    // Payroll
    pub accrual_model: AccrualModel,
    pub overtime_hourly_bonus: i64,
    pub overtime_hours_per_shift: u32,
    pub fullday_default_rate: i64,
    pub admin_emails: Vec<String>,

    // Notifications
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,

    pub log_dir: String,
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn optional(key: &'static str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { key, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Splits a comma separated list of emails, lowercased.
pub fn parse_email_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let store_backend = match env::var("STORE_BACKEND").as_deref() {
            Ok("memory") => StoreBackend::Memory,
            Ok("mysql") | Err(_) => StoreBackend::MySql,
            Ok(other) => {
                return Err(ConfigError::Invalid {
                    key: "STORE_BACKEND",
                    value: other.to_string(),
                });
            }
        };

        let database_url = match store_backend {
            StoreBackend::MySql => Some(required("DATABASE_URL")?),
            StoreBackend::Memory => optional("DATABASE_URL"),
        };

        let accrual_model = match env::var("ACCRUAL_MODEL") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "ACCRUAL_MODEL",
                value: raw,
            })?,
            Err(_) => AccrualModel::FulldayPremium,
        };

        Ok(Self {
            store_backend,
            database_url,
            server_addr: required("SERVER_ADDR")?,
            jwt_secret: required("JWT_SECRET")?,
            access_token_ttl: parsed_or("ACCESS_TOKEN_TTL", 900)?, // default 15 min
            refresh_token_ttl: parsed_or("REFRESH_TOKEN_TTL", 604_800)?, // default 7 days

            rate_login_per_min: parsed_or("RATE_LOGIN_PER_MIN", 60)?,
            rate_register_per_min: parsed_or("RATE_REGISTER_PER_MIN", 30)?,
            rate_refresh_per_min: parsed_or("RATE_REFRESH_PER_MIN", 30)?,
            rate_protected_per_min: parsed_or("RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            accrual_model,
            overtime_hourly_bonus: parsed_or("OVERTIME_HOURLY_BONUS", 60)?,
            overtime_hours_per_shift: parsed_or("OVERTIME_HOURS_PER_SHIFT", 4)?,
            fullday_default_rate: parsed_or("FULLDAY_DEFAULT_RATE", 450)?,
            admin_emails: optional("ADMIN_EMAILS")
                .map(|raw| parse_email_list(&raw))
                .unwrap_or_default(),

            telegram_bot_token: optional("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: optional("TELEGRAM_CHAT_ID"),

            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
        })
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        let email = email.to_lowercase();
        self.admin_emails.iter().any(|e| *e == email)
    }
}

#[cfg(test)]
impl Config {
    /// Memory-backed configuration used by handler and ledger tests.
    pub fn for_tests(accrual_model: AccrualModel) -> Self {
        Self {
            store_backend: StoreBackend::Memory,
            database_url: None,
            jwt_secret: "test-secret".to_string(),
            server_addr: "127.0.0.1:0".to_string(),
            access_token_ttl: 900,
            refresh_token_ttl: 3600,
            rate_login_per_min: 1000,
            rate_register_per_min: 1000,
            rate_refresh_per_min: 1000,
            rate_protected_per_min: 1000,
            api_prefix: "/api".to_string(),
            accrual_model,
            overtime_hourly_bonus: 60,
            overtime_hours_per_shift: 4,
            fullday_default_rate: 450,
            admin_emails: vec!["boss@example.com".to_string()],
            telegram_bot_token: None,
            telegram_chat_id: None,
            log_dir: "logs".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_list_is_trimmed_and_lowercased() {
        let emails = parse_email_list(" Boss@Example.com, ,hr@example.com ");
        assert_eq!(emails, vec!["boss@example.com", "hr@example.com"]);
    }

    #[test]
    fn admin_email_match_ignores_case() {
        let config = Config::for_tests(AccrualModel::HourlyOvertime);
        assert!(config.is_admin_email("BOSS@example.com"));
        assert!(!config.is_admin_email("worker@example.com"));
    }
}
