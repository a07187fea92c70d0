use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use twilio::TwilioOptions;

use crate::domains::auth::code::DEV_CODE;

/// Deployment environment (`APP_ENV`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Dev,
    Test,
    Prod,
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Self::Dev),
            "test" => Ok(Self::Test),
            "prod" | "production" => Ok(Self::Prod),
            other => bail!("unknown APP_ENV '{other}' (expected dev, test or prod)"),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub port: u16,
    /// Absent: sessions are kept in memory (not allowed in prod)
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_ttl: chrono::Duration,
    pub session_ttl: chrono::Duration,
    pub session_sweep_cron: String,
    pub request_timeout: Duration,
    /// Bound for each session store or SMS provider call
    pub call_timeout: Duration,
    /// Send this code instead of a random one (dev/test only)
    pub fixed_sms_code: Option<i32>,
    /// Absent: codes are logged instead of sent (not allowed in prod)
    pub twilio: Option<TwilioOptions>,
    /// Empty: any origin
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = match var("APP_ENV") {
            Some(value) => value.parse()?,
            None => Environment::default(),
        };

        let fixed_sms_code = match var("FIXED_SMS_CODE") {
            Some(value) => Some(
                value
                    .parse::<i32>()
                    .context("FIXED_SMS_CODE must be a 4-digit number")?,
            ),
            None if environment == Environment::Test => Some(DEV_CODE),
            None => None,
        };

        let twilio = match (
            var("TWILIO_ACCOUNT_SID"),
            var("TWILIO_AUTH_TOKEN"),
            var("TWILIO_FROM_NUMBER"),
        ) {
            (Some(account_sid), Some(auth_token), Some(from_number)) => Some(TwilioOptions {
                account_sid,
                auth_token,
                from_number,
            }),
            (None, None, None) => None,
            _ => bail!(
                "TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN and TWILIO_FROM_NUMBER must be set together"
            ),
        };

        let config = Self {
            environment,
            port: parse_or(&var, "PORT", 8080)?,
            database_url: var("DATABASE_URL"),
            jwt_secret: var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: var("JWT_ISSUER").unwrap_or_else(|| "phone-auth".to_string()),
            jwt_ttl: chrono::Duration::hours(parse_or(&var, "JWT_TTL_HOURS", 24)?),
            session_ttl: chrono::Duration::seconds(parse_or(&var, "SESSION_TTL_SECS", 300)?),
            session_sweep_cron: var("SESSION_SWEEP_CRON")
                .unwrap_or_else(|| "0 * * * * *".to_string()),
            request_timeout: Duration::from_secs(parse_or(&var, "REQUEST_TIMEOUT_SECS", 4)?),
            call_timeout: Duration::from_millis(parse_or(&var, "CALL_TIMEOUT_MS", 1000)?),
            fixed_sms_code,
            twilio,
            allowed_origins: var("ALLOWED_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.session_ttl <= chrono::Duration::zero() {
            bail!("SESSION_TTL_SECS must be positive");
        }
        if self.jwt_ttl <= chrono::Duration::zero() {
            bail!("JWT_TTL_HOURS must be positive");
        }
        if self.call_timeout.is_zero() || self.request_timeout.is_zero() {
            bail!("CALL_TIMEOUT_MS and REQUEST_TIMEOUT_SECS must be positive");
        }
        // send-code makes up to three bounded calls: create, send, compensating delete
        if self.request_timeout <= self.call_timeout * 3 {
            bail!(
                "REQUEST_TIMEOUT_SECS ({:?}) must exceed three times CALL_TIMEOUT_MS ({:?})",
                self.request_timeout,
                self.call_timeout
            );
        }

        if self.environment == Environment::Prod {
            if self.database_url.is_none() {
                bail!("DATABASE_URL must be set in prod");
            }
            if self.twilio.is_none() {
                bail!("Twilio credentials must be set in prod");
            }
            if self.fixed_sms_code.is_some() {
                bail!("FIXED_SMS_CODE is not allowed in prod");
            }
        }

        Ok(())
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a valid number")),
        None => Ok(default),
    }
}
