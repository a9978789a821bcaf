use crate::error::ConfigError;
use crate::provider::ProviderConfig;

use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing_subscriber::filter::LevelFilter;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_EXTRACTION_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_EXTRACTION_MODEL: &str = "llama3-8b-8192";
pub const DEFAULT_EXTRACTION_TEMPERATURE: f32 = 0.2;

#[derive(Debug, Clone, PartialEq)]
pub enum StoreConfig {
    Postgres {
        database_url: String,
    },
    Supabase {
        url: String,
        service_role_key: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub log_level: LevelFilter,
    pub provider: ProviderConfig,
    pub store: StoreConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup.  Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = parse_or("PORT", get("PORT"), DEFAULT_PORT)?;
        let log_level = parse_or("LOG_LEVEL", get("LOG_LEVEL"), LevelFilter::DEBUG)?;

        let provider = ProviderConfig {
            api_url: get("EXTRACTION_API_URL")
                .unwrap_or_else(|| DEFAULT_EXTRACTION_API_URL.to_string()),
            api_key: get("API_KEY").ok_or(ConfigError::Missing("API_KEY"))?,
            model: get("EXTRACTION_MODEL").unwrap_or_else(|| DEFAULT_EXTRACTION_MODEL.to_string()),
            temperature: parse_or(
                "EXTRACTION_TEMPERATURE",
                get("EXTRACTION_TEMPERATURE"),
                DEFAULT_EXTRACTION_TEMPERATURE,
            )?,
            timeout: get("EXTRACTION_TIMEOUT_SECS")
                .map(|v| parse::<u64>("EXTRACTION_TIMEOUT_SECS", v))
                .transpose()?
                .map(Duration::from_secs),
        };

        let store = match (
            get("DATABASE_URL"),
            get("SUPABASE_URL"),
            get("SUPABASE_SERVICE_ROLE_KEY"),
        ) {
            (Some(database_url), _, _) => StoreConfig::Postgres { database_url },
            (None, Some(url), Some(service_role_key)) => StoreConfig::Supabase {
                url,
                service_role_key,
            },
            (None, Some(_), None) => return Err(ConfigError::Missing("SUPABASE_SERVICE_ROLE_KEY")),
            (None, None, _) => return Err(ConfigError::NoStore),
        };

        Ok(Self {
            port,
            log_level,
            provider,
            store,
        })
    }
}

fn parse<T: FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { var, value })
}

fn parse_or<T: FromStr>(
    var: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    value.map(|v| parse(var, v)).unwrap_or(Ok(default))
}
