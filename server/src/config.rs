use std::{str::FromStr, time::Duration};

use anyhow::{Context, Result, anyhow};
use platform_gateway::GatewayConfig;
use products_usuarios::DirectoryConfig;

const DEFAULT_API_URL: &str = "http://localhost:3001/usuarios";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_url: String,
    pub sector: i64,
    pub page_size: u32,
    pub default_page: u32,
    pub request_timeout: Duration,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = lookup("API_URL")
            .map(|val| val.trim().to_string())
            .filter(|val| !val.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.into());

        let sector = env_parse(&lookup, "USUARIOS_SECTOR", 7000)?;
        let page_size = env_parse(&lookup, "USUARIOS_PAGE_LIMIT", 10u32)?;
        if page_size == 0 {
            return Err(anyhow!("USUARIOS_PAGE_LIMIT must be greater than zero"));
        }
        let default_page = env_parse(&lookup, "USUARIOS_DEFAULT_PAGE", 1u32)?;
        if default_page == 0 {
            return Err(anyhow!("USUARIOS_DEFAULT_PAGE is 1-based"));
        }
        let timeout_secs = env_parse(&lookup, "REQUEST_TIMEOUT_SECS", 30u64)?;

        Ok(Self {
            api_url,
            sector,
            page_size,
            default_page,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn gateway(&self) -> GatewayConfig {
        GatewayConfig::new(self.api_url.clone()).with_timeout(self.request_timeout)
    }

    pub fn directory(&self) -> DirectoryConfig {
        DirectoryConfig {
            sector: self.sector,
            page_size: self.page_size,
            default_page: self.default_page,
        }
    }
}

fn env_parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid {key}: `{raw}`")),
        _ => Ok(default),
    }
}
