//! Runtime configuration, read from the environment (and `.env` when present)

use anyhow::{Context, Result};
use reqwest::Url;
use std::path::PathBuf;

use crate::services::pawapay::SANDBOX_BASE_URL;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/transactions.db?mode=rwc";

#[derive(Debug, Clone)]
pub struct Config {
    pub pawapay_base_url: Url,
    pub pawapay_api_token: String,
    pub port: u16,
    pub database_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let pawapay_api_token = lookup("PAWAPAY_API_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .context("PAWAPAY_API_TOKEN must be set")?;

        let base_url = lookup("PAWAPAY_BASE_URL").unwrap_or_else(|| SANDBOX_BASE_URL.to_string());
        let pawapay_base_url = Url::parse(&base_url)
            .with_context(|| format!("PAWAPAY_BASE_URL is not a valid URL: {}", base_url))?;

        let port = match lookup("PORT") {
            Some(port) => port
                .parse()
                .with_context(|| format!("PORT is not a valid port number: {}", port))?,
            None => DEFAULT_PORT,
        };

        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        Ok(Self {
            pawapay_base_url,
            pawapay_api_token,
            port,
            database_url,
        })
    }

    /// Directory that must exist before a file-backed SQLite database can be opened
    pub fn sqlite_data_dir(&self) -> Option<PathBuf> {
        let rest = self
            .database_url
            .strip_prefix("sqlite://")
            .or_else(|| self.database_url.strip_prefix("sqlite:"))?;
        let path = rest.split('?').next().unwrap_or_default();

        if path.is_empty() || path == ":memory:" {
            return None;
        }

        PathBuf::from(path)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
    }
}
