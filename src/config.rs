use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::{env, path::PathBuf};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Explicit catalog file; overrides the assets directory lookup
    pub catalog_path: Option<PathBuf>,
    pub assets_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            catalog_path: None,
            assets_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            catalog_path: env::var("CATALOG_PATH").ok().map(PathBuf::from),
            assets_dir: env::var("ASSETS_DIR").ok().map(PathBuf::from),
        })
    }
}
