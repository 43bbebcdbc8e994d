use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono_tz::Tz;

/// Service configuration, loaded once at startup from the environment.
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | DATABASE_URL | (required) | PostgreSQL connection string |
/// | PORT | 3000 | HTTP listen port |
/// | UPLOAD_DIR | static/images | directory for uploaded menu images |
/// | BUSINESS_TIMEZONE | Europe/Warsaw | zone for daily order numbers and displayed times |
/// | MENU_CATEGORIES | (built-in list) | comma-separated category labels, in display order |
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub http: HttpConfig,
    pub uploads: UploadsConfig,
    pub business: BusinessConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct UploadsConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct BusinessConfig {
    /// The "daily" boundary of order numbers follows this zone, not UTC.
    pub timezone: Tz,
    /// Category labels shown on the menu, in order. Deployment data.
    pub menu_categories: Vec<String>,
}

const DEFAULT_CATEGORIES: &[&str] = &[
    "Daily lunch",
    "Daily dessert",
    "Breakfast",
    "Soups",
    "Salads",
    "Hot dishes",
    "Starters",
    "Desserts",
    "Drinks",
];

pub fn load() -> Result<Config> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    let upload_dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "static/images".into());

    let timezone: Tz = std::env::var("BUSINESS_TIMEZONE")
        .unwrap_or_else(|_| "Europe/Warsaw".into())
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid BUSINESS_TIMEZONE: {e}"))?;

    let menu_categories = match std::env::var("MENU_CATEGORIES") {
        Ok(raw) => raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Err(_) => DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect(),
    };

    Ok(Config {
        database: DatabaseConfig { url: database_url },
        http: HttpConfig { port },
        uploads: UploadsConfig {
            dir: PathBuf::from(upload_dir),
        },
        business: BusinessConfig {
            timezone,
            menu_categories,
        },
    })
}
