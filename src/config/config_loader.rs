use std::{collections::HashMap, str::FromStr};

use anyhow::{Context, Result, bail};

use super::config_model::{Database, DotEnvyConfig, Server};

/// Reads `.env` (if present) and the process environment. Process values win.
/// Nothing is written back into the environment.
pub fn load() -> Result<DotEnvyConfig> {
    let mut source: HashMap<String, String> = HashMap::new();

    if let Ok(entries) = dotenvy::dotenv_iter() {
        for entry in entries {
            let (key, value) = entry.context("failed to parse .env file")?;
            source.insert(key, value);
        }
    }

    source.extend(std::env::vars());

    from_source(&source)
}

pub fn from_source(source: &HashMap<String, String>) -> Result<DotEnvyConfig> {
    let server = Server {
        host: string_or(source, "SERVER_HOST", "0.0.0.0"),
        port: parse_or(source, "SERVER_PORT", 8080)?,
        body_limit: parse_or(source, "SERVER_BODY_LIMIT", 10)?,
        timeout: parse_or(source, "SERVER_TIMEOUT", 30)?,
    };

    let database = Database {
        url: database_url(source),
        run_migrations: bool_or(source, "DB_RUN_MIGRATIONS", true)?,
    };

    Ok(DotEnvyConfig { server, database })
}

fn database_url(source: &HashMap<String, String>) -> String {
    if let Some(url) = lookup(source, "DATABASE_URL") {
        return url.to_string();
    }

    format!(
        "postgres://{}:{}@{}:{}/{}?sslmode={}",
        string_or(source, "DB_USER", "postgres"),
        string_or(source, "DB_PASSWORD", "password"),
        string_or(source, "DB_HOST", "localhost"),
        string_or(source, "DB_PORT", "5432"),
        string_or(source, "DB_NAME", "subscription_service"),
        string_or(source, "DB_SSLMODE", "disable"),
    )
}

fn lookup<'a>(source: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    source
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn string_or(source: &HashMap<String, String>, key: &str, default: &str) -> String {
    lookup(source, key).unwrap_or(default).to_string()
}

fn parse_or<T>(source: &HashMap<String, String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(source, key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} is invalid: {raw:?}")),
        None => Ok(default),
    }
}

fn bool_or(source: &HashMap<String, String>, key: &str, default: bool) -> Result<bool> {
    let Some(raw) = lookup(source, key) else {
        return Ok(default);
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Ok(false),
        _ => bail!("{key} is invalid: {raw:?}"),
    }
}
