use std::{collections::HashMap, fs};

use anyhow::Context;

const DEFAULT_CONFIG_PATH: &str = "login_demo.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub gateway_latency_ms: u64,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gateway_latency_ms: 1000,
            log_filter: "info".into(),
        }
    }
}

/// Defaults, then `login_demo.toml` (or `APP__CONFIG_PATH`), then `APP__*` env vars.
pub fn load_settings() -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let path = std::env::var("APP__CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    if let Ok(raw) = fs::read_to_string(&path) {
        apply_file(&mut settings, &raw)
            .with_context(|| format!("failed to parse config file '{path}'"))?;
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg = toml::from_str::<HashMap<String, toml::Value>>(raw)?;

    if let Some(v) = file_cfg.get("gateway_latency_ms") {
        let latency = v
            .as_integer()
            .and_then(|v| u64::try_from(v).ok())
            .context("gateway_latency_ms must be a non-negative integer")?;
        settings.gateway_latency_ms = latency;
    }
    if let Some(v) = file_cfg.get("log_filter") {
        settings.log_filter = v
            .as_str()
            .context("log_filter must be a string")?
            .to_string();
    }

    Ok(())
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("APP__GATEWAY_LATENCY_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.gateway_latency_ms = parsed;
        }
    }
    if let Some(v) = lookup("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
}
