use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub demo: DemoConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

/// Document store settings. Without `path` the store lives in memory only.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { path: None, channel_capacity: default_channel_capacity() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DemoConfig {
    #[serde(default = "default_stream_period_ms")]
    pub stream_period_ms: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self { stream_period_ms: default_stream_period_ms() }
    }
}

impl DemoConfig {
    pub fn stream_period(&self) -> Duration {
        Duration::from_millis(self.stream_period_ms)
    }
}

fn default_channel_capacity() -> usize { 16 }
fn default_stream_period_ms() -> u64 { 1000 }

/// Read the file named by `CONFIG_PATH` (default `config.toml`); defaults when it does not exist.
pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    if Path::new(&path).exists() {
        load_from_file(&path)
    } else {
        Ok(AppConfig::default())
    }
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// File (when present) + environment overrides, normalized and validated.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.apply_overrides(|key| std::env::var(key).ok())?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Apply `SERVER_HOST`, `SERVER_PORT`, `TOKIO_WORKER_THREADS`, `STORE_PATH`,
    /// `STORE_CHANNEL_CAPACITY` and `DEMO_STREAM_PERIOD_MS` from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            self.server.port = parse_var("SERVER_PORT", &port)?;
        }
        if let Some(threads) = lookup("TOKIO_WORKER_THREADS") {
            self.server.worker_threads = Some(parse_var("TOKIO_WORKER_THREADS", &threads)?);
        }
        if let Some(path) = lookup("STORE_PATH") {
            self.store.path = if path.trim().is_empty() { None } else { Some(path) };
        }
        if let Some(capacity) = lookup("STORE_CHANNEL_CAPACITY") {
            self.store.channel_capacity = parse_var("STORE_CHANNEL_CAPACITY", &capacity)?;
        }
        if let Some(period) = lookup("DEMO_STREAM_PERIOD_MS") {
            self.demo.stream_period_ms = parse_var("DEMO_STREAM_PERIOD_MS", &period)?;
        }
        Ok(())
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.store.validate()?;
        self.demo.validate()?;
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| anyhow!("{key} has an invalid value: {raw:?}"))
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(w) if w > 0 => {}
            _ => self.worker_threads = Some(4),
        }
        Ok(())
    }
}

impl StoreConfig {
    fn validate(&self) -> Result<()> {
        if self.channel_capacity == 0 {
            return Err(anyhow!("store.channel_capacity must be >= 1"));
        }
        Ok(())
    }
}

impl DemoConfig {
    fn validate(&self) -> Result<()> {
        if self.stream_period_ms == 0 {
            return Err(anyhow!("demo.stream_period_ms must be >= 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn parses_partial_toml_with_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [store]
            path = "data/movie_infos.json"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.store.path.as_deref(), Some("data/movie_infos.json"));
        assert_eq!(cfg.store.channel_capacity, 16);
        assert_eq!(cfg.demo.stream_period(), Duration::from_secs(1));
    }

    #[test]
    fn overrides_win_over_file_values() {
        let vars: HashMap<&str, &str> = [
            ("SERVER_PORT", "7070"),
            ("STORE_PATH", ""),
            ("DEMO_STREAM_PERIOD_MS", "25"),
        ]
        .into_iter()
        .collect();
        let mut cfg = AppConfig::default();
        cfg.store.path = Some("somewhere.json".into());
        cfg.apply_overrides(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.server.port, 7070);
        assert!(cfg.store.path.is_none());
        assert_eq!(cfg.demo.stream_period_ms, 25);
    }

    #[test]
    fn rejects_unparsable_override() {
        let mut cfg = AppConfig::default();
        let err = cfg
            .apply_overrides(|k| (k == "SERVER_PORT").then(|| "eighty".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("SERVER_PORT"));
    }

    #[test]
    fn load_default_reads_config_path_or_falls_back() {
        let dir = std::env::temp_dir().join(format!("configs_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("app.toml");
        std::fs::write(&file, "[demo]\nstream_period_ms = 40\n").unwrap();

        std::env::set_var("CONFIG_PATH", &file);
        let from_file = load_default().unwrap();
        std::env::set_var("CONFIG_PATH", dir.join("missing.toml"));
        let fallback = load_default().unwrap();
        std::env::remove_var("CONFIG_PATH");

        assert_eq!(from_file.demo.stream_period_ms, 40);
        assert_eq!(fallback.demo.stream_period_ms, 1000);
        assert_eq!(fallback.server.port, 8080);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn normalize_fills_host_and_threads() {
        let mut cfg = AppConfig::default();
        cfg.server.host = " ".into();
        cfg.server.worker_threads = Some(0);
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.worker_threads, Some(4));

        cfg.demo.stream_period_ms = 0;
        assert!(cfg.normalize_and_validate().is_err());
    }
}
