use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use crate::source::mediawiki::{language_api_url, SourceSettings};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct WikigraphConfig {
    pub server: ServerConfig,
    pub source: SourceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourceConfig {
    /// Wikipedia language edition, e.g. `en`, `es`
    pub language: String,
    /// Explicit `api.php` URL; overrides `language`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Items per image/link request; unset means the API maximum
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_limit: Option<u32>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            api_url: None,
            user_agent: concat!("wikigraph/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 30,
            batch_limit: None,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid host {:?}: {}", self.host, e))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl SourceConfig {
    pub fn settings(&self) -> anyhow::Result<SourceSettings> {
        let mut settings = match &self.api_url {
            Some(url) => SourceSettings::for_api_url(url)?,
            None => SourceSettings::for_language(&self.language)?,
        };
        settings.user_agent = self.user_agent.clone();
        settings.timeout = Duration::from_secs(self.timeout_secs.max(1));
        settings.batch_limit = self.batch_limit;
        Ok(settings)
    }

    /// Human-readable endpoint, for banners
    pub fn endpoint(&self) -> String {
        match &self.api_url {
            Some(url) => url.clone(),
            None => language_api_url(&self.language)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| format!("<invalid language {:?}>", self.language)),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("wikigraph.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<WikigraphConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: WikigraphConfig = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Load the config file if present, otherwise defaults.
///
/// An explicitly named file must exist.
pub fn resolve_config(path: Option<&Path>) -> anyhow::Result<WikigraphConfig> {
    match (load_config(path)?, path) {
        (Some(config), _) => Ok(config),
        (None, Some(path)) => anyhow::bail!("config file not found: {}", path.display()),
        (None, None) => Ok(WikigraphConfig::default()),
    }
}

pub fn write_config(path: &Path, config: &WikigraphConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wikigraph.toml");
        assert!(load_config(Some(&path)).unwrap().is_none());
        assert!(resolve_config(Some(&path)).is_err());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wikigraph.toml");
        std::fs::write(&path, "[server]\nport = 9000\n\n[source]\nlanguage = \"es\"\n").unwrap();

        let config = resolve_config(Some(&path)).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.source.language, "es");
        assert_eq!(config.source.timeout_secs, 30);
        assert_eq!(config.source.endpoint(), "https://es.wikipedia.org/w/api.php");
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join("wikigraph.toml");
        let mut config = WikigraphConfig::default();
        config.source.batch_limit = Some(50);

        write_config(&path, &config, false).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap(), Some(config.clone()));

        assert!(write_config(&path, &config, false).is_err());
        write_config(&path, &config, true).unwrap();
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wikigraph.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn test_settings_from_config() {
        let source = SourceConfig {
            api_url: Some("http://127.0.0.1:9999/w/api.php".to_string()),
            timeout_secs: 0,
            batch_limit: Some(10),
            ..SourceConfig::default()
        };
        let settings = source.settings().unwrap();
        assert_eq!(settings.api_url.port(), Some(9999));
        assert_eq!(settings.timeout, Duration::from_secs(1));
        assert_eq!(settings.batch_limit, Some(10));

        let bad = SourceConfig {
            language: "not a language".to_string(),
            ..SourceConfig::default()
        };
        assert!(bad.settings().is_err());
    }

    #[test]
    fn test_socket_addr() {
        let server = ServerConfig { host: "127.0.0.1".to_string(), port: 8081 };
        assert_eq!(server.socket_addr().unwrap().to_string(), "127.0.0.1:8081");

        let server = ServerConfig { host: "localhost:80".to_string(), port: 1 };
        assert!(server.socket_addr().is_err());
    }
}
