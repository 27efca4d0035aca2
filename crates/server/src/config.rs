//! Server configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Server configuration, loaded from TOML. Every field has a default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Encrypted ledger file
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./data/portfolio.pftk")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            store_path: default_store_path(),
            log_format: LogFormat::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, std::io::Error> {
        toml::from_str(content).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Load `path` if given and present, otherwise fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, std::io::Error> {
        match path {
            Some(p) if p.exists() => Self::from_file(p),
            Some(p) => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("config file {} not found", p.display()),
            )),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = ServerConfig::from_toml("").unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8000);
        assert_eq!(config.store_path, PathBuf::from("./data/portfolio.pftk"));
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn fields_override_defaults() {
        let config = ServerConfig::from_toml(
            r#"
            host = "0.0.0.0"
            port = 9090
            store_path = "/var/lib/pt/store.pftk"
            log_format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9090);
        assert_eq!(config.store_path, PathBuf::from("/var/lib/pt/store.pftk"));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn invalid_toml_is_invalid_data() {
        let err = ServerConfig::from_toml("port = \"not a number\"").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = ServerConfig::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
