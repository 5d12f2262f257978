//! TOML configuration file support.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 9100
//! map_path = "/metrics"
//! use_default_collectors = true
//! metric_prefix = "myapp"
//! response_encoding = "utf-8"
//! tls_cert_path = "/etc/metrics/cert.pem"
//! tls_key_path = "/etc/metrics/key.pem"
//! ```

use crate::error::ServerError;
use crate::options::{
    MetricServerOptions, ResponseEncoding, TlsCertificate, DEFAULT_HOST, DEFAULT_MAP_PATH,
    DEFAULT_PORT,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// The file is not valid TOML or does not match the expected layout.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
    /// `response_encoding` is not a known encoding label.
    #[error("unknown response encoding: {0}")]
    UnknownEncoding(String),
    /// Only one of `tls_cert_path` and `tls_key_path` is set.
    #[error("tls_cert_path and tls_key_path must be set together")]
    IncompleteTls,
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Listener and exposition settings.
    #[serde(default)]
    pub server: ServerSection,
}

/// The `[server]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Host name or IP address to bind; `"*"` binds all interfaces.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Path the metrics are served under.
    pub map_path: String,
    /// Register process and runtime collectors.
    pub use_default_collectors: bool,
    /// Prefix for default-collector metric names.
    pub metric_prefix: String,
    /// WHATWG encoding label; unset means no charset in the media type.
    pub response_encoding: Option<String>,
    /// PEM certificate chain enabling HTTPS.
    pub tls_cert_path: Option<PathBuf>,
    /// PEM private key matching `tls_cert_path`.
    pub tls_key_path: Option<PathBuf>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            map_path: DEFAULT_MAP_PATH.to_string(),
            use_default_collectors: true,
            metric_prefix: String::new(),
            response_encoding: None,
            tls_cert_path: None,
            tls_key_path: None,
        }
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Checks the file-level settings and builds server options, reading
    /// the TLS material if configured.
    ///
    /// Structural checks on host, port and path are left to
    /// [`MetricServerOptions::validate`].
    pub fn into_options(self) -> Result<MetricServerOptions, ServerError> {
        let server = self.server;

        let tls = match (&server.tls_cert_path, &server.tls_key_path) {
            (Some(cert), Some(key)) => Some(TlsCertificate::from_pem_files(cert, key)?),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteTls.into()),
        };
        let response_encoding = match server.response_encoding.as_deref() {
            Some(label) => Some(
                ResponseEncoding::for_label(label)
                    .ok_or_else(|| ConfigError::UnknownEncoding(label.to_string()))?,
            ),
            None => None,
        };

        Ok(MetricServerOptions {
            host: server.host,
            port: server.port,
            map_path: server.map_path,
            tls,
            registry: None,
            use_default_collectors: server.use_default_collectors,
            metric_prefix: server.metric_prefix,
            response_encoding,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = FileConfig::from_toml("").unwrap();
        let options = config.into_options().unwrap();
        assert_eq!(options.host, "*");
        assert_eq!(options.port, 5000);
        assert_eq!(options.map_path, "/metrics");
        assert!(options.use_default_collectors);
        assert!(options.tls.is_none());
    }

    #[test]
    fn test_full_server_section() {
        let config = FileConfig::from_toml(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9100
            map_path = "scrape"
            use_default_collectors = false
            metric_prefix = "app"
            response_encoding = "utf-8"
            "#,
        )
        .unwrap();
        let options = config.into_options().unwrap();
        assert_eq!(options.host, "127.0.0.1");
        assert_eq!(options.port, 9100);
        assert!(!options.use_default_collectors);
        assert_eq!(options.metric_prefix, "app");
        assert_eq!(options.response_encoding, Some(ResponseEncoding::utf8()));

        let options = options.validate().unwrap();
        assert_eq!(options.map_path, "/scrape");
    }

    #[test]
    fn test_unknown_encoding_rejected() {
        let config = FileConfig::from_toml("[server]\nresponse_encoding = \"bogus\"").unwrap();
        let err = config.into_options().unwrap_err();
        assert!(matches!(
            err,
            ServerError::Config(ConfigError::UnknownEncoding(ref label)) if label == "bogus"
        ));
    }

    #[test]
    fn test_half_tls_rejected() {
        let config = FileConfig::from_toml("[server]\ntls_cert_path = \"/tmp/cert.pem\"").unwrap();
        let err = config.into_options().unwrap_err();
        assert!(matches!(err, ServerError::Config(ConfigError::IncompleteTls)));
    }

    #[test]
    fn test_programmatic_section_checked_once_on_conversion() {
        let mut config = FileConfig::default();
        config.server.response_encoding = Some("klingon".to_string());
        let err = config.into_options().unwrap_err();
        assert!(matches!(
            err,
            ServerError::Config(ConfigError::UnknownEncoding(_))
        ));
    }

    #[test]
    fn test_parse_error() {
        let err = FileConfig::from_toml("[server\nport = ").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = FileConfig::from_file("/nonexistent/metric-server.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileReadError(_)));
    }
}
