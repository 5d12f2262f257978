//! Binding parameters for a metric server.

use super::{ResponseEncoding, TlsCertificate};
use crate::error::ServerError;
use prometheus::Registry;
use std::fmt;

/// Bind address meaning "all interfaces".
pub const DEFAULT_HOST: &str = "*";

/// Port used when none is configured.
pub const DEFAULT_PORT: u16 = 5000;

/// Scrape path used when none is configured.
pub const DEFAULT_MAP_PATH: &str = "/metrics";

/// Media type of the Prometheus text exposition format.
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Configuration for a [`MetricServer`](crate::MetricServer).
///
/// All fields are public; use struct update syntax or the builder-style
/// setters. Validation happens when the server is constructed.
#[derive(Clone)]
pub struct MetricServerOptions {
    /// Host name or IP address to bind. `"*"` and `"+"` bind all interfaces.
    pub host: String,
    /// Port to listen on. Must be nonzero.
    pub port: u16,
    /// Path the metrics are served under.
    pub map_path: String,
    /// Certificate switching the listener from HTTP to HTTPS.
    pub tls: Option<TlsCertificate>,
    /// Registry to expose. Falls back to [`shared_registry`](crate::shared_registry).
    pub registry: Option<Registry>,
    /// Register process and runtime collectors into the registry.
    pub use_default_collectors: bool,
    /// Prefix for default-collector metric names.
    pub metric_prefix: String,
    /// Charset of the response body.
    pub response_encoding: Option<ResponseEncoding>,
}

impl Default for MetricServerOptions {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            map_path: DEFAULT_MAP_PATH.to_string(),
            tls: None,
            registry: None,
            use_default_collectors: true,
            metric_prefix: String::new(),
            response_encoding: None,
        }
    }
}

impl fmt::Debug for MetricServerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricServerOptions")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("map_path", &self.map_path)
            .field("tls", &self.tls)
            .field("registry", &self.registry.as_ref().map(|_| "<registry>"))
            .field("use_default_collectors", &self.use_default_collectors)
            .field("metric_prefix", &self.metric_prefix)
            .field("response_encoding", &self.response_encoding)
            .finish()
    }
}

impl MetricServerOptions {
    /// Creates options with a custom port.
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Creates options exposing the given registry.
    pub fn with_registry(registry: Registry) -> Self {
        Self {
            registry: Some(registry),
            ..Default::default()
        }
    }

    /// Sets the bind host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the scrape path.
    pub fn map_path(mut self, path: impl Into<String>) -> Self {
        self.map_path = path.into();
        self
    }

    /// Serves over HTTPS with the given certificate.
    pub fn tls(mut self, certificate: TlsCertificate) -> Self {
        self.tls = Some(certificate);
        self
    }

    /// Sets the registry.
    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Enables or disables default collectors.
    pub fn use_default_collectors(mut self, enabled: bool) -> Self {
        self.use_default_collectors = enabled;
        self
    }

    /// Sets the default-collector metric name prefix.
    pub fn metric_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.metric_prefix = prefix.into();
        self
    }

    /// Sets the response charset.
    pub fn response_encoding(mut self, encoding: ResponseEncoding) -> Self {
        self.response_encoding = Some(encoding);
        self
    }

    /// Validates the options and returns them normalized.
    ///
    /// The scrape path is trimmed and gets a leading `/` if it lacks one.
    pub fn validate(mut self) -> Result<Self, ServerError> {
        if self.port == 0 {
            return Err(ServerError::InvalidArgument(
                "port should be specified".to_string(),
            ));
        }
        if self.host.trim().is_empty() {
            return Err(ServerError::InvalidArgument(
                "host should not be empty".to_string(),
            ));
        }
        self.map_path = normalize_map_path(&self.map_path)?;
        Ok(self)
    }

    /// URL scheme implied by the TLS setting.
    pub fn scheme(&self) -> &'static str {
        if self.tls.is_some() {
            "https"
        } else {
            "http"
        }
    }

    /// `Content-Type` header value for scrape responses.
    pub fn content_type(&self) -> String {
        match &self.response_encoding {
            Some(encoding) => format!("{}; charset={}", EXPOSITION_CONTENT_TYPE, encoding.name()),
            None => EXPOSITION_CONTENT_TYPE.to_string(),
        }
    }
}

/// Trims the path and makes sure it starts with `/`.
pub(crate) fn normalize_map_path(path: &str) -> Result<String, ServerError> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(ServerError::InvalidArgument(
            "map path should not be empty".to_string(),
        ));
    }
    if trimmed.starts_with('/') {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("/{}", trimmed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_defaults() {
        let options = MetricServerOptions::default();
        assert_eq!(options.host, "*");
        assert_eq!(options.port, 5000);
        assert_eq!(options.map_path, "/metrics");
        assert!(options.use_default_collectors);
        assert!(options.metric_prefix.is_empty());
        assert!(options.registry.is_none());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_empty_path_invalid() {
        for path in ["", "   "] {
            let err = MetricServerOptions::default().map_path(path).validate().unwrap_err();
            assert!(matches!(err, ServerError::InvalidArgument(_)));
        }
    }

    #[test]
    fn test_zero_port_invalid() {
        let err = MetricServerOptions::with_port(0).validate().unwrap_err();
        assert!(matches!(err, ServerError::InvalidArgument(_)));
    }

    #[test]
    fn test_missing_leading_slash_is_prepended() {
        let options = MetricServerOptions::default()
            .map_path("metrics")
            .validate()
            .unwrap();
        assert_eq!(options.map_path, "/metrics");
    }

    #[test]
    fn test_scheme_follows_tls() {
        let options = MetricServerOptions::default();
        assert_eq!(options.scheme(), "http");
        let options = options.tls(TlsCertificate::from_pem("c", "k"));
        assert_eq!(options.scheme(), "https");
    }

    #[test]
    fn test_content_type() {
        let options = MetricServerOptions::default();
        assert_eq!(options.content_type(), "text/plain; version=0.0.4");

        let options = options.response_encoding(ResponseEncoding::utf8());
        assert_eq!(
            options.content_type(),
            "text/plain; version=0.0.4; charset=utf-8"
        );
    }

    proptest! {
        #[test]
        fn prop_normalized_path_is_rooted_and_stable(path in "[ ]{0,2}/?[a-z0-9_/-]{1,16}[ ]{0,2}") {
            let normalized = normalize_map_path(&path).unwrap();
            prop_assert!(normalized.starts_with('/'));
            prop_assert_eq!(normalize_map_path(&normalized).unwrap(), normalized.clone());
        }
    }
}
