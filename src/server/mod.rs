//! HTTP endpoint serving a registry to Prometheus scrapers.
//!
//! A [`MetricServer`] owns at most one bound listener. Its presence is
//! what [`MetricServer::is_running`] reports; [`MetricServer::start`] and
//! [`MetricServer::stop`] are idempotent and the server can be restarted
//! any number of times.
//!
//! # Example
//!
//! ```no_run
//! use metric_server::{MetricServer, MetricServerOptions};
//! use prometheus::{IntCounter, Registry};
//!
//! # async fn run() -> Result<(), metric_server::ServerError> {
//! let registry = Registry::new();
//! let requests = IntCounter::new("requests_total", "Handled requests")?;
//! registry.register(Box::new(requests.clone()))?;
//!
//! let mut server = MetricServer::new(
//!     MetricServerOptions::with_registry(registry).port(9100),
//! )?;
//! server.start().await?;
//! requests.inc();
//! // ... scrape http://localhost:9100/metrics ...
//! server.stop().await;
//! # Ok(())
//! # }
//! ```

mod handler;
mod listener;

use crate::collectors::register_default_collectors;
use crate::error::ServerError;
use crate::options::MetricServerOptions;
use crate::scrape::{ScrapeHandler, TextScrapeHandler};
use handler::ScrapeState;
use listener::RunningListener;
use prometheus::Registry;
use std::net::SocketAddr;
use std::sync::Arc;

/// Metrics endpoint bound to one set of options.
pub struct MetricServer {
    options: Arc<MetricServerOptions>,
    registry: Registry,
    scrape_handler: Arc<dyn ScrapeHandler>,
    listener: Option<RunningListener>,
}

impl MetricServer {
    /// Validates `options` and creates a stopped server.
    ///
    /// When default collectors are enabled they are registered here, once;
    /// the registry ignores collectors it already holds.
    pub fn new(options: MetricServerOptions) -> Result<Self, ServerError> {
        let options = options.validate()?;
        let registry = options
            .registry
            .clone()
            .unwrap_or_else(crate::shared_registry);

        if options.use_default_collectors {
            register_default_collectors(&registry, &options.metric_prefix)?;
        }

        Ok(Self {
            options: Arc::new(options),
            registry,
            scrape_handler: Arc::new(TextScrapeHandler),
            listener: None,
        })
    }

    /// Replaces the handler that renders scrape responses.
    pub fn with_scrape_handler(mut self, handler: impl ScrapeHandler + 'static) -> Self {
        self.scrape_handler = Arc::new(handler);
        self
    }

    /// Normalized options this server was built with.
    pub fn options(&self) -> &MetricServerOptions {
        &self.options
    }

    /// Registry exposed by this server.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Whether a listener is currently bound.
    pub fn is_running(&self) -> bool {
        self.listener.is_some()
    }

    /// Address the listener is bound to, while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().map(RunningListener::local_addr)
    }

    /// Binds the listener and starts serving in a background task.
    ///
    /// Does nothing if already running. On failure the server stays stopped
    /// and `start` may be retried.
    pub async fn start(&mut self) -> Result<(), ServerError> {
        if self.is_running() {
            return Ok(());
        }

        let state = Arc::new(ScrapeState::new(
            &self.options,
            self.registry.clone(),
            Arc::clone(&self.scrape_handler),
        ));
        let listener = RunningListener::bind(&self.options, handler::router(state)).await?;

        tracing::info!(
            addr = %listener.local_addr(),
            scheme = self.options.scheme(),
            path = %self.options.map_path,
            "Metric server listening"
        );

        self.listener = Some(listener);
        Ok(())
    }

    /// Stops serving and releases the socket.
    ///
    /// Does nothing if not running. When this returns the address can be
    /// bound again.
    pub async fn stop(&mut self) {
        if let Some(listener) = self.listener.take() {
            let addr = listener.local_addr();
            listener.shutdown().await;
            tracing::info!(addr = %addr, "Metric server stopped");
        }
    }
}

impl Drop for MetricServer {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}
