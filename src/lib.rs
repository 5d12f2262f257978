//! Embeddable Prometheus Metric Server
//!
//! Exposes a [`prometheus::Registry`] in the text exposition format over
//! HTTP or HTTPS, for consumption by a periodic scraper.
//!
//! # Architecture
//!
//! ```text
//! MetricServerOptions → MetricServer::new → start → (accept task) → stop
//!                             ↓                         ↓
//!                     default collectors        path match → ScrapeHandler
//! ```
//!
//! - **Options** are validated once, at construction.
//! - **Default collectors** (process and runtime statistics) are registered
//!   into the registry once; the registry rejects duplicates.
//! - **Routing** has a single rule: the request path, with a trailing `/`
//!   appended, must equal the configured path normalized the same way.
//!   Everything else is `404`.
//!
//! # Example
//!
//! ```no_run
//! use metric_server::{MetricServer, MetricServerOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), metric_server::ServerError> {
//!     let mut server = MetricServer::new(MetricServerOptions::with_port(9100))?;
//!     server.start().await?;
//!
//!     tokio::signal::ctrl_c().await.ok();
//!     server.stop().await;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod collectors;
pub mod config;
mod error;
pub mod options;
pub mod scrape;
mod server;

pub use collectors::{register_default_collectors, RuntimeCollector};
pub use config::{ConfigError, FileConfig};
pub use error::ServerError;
pub use options::{MetricServerOptions, ResponseEncoding, TlsCertificate};
pub use scrape::{ScrapeHandler, TextScrapeHandler};
pub use server::MetricServer;

use prometheus::Registry;
use std::sync::OnceLock;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

static SHARED_REGISTRY: OnceLock<Registry> = OnceLock::new();

/// Process-wide registry used when options carry none.
///
/// Created empty on first use and shared by every caller for the rest of
/// the process; safe for concurrent registration and collection. Process
/// metrics only appear in it through [`register_default_collectors`].
pub fn shared_registry() -> Registry {
    SHARED_REGISTRY.get_or_init(Registry::new).clone()
}
