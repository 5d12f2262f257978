//! Metric server configuration.
//!
//! [`MetricServerOptions`] is plain data with defaults. It is validated and
//! normalized once, when a [`MetricServer`](crate::MetricServer) is built,
//! and never changes afterwards.

mod encoding;
mod server_options;
mod tls;

pub use encoding::ResponseEncoding;
pub use server_options::{
    MetricServerOptions, DEFAULT_HOST, DEFAULT_MAP_PATH, DEFAULT_PORT, EXPOSITION_CONTENT_TYPE,
};
pub use tls::TlsCertificate;
