//! Request routing and scrape rendering.

use crate::options::{MetricServerOptions, ResponseEncoding};
use crate::scrape::ScrapeHandler;
use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use http_body_util::BodyExt;
use prometheus::Registry;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Per-listener state shared by all requests.
pub(crate) struct ScrapeState {
    registry: Registry,
    handler: Arc<dyn ScrapeHandler>,
    route_key: String,
    content_type: String,
    encoding: Option<ResponseEncoding>,
}

impl ScrapeState {
    pub(crate) fn new(
        options: &MetricServerOptions,
        registry: Registry,
        handler: Arc<dyn ScrapeHandler>,
    ) -> Self {
        Self {
            registry,
            handler,
            route_key: route_key(&options.map_path),
            content_type: options.content_type(),
            encoding: options.response_encoding,
        }
    }

    fn render(&self) -> std::io::Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.handler.render(&self.registry, &mut buffer)?;

        match self.encoding {
            Some(encoding) => {
                let text = String::from_utf8(buffer)
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
                Ok(encoding.encode(&text).into_owned())
            }
            None => Ok(buffer),
        }
    }
}

/// Builds the router for one listener run.
///
/// There is a single fallback handler: routing is the trailing-slash
/// insensitive path comparison, nothing else.
pub(crate) fn router(state: Arc<ScrapeState>) -> Router {
    Router::new()
        .fallback(scrape_handler)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Path with a trailing `/` appended when missing.
pub(crate) fn route_key(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

async fn scrape_handler(
    State(state): State<Arc<ScrapeState>>,
    uri: Uri,
    body: Body,
) -> Response {
    let drained = drain(body).await;
    if drained > 0 {
        tracing::debug!(bytes = drained, "Discarded request body");
    }

    if route_key(uri.path()) != state.route_key {
        return StatusCode::NOT_FOUND.into_response();
    }

    match state.render() {
        Ok(output) => {
            tracing::debug!(bytes = output.len(), "Served scrape");
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, state.content_type.clone())],
                output,
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Reads the request body to the end without buffering it, so the
/// connection can be reused. Returns the number of bytes discarded.
async fn drain(mut body: Body) -> usize {
    let mut drained = 0;
    while let Some(frame) = body.frame().await {
        match frame {
            Ok(frame) => {
                if let Some(data) = frame.data_ref() {
                    drained += data.len();
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, bytes = drained, "Request body ended early");
                break;
            }
        }
    }
    drained
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_key() {
        assert_eq!(route_key("/metrics"), "/metrics/");
        assert_eq!(route_key("/metrics/"), "/metrics/");
        assert_eq!(route_key("/"), "/");
    }

    #[tokio::test]
    async fn test_drain_reads_whole_body() {
        let payload = vec![b'x'; 200 * 1024];
        assert_eq!(drain(Body::from(payload)).await, 200 * 1024);
        assert_eq!(drain(Body::empty()).await, 0);
    }

    #[test]
    fn test_trailing_slash_equivalence() {
        assert_eq!(route_key("/test"), route_key("/test/"));
        assert_ne!(route_key("/test"), route_key("/test/sub"));
        assert_ne!(route_key("/test"), route_key("/tes"));
    }
}
