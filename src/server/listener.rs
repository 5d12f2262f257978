//! Listener binding, accept task and shutdown.

use crate::error::ServerError;
use crate::options::MetricServerOptions;
use axum::Router;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// How long in-flight requests may run after a stop is requested.
pub(crate) const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// A bound listener with its accept task.
#[derive(Debug)]
pub(crate) struct RunningListener {
    addr: SocketAddr,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl RunningListener {
    /// Binds according to `options` and spawns the accept loop.
    ///
    /// Returns once the socket is bound; no request has been served yet.
    pub(crate) async fn bind(
        options: &MetricServerOptions,
        router: Router,
    ) -> Result<Self, ServerError> {
        let requested = resolve(&options.host, options.port).await?;
        let listener = TcpListener::bind(requested)
            .await
            .map_err(|e| ServerError::bind(requested.to_string(), e))?;
        let addr = listener
            .local_addr()
            .map_err(|e| ServerError::bind(requested.to_string(), e))?;

        let cancel = CancellationToken::new();
        let task = match &options.tls {
            None => serve_http(listener, router, cancel.clone()),
            Some(certificate) => serve_https(listener, addr, certificate, router, cancel.clone()).await?,
        };

        Ok(Self { addr, cancel, task })
    }

    pub(crate) fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stops accepting, waits for the accept task and releases the socket.
    ///
    /// Requests still running after [`SHUTDOWN_GRACE`] are aborted.
    pub(crate) async fn shutdown(mut self) {
        self.cancel.cancel();

        if tokio::time::timeout(SHUTDOWN_GRACE, &mut self.task)
            .await
            .is_err()
        {
            tracing::warn!(
                addr = %self.addr,
                "In-flight requests did not finish in time, aborting"
            );
            self.task.abort();
            let _ = self.task.await;
        }
    }

    /// Tears the listener down without waiting.
    pub(crate) fn abort(&self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

fn serve_http(listener: TcpListener, router: Router, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router)
            .with_graceful_shutdown(cancel.cancelled_owned())
            .await
        {
            tracing::error!(error = %e, "Metric server terminated");
        }
    })
}

#[cfg(feature = "tls")]
async fn serve_https(
    listener: TcpListener,
    addr: SocketAddr,
    certificate: &crate::options::TlsCertificate,
    router: Router,
    cancel: CancellationToken,
) -> Result<JoinHandle<()>, ServerError> {
    use axum_server::tls_rustls::RustlsConfig;

    // Pin the provider so other rustls users in the process cannot make the
    // default ambiguous; an already-installed default is kept.
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let config = RustlsConfig::from_pem(
        certificate.cert_chain_pem().to_vec(),
        certificate.private_key_pem().to_vec(),
    )
    .await
    .map_err(|e| ServerError::bind(addr.to_string(), e))?;
    let listener = listener
        .into_std()
        .map_err(|e| ServerError::bind(addr.to_string(), e))?;

    let handle = axum_server::Handle::new();
    let server = axum_server::from_tcp_rustls(listener, config).handle(handle.clone());

    Ok(tokio::spawn(async move {
        let serve = server.serve(router.into_make_service());
        tokio::pin!(serve);

        let result = tokio::select! {
            result = &mut serve => result,
            _ = cancel.cancelled() => {
                handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
                serve.await
            }
        };
        if let Err(e) = result {
            tracing::error!(error = %e, "Metric server terminated");
        }
    }))
}

#[cfg(not(feature = "tls"))]
async fn serve_https(
    _listener: TcpListener,
    addr: SocketAddr,
    _certificate: &crate::options::TlsCertificate,
    _router: Router,
    _cancel: CancellationToken,
) -> Result<JoinHandle<()>, ServerError> {
    Err(ServerError::bind(
        addr.to_string(),
        io::Error::new(
            io::ErrorKind::Unsupported,
            "HTTPS requires the `tls` feature",
        ),
    ))
}

/// Resolves the configured host to a bind address.
pub(crate) async fn resolve(host: &str, port: u16) -> Result<SocketAddr, ServerError> {
    let host = host.trim();
    if host == "*" || host == "+" {
        return Ok(SocketAddr::from(([0, 0, 0, 0], port)));
    }

    let host = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, port));
    }

    let display = format!("{}:{}", host, port);
    tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| ServerError::bind(display.clone(), e))?
        .next()
        .ok_or_else(|| {
            ServerError::bind(
                display,
                io::Error::new(io::ErrorKind::AddrNotAvailable, "host resolved to no address"),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_wildcards() {
        for host in ["*", "+", " * "] {
            let addr = resolve(host, 9100).await.unwrap();
            assert!(addr.ip().is_unspecified());
            assert_eq!(addr.port(), 9100);
        }
    }

    #[tokio::test]
    async fn test_resolve_literals() {
        let v4 = resolve("127.0.0.1", 80).await.unwrap();
        assert_eq!(v4, SocketAddr::from(([127, 0, 0, 1], 80)));

        let v6 = resolve("[::1]", 80).await.unwrap();
        assert!(v6.is_ipv6());
    }

    #[tokio::test]
    async fn test_resolve_unknown_host_is_bind_error() {
        let err = resolve("host.invalid", 80).await.unwrap_err();
        assert!(matches!(err, ServerError::Bind { .. }));
    }
}
