//! TLS credential for HTTPS listeners.

use crate::error::ServerError;
use std::fmt;
use std::path::Path;

/// PEM-encoded certificate chain and private key.
///
/// Acquiring the certificate is up to the caller. The material is only
/// parsed when the listener starts, so a malformed credential surfaces as
/// [`ServerError::Bind`].
#[derive(Clone)]
pub struct TlsCertificate {
    cert_chain_pem: Vec<u8>,
    private_key_pem: Vec<u8>,
}

impl TlsCertificate {
    /// Creates a credential from in-memory PEM data.
    pub fn from_pem(cert_chain_pem: impl Into<Vec<u8>>, private_key_pem: impl Into<Vec<u8>>) -> Self {
        Self {
            cert_chain_pem: cert_chain_pem.into(),
            private_key_pem: private_key_pem.into(),
        }
    }

    /// Reads the certificate chain and private key from PEM files.
    pub fn from_pem_files(
        cert_path: impl AsRef<Path>,
        key_path: impl AsRef<Path>,
    ) -> Result<Self, ServerError> {
        let read = |path: &Path| {
            std::fs::read(path).map_err(|e| {
                ServerError::InvalidArgument(format!("cannot read {}: {}", path.display(), e))
            })
        };
        Ok(Self {
            cert_chain_pem: read(cert_path.as_ref())?,
            private_key_pem: read(key_path.as_ref())?,
        })
    }

    /// Certificate chain, PEM-encoded.
    pub fn cert_chain_pem(&self) -> &[u8] {
        &self.cert_chain_pem
    }

    /// Private key, PEM-encoded.
    pub fn private_key_pem(&self) -> &[u8] {
        &self.private_key_pem
    }
}

// Never print key material.
impl fmt::Debug for TlsCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsCertificate")
            .field("cert_chain_pem", &format_args!("{} bytes", self.cert_chain_pem.len()))
            .field("private_key_pem", &"<redacted>")
            .finish()
    }
}
