//! TLS upgrade for outbound connections.

use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tracing::{info, warn};

use crate::error::TransportError;

/// Load the platform trust store.
fn native_roots() -> Result<RootCertStore, TransportError> {
    let mut roots = RootCertStore::empty();
    let certs = rustls_native_certs::load_native_certs();
    for cert in certs.certs {
        if let Err(e) = roots.add(cert) {
            warn!("Failed to add root cert: {}", e);
        }
    }
    for e in &certs.errors {
        warn!("Error loading native certs: {}", e);
    }

    if roots.is_empty() {
        return Err(TransportError::NoRootCertificates);
    }
    Ok(roots)
}

/// Upgrades a TCP stream to TLS, verifying the certificate against `hostname`.
pub async fn upgrade_to_tls(
    tcp_stream: TcpStream,
    hostname: &str,
) -> Result<TlsStream<TcpStream>, TransportError> {
    let config = ClientConfig::builder()
        .with_root_certificates(native_roots()?)
        .with_no_client_auth();

    let connector = TlsConnector::from(Arc::new(config));
    let server_name = ServerName::try_from(hostname.to_string())
        .map_err(|_| TransportError::InvalidServerName(hostname.to_string()))?;

    let tls_stream = connector
        .connect(server_name, tcp_stream)
        .await
        .map_err(|source| TransportError::Handshake {
            host: hostname.to_string(),
            source,
        })?;

    info!(hostname = %hostname, "TLS handshake completed");
    Ok(tls_stream)
}
