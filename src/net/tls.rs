//! TLS configuration and certificate loading.

use axum_server::tls_rustls::RustlsConfig;
use std::path::Path;

use crate::config::TlsConfig;

/// Load a rustls server config from the PEM files named in `[listener.tls]`.
pub async fn load_tls_config(tls: &TlsConfig) -> Result<RustlsConfig, std::io::Error> {
    ensure_exists(Path::new(&tls.cert_path), "Certificate")?;
    ensure_exists(Path::new(&tls.key_path), "Private key")?;
    RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path).await
}

fn ensure_exists(path: &Path, what: &str) -> Result<(), std::io::Error> {
    if path.exists() {
        return Ok(());
    }
    Err(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("{what} file not found: {}", path.display()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_certificate() {
        let tls = TlsConfig {
            cert_path: "/nonexistent/edgebin.crt".into(),
            key_path: "/nonexistent/edgebin.key".into(),
        };
        let err = load_tls_config(&tls).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
        assert!(err.to_string().contains("Certificate"));
    }
}
