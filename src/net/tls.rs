//! TLS configuration and certificate loading.

use std::io::BufReader;
use std::path::{Path, PathBuf};

use axum_server::tls_rustls::RustlsConfig;
use thiserror::Error;

use crate::config::schema::CertsConfig;

#[derive(Debug, Error)]
pub enum TlsError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no certificates found in {0:?}")]
    NoCertificates(PathBuf),

    #[error("no private key found in {0:?}")]
    NoPrivateKey(PathBuf),
}

fn read(path: &Path) -> Result<Vec<u8>, TlsError> {
    std::fs::read(path).map_err(|source| TlsError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Check that the PEM files hold a certificate chain and a private key.
pub fn check_pem_pair(cert_pem: &[u8], key_pem: &[u8], cert_path: &Path, key_path: &Path) -> Result<(), TlsError> {
    let certs = rustls_pemfile::certs(&mut BufReader::new(cert_pem))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| TlsError::Io {
            path: cert_path.to_path_buf(),
            source,
        })?;
    if certs.is_empty() {
        return Err(TlsError::NoCertificates(cert_path.to_path_buf()));
    }

    let key = rustls_pemfile::private_key(&mut BufReader::new(key_pem)).map_err(|source| TlsError::Io {
        path: key_path.to_path_buf(),
        source,
    })?;
    if key.is_none() {
        return Err(TlsError::NoPrivateKey(key_path.to_path_buf()));
    }

    Ok(())
}

/// Load the certificate (`public_key`) and key (`private_key`) named in
/// the config.
pub async fn load_tls_config(certs: &CertsConfig) -> Result<RustlsConfig, TlsError> {
    let cert_path = PathBuf::from(&certs.public_key);
    let key_path = PathBuf::from(&certs.private_key);

    let cert_pem = read(&cert_path)?;
    let key_pem = read(&key_path)?;
    check_pem_pair(&cert_pem, &key_pem, &cert_path, &key_path)?;

    RustlsConfig::from_pem(cert_pem, key_pem)
        .await
        .map_err(|source| TlsError::Io { path: cert_path, source })
}
