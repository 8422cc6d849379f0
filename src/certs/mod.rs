use crate::config::{CERT_COMMON_NAME, CERT_FILE, CERT_VALIDITY_SECS, KEY_FILE};
use crate::error::{BootstrapError, Result};
use chrono::{DateTime, Utc};
use rcgen::{CertificateParams, DistinguishedName, KeyPair};
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Mutual-TLS identity material, persisted to the certificate directory
#[derive(Debug, Clone)]
pub struct CertificateMaterial {
    pub key_pem: String,
    pub cert_pem: String,
}

/// Generate a self-signed client certificate and key (valid 3 years)
fn generate_pair() -> Result<(String, String, DateTime<Utc>)> {
    let mut params = CertificateParams::new(vec![]).map_err(|e| {
        BootstrapError::Certificate(format!("Failed to create certificate params: {}", e))
    })?;

    params.distinguished_name = DistinguishedName::new();
    params
        .distinguished_name
        .push(rcgen::DnType::CommonName, CERT_COMMON_NAME);

    let not_before = SystemTime::now();
    let not_after = not_before + Duration::from_secs(CERT_VALIDITY_SECS);
    params.not_before = not_before.into();
    params.not_after = not_after.into();

    let key_pair = KeyPair::generate()
        .map_err(|e| BootstrapError::Certificate(format!("Failed to generate key pair: {}", e)))?;

    let cert = params.self_signed(&key_pair).map_err(|e| {
        BootstrapError::Certificate(format!("Failed to generate certificate: {}", e))
    })?;

    let expiry = DateTime::from_timestamp(
        not_after
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_err(|e| BootstrapError::Certificate(format!("Failed to calculate expiry: {}", e)))?
            .as_secs() as i64,
        0,
    )
    .ok_or_else(|| BootstrapError::Certificate("Invalid expiry timestamp".to_string()))?;

    Ok((cert.pem(), key_pair.serialize_pem(), expiry))
}

/// Ensure a key/certificate pair exists in `dir` and return it.
///
/// If both files already exist they are reused as-is; no regeneration, no
/// expiry re-validation. Otherwise a new pair is generated and both files
/// are written. Never removes prior files.
pub fn ensure(dir: &Path) -> Result<CertificateMaterial> {
    let key_path = dir.join(KEY_FILE);
    let cert_path = dir.join(CERT_FILE);

    if key_path.exists() && cert_path.exists() {
        tracing::info!(
            "[Certs] Reusing existing certificate pair: {:?}, {:?}",
            cert_path,
            key_path
        );
        let key_pem = std::fs::read_to_string(&key_path)
            .map_err(|e| BootstrapError::Certificate(format!("Failed to read key: {}", e)))?;
        let cert_pem = std::fs::read_to_string(&cert_path).map_err(|e| {
            BootstrapError::Certificate(format!("Failed to read certificate: {}", e))
        })?;
        return Ok(CertificateMaterial { key_pem, cert_pem });
    }

    tracing::info!("[Certs] Generating new client certificate pair in {:?}", dir);
    let (cert_pem, key_pem, expiry) = generate_pair()?;

    std::fs::create_dir_all(dir)
        .map_err(|e| BootstrapError::Certificate(format!("Failed to create cert dir: {}", e)))?;
    std::fs::write(&key_path, &key_pem)
        .map_err(|e| BootstrapError::Certificate(format!("Failed to write key: {}", e)))?;
    std::fs::write(&cert_path, &cert_pem)
        .map_err(|e| BootstrapError::Certificate(format!("Failed to write certificate: {}", e)))?;

    tracing::info!("[Certs] Certificate pair written, valid until {}", expiry);

    Ok(CertificateMaterial { key_pem, cert_pem })
}
