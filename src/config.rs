use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// Constants for hardcoded values
/// Private key file name inside the certificate directory
pub const KEY_FILE: &str = "cluster.key";

/// Certificate file name inside the certificate directory
pub const CERT_FILE: &str = "cluster.crt";

/// Distinguished name used for generated client certificates
pub const CERT_COMMON_NAME: &str = "nodeboot data plane";

/// Validity window for generated certificates (3 years)
pub const CERT_VALIDITY_SECS: u64 = 3 * 365 * 24 * 60 * 60;

/// Page size for control-plane listing requests.
/// Large enough for typical deployments; no pagination follow-up.
pub const LIST_PAGE_SIZE: usize = 100;

/// Host port published for plaintext traffic
pub const PROXY_PORT: u16 = 8000;

/// Host port published for TLS traffic
pub const PROXY_TLS_PORT: u16 = 8443;

/// Wall-clock window for the post-launch log follower
pub const LOG_FOLLOW_SECS: u64 = 30;

/// Environment variable carrying the bearer credential
pub const TOKEN_ENV: &str = "NODEBOOT_TOKEN";

/// Validated bootstrap configuration, supplied by the CLI layer.
/// Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Human-readable control plane name to resolve
    pub control_plane: String,
    /// Region identifier qualifying the API base address
    pub region: String,
    /// Node image reference to launch
    pub image: String,
    /// Ordered label key:value pairs passed to the node
    pub labels: Vec<(String, String)>,
    /// Name for the launched process instance
    pub process_name: String,
    /// Teardown interval in seconds; 0 leaves the node running
    pub ttl_secs: u64,
    /// Revoke the registered certificate during cleanup
    pub cleanup_certificate: bool,
    /// Debug-level logging
    pub verbose: bool,
    /// Directory holding the key/certificate pair
    pub cert_dir: PathBuf,
    /// Bearer credential for the control-plane API
    pub token: String,
}

impl BootstrapConfig {
    /// Region-qualified base address of the control-plane API
    pub fn api_base(&self) -> String {
        format!("https://{}.api.nodehub.dev", self.region)
    }

    /// Labels joined into the single string the node expects
    /// (`key:value` pairs, comma separated, in caller order)
    pub fn label_string(&self) -> String {
        self.labels
            .iter()
            .map(|(k, v)| format!("{}:{}", k, v))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Parse a `key:value,key:value` label string, preserving order.
pub fn parse_labels(raw: &str) -> std::result::Result<Vec<(String, String)>, String> {
    let mut labels = Vec::new();
    for pair in raw.split(',').filter(|p| !p.trim().is_empty()) {
        match pair.split_once(':') {
            Some((k, v)) if !k.trim().is_empty() => {
                labels.push((k.trim().to_string(), v.trim().to_string()));
            }
            _ => return Err(format!("invalid label pair: {}", pair)),
        }
    }
    Ok(labels)
}
