use crate::api::ControlPlaneApi;
use crate::error::{BootstrapError, Result};
use crate::resolve::ControlPlaneIdentity;

/// The two runtime endpoints the node needs, as bare hostnames
#[derive(Debug, Clone)]
pub struct EndpointPair {
    pub management: String,
    pub telemetry: String,
}

/// Reduce an endpoint URI to its bare hostname: drop the scheme prefix and
/// any port suffix. The launcher appends the expected port itself.
fn bare_host(uri: &str) -> String {
    let host = uri
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    match host.split_once(':') {
        Some((name, _)) => name.to_string(),
        None => host.to_string(),
    }
}

/// Fetch the control plane's management and telemetry endpoints.
/// Both are mandatory; partial availability is a single fatal error.
pub async fn fetch(
    api: &dyn ControlPlaneApi,
    identity: &ControlPlaneIdentity,
) -> Result<EndpointPair> {
    tracing::info!(
        "[Endpoints] Fetching endpoints for control plane {}",
        identity.id
    );

    let detail = api
        .get_control_plane(&identity.id)
        .await
        .map_err(|e| BootstrapError::Endpoints(format!("detail request failed: {}", e)))?;

    let config = detail.get("config").ok_or_else(|| {
        BootstrapError::Endpoints(format!(
            "control plane {} has no configuration payload",
            identity.id
        ))
    })?;

    let management = config
        .get("control_plane_endpoint")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            BootstrapError::Endpoints("control plane endpoint missing".to_string())
        })?;
    let telemetry = config
        .get("telemetry_endpoint")
        .and_then(|v| v.as_str())
        .ok_or_else(|| BootstrapError::Endpoints("telemetry endpoint missing".to_string()))?;

    let pair = EndpointPair {
        management: bare_host(management),
        telemetry: bare_host(telemetry),
    };

    tracing::info!(
        "[Endpoints] management={} telemetry={}",
        pair.management,
        pair.telemetry
    );
    Ok(pair)
}
