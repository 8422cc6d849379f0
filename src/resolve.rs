use crate::api::ControlPlaneApi;
use crate::error::{BootstrapError, Result};

/// Resolved control plane identity
#[derive(Debug, Clone)]
pub struct ControlPlaneIdentity {
    pub id: String,
    pub name: String,
}

/// Resolve a control plane name to its unique identifier.
///
/// Lists the control-plane inventory and takes the first exact name match.
/// Known limitation: if two control planes share a name, the result follows
/// API result ordering. Transport and auth failures collapse into the same
/// not-found error as a genuine absence.
pub async fn resolve(api: &dyn ControlPlaneApi, name: &str) -> Result<ControlPlaneIdentity> {
    tracing::info!("[Resolver] Looking up control plane '{}'", name);

    let listing = match api.list_control_planes().await {
        Ok(listing) => listing,
        Err(e) => {
            tracing::error!("[Resolver] Control plane listing failed: {}", e);
            return Err(BootstrapError::ControlPlaneNotFound(name.to_string()));
        }
    };

    let identity = listing
        .into_iter()
        .find(|cp| cp.name == name)
        .map(|cp| ControlPlaneIdentity {
            id: cp.id,
            name: cp.name,
        })
        .ok_or_else(|| BootstrapError::ControlPlaneNotFound(name.to_string()))?;

    tracing::info!(
        "[Resolver] Control plane '{}' resolved to id {}",
        identity.name,
        identity.id
    );
    Ok(identity)
}
