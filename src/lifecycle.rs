use crate::api::ControlPlaneApi;
use crate::certs::{self, CertificateMaterial};
use crate::config::BootstrapConfig;
use crate::endpoints::{self, EndpointPair};
use crate::error::Result;
use crate::launcher::{self, NodeRuntime};
use crate::register::{self, RegisteredCertificate};
use crate::resolve::{self, ControlPlaneIdentity};
use std::time::Duration;

/// Exit code for an externally interrupted run (after cleanup)
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// State accumulated across the pipeline stages. Each stage fills its slot;
/// nothing is shared through globals.
#[derive(Default)]
pub struct BootstrapContext {
    pub material: Option<CertificateMaterial>,
    pub control_plane: Option<ControlPlaneIdentity>,
    pub certificate: Option<RegisteredCertificate>,
    pub endpoints: Option<EndpointPair>,
}

/// Cleanup intent, created before the pipeline begins and executed
/// unconditionally on every exit path. Both actions are best-effort.
#[derive(Default)]
struct Cleanup {
    revoke_certificate: bool,
    control_plane_id: Option<String>,
    certificate_id: Option<String>,
    remove_process: Option<String>,
}

impl Cleanup {
    async fn run(&self, api: &dyn ControlPlaneApi, runtime: &dyn NodeRuntime) {
        if self.revoke_certificate {
            if let (Some(cp), Some(cert)) = (&self.control_plane_id, &self.certificate_id) {
                tracing::info!("[Lifecycle] Revoking client certificate {}", cert);
                if let Err(e) = api.delete_client_certificate(cp, cert).await {
                    tracing::warn!("[Lifecycle] Certificate revocation failed: {}", e);
                }
            }
        }
        if let Some(name) = &self.remove_process {
            tracing::info!("[Lifecycle] Removing node '{}'", name);
            if let Err(e) = runtime.remove(name).await {
                tracing::warn!("[Lifecycle] Node removal failed: {}", e);
            }
        }
    }
}

/// The strictly linear stage sequence:
/// Init → CertReady → CPResolved → CertRegistered → EndpointsResolved →
/// ProcessRunning → (optional TTL wait). Any failure aborts immediately;
/// cleanup is the caller's responsibility.
async fn pipeline(
    config: &BootstrapConfig,
    api: &dyn ControlPlaneApi,
    runtime: &dyn NodeRuntime,
    cleanup: &mut Cleanup,
) -> Result<BootstrapContext> {
    let material = certs::ensure(&config.cert_dir)?;

    let identity = resolve::resolve(api, &config.control_plane).await?;
    cleanup.control_plane_id = Some(identity.id.clone());

    let registered = register::register(api, &identity, &material).await?;
    cleanup.certificate_id = Some(registered.id.clone());

    let pair: EndpointPair = endpoints::fetch(api, &identity).await?;

    if config.ttl_secs > 0 {
        // Removal intent is recorded before launch: an interruption during
        // the startup log window (or the TTL wait) still tears the node down
        cleanup.remove_process = Some(config.process_name.clone());
    }

    launcher::launch(runtime, config, &material, &pair).await?;

    if config.ttl_secs > 0 {
        tracing::info!(
            "[Lifecycle] Node bootstrapped; tearing down in {}s",
            config.ttl_secs
        );
        tokio::time::sleep(Duration::from_secs(config.ttl_secs)).await;
    } else {
        tracing::info!("[Lifecycle] Node bootstrapped and left running");
    }

    Ok(BootstrapContext {
        material: Some(material),
        control_plane: Some(identity),
        certificate: Some(registered),
        endpoints: Some(pair),
    })
}

/// Run the full bootstrap and return the process exit code.
///
/// Cleanup intent is installed before the first stage and executes on every
/// exit path: success, stage failure, and external interruption.
pub async fn run(
    config: &BootstrapConfig,
    api: &dyn ControlPlaneApi,
    runtime: &dyn NodeRuntime,
) -> i32 {
    // Credential check precedes every pipeline stage
    if config.token.is_empty() {
        tracing::error!("[Lifecycle] No control plane access token provided");
        return crate::error::BootstrapError::MissingToken.exit_code();
    }

    let mut cleanup = Cleanup {
        revoke_certificate: config.cleanup_certificate,
        ..Cleanup::default()
    };

    let code = tokio::select! {
        result = pipeline(config, api, runtime, &mut cleanup) => match result {
            Ok(ctx) => {
                if let (Some(cert), Some(pair)) = (&ctx.certificate, &ctx.endpoints) {
                    tracing::info!(
                        "[Lifecycle] Bootstrap complete: certificate {} via {} / {}",
                        cert.id,
                        pair.management,
                        pair.telemetry
                    );
                }
                0
            }
            Err(e) => {
                tracing::error!("[Lifecycle] Bootstrap failed: {}", e);
                e.exit_code()
            }
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("[Lifecycle] Interrupted, cleaning up");
            INTERRUPTED_EXIT_CODE
        }
    };

    cleanup.run(api, runtime).await;
    code
}
