pub mod api;
pub mod certs;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod launcher;
pub mod lifecycle;
pub mod register;
pub mod resolve;

pub use certs::CertificateMaterial;
pub use config::BootstrapConfig;
pub use error::{BootstrapError, Result};

/// Run the bootstrap pipeline against the production control-plane API and
/// container runtime, returning the process exit code.
pub async fn bootstrap(config: &BootstrapConfig) -> i32 {
    let api = match api::HttpControlPlaneApi::new(config.api_base(), config.token.clone()) {
        Ok(api) => api,
        Err(e) => {
            tracing::error!("Failed to build API client: {}", e);
            return e.exit_code();
        }
    };
    let runtime = launcher::DockerRuntime::new();
    lifecycle::run(config, &api, &runtime).await
}
