use crate::certs::CertificateMaterial;
use crate::config::{BootstrapConfig, LOG_FOLLOW_SECS, PROXY_PORT, PROXY_TLS_PORT};
use crate::endpoints::EndpointPair;
use crate::error::{BootstrapError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::AsyncBufReadExt;
use tokio::process::Command;

/// Parameters for launching the node process
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    pub name: String,
    pub image: String,
    /// host:container port pairs published by the instance
    pub ports: Vec<(u16, u16)>,
    pub env: Vec<(String, String)>,
}

/// Node process boundary. Production drives the container CLI; tests
/// substitute an in-process mock.
#[async_trait]
pub trait NodeRuntime: Send + Sync {
    /// Forcefully remove a named instance; absence is not an error
    async fn remove(&self, name: &str) -> Result<()>;

    /// Start a detached instance, returning its runtime identifier
    async fn run(&self, spec: &LaunchSpec) -> Result<String>;

    /// Follow the instance's output for a bounded wall-clock window
    async fn follow_logs(&self, name: &str, window: Duration) -> Result<()>;
}

/// Compose the environment the node process is configured through:
/// role and mode markers, both endpoints with their expected TLS server
/// names, and the raw identity material.
pub fn node_environment(
    material: &CertificateMaterial,
    endpoints: &EndpointPair,
    labels: &str,
) -> Vec<(String, String)> {
    vec![
        ("GATEWAY_ROLE".to_string(), "data_plane".to_string()),
        ("GATEWAY_STORAGE".to_string(), "off".to_string()),
        ("GATEWAY_CLUSTER_MTLS".to_string(), "pki".to_string()),
        (
            "GATEWAY_CLUSTER_ENDPOINT".to_string(),
            format!("{}:443", endpoints.management),
        ),
        (
            "GATEWAY_CLUSTER_SERVER_NAME".to_string(),
            endpoints.management.clone(),
        ),
        (
            "GATEWAY_TELEMETRY_ENDPOINT".to_string(),
            format!("{}:443", endpoints.telemetry),
        ),
        (
            "GATEWAY_TELEMETRY_SERVER_NAME".to_string(),
            endpoints.telemetry.clone(),
        ),
        ("GATEWAY_CLUSTER_CERT".to_string(), material.cert_pem.clone()),
        (
            "GATEWAY_CLUSTER_CERT_KEY".to_string(),
            material.key_pem.clone(),
        ),
        ("GATEWAY_TRUSTED_CERTS".to_string(), "system".to_string()),
        ("GATEWAY_MANAGED_MODE".to_string(), "on".to_string()),
        ("GATEWAY_LABELS".to_string(), labels.to_string()),
    ]
}

/// Launch the node process: remove any prior instance with the same name,
/// start a new detached instance, then attach a bounded log follower for
/// operator visibility. Follower failures are non-fatal.
pub async fn launch(
    runtime: &dyn NodeRuntime,
    config: &BootstrapConfig,
    material: &CertificateMaterial,
    endpoints: &EndpointPair,
) -> Result<()> {
    // At-most-one instance per name: prior instances are removed, and
    // removal failures ("does not exist") are ignored
    if let Err(e) = runtime.remove(&config.process_name).await {
        tracing::debug!("[Launcher] Pre-launch removal skipped: {}", e);
    }

    let spec = LaunchSpec {
        name: config.process_name.clone(),
        image: config.image.clone(),
        ports: vec![(PROXY_PORT, PROXY_PORT), (PROXY_TLS_PORT, PROXY_TLS_PORT)],
        env: node_environment(material, endpoints, &config.label_string()),
    };

    tracing::info!(
        "[Launcher] Starting node '{}' from image {}",
        spec.name,
        spec.image
    );
    let instance_id = runtime.run(&spec).await?;
    tracing::info!("[Launcher] Node '{}' running ({})", spec.name, instance_id);

    if let Err(e) = runtime
        .follow_logs(&config.process_name, Duration::from_secs(LOG_FOLLOW_SECS))
        .await
    {
        tracing::warn!("[Launcher] Startup log follow ended early: {}", e);
    }

    Ok(())
}

/// Container-CLI implementation of [`NodeRuntime`]
pub struct DockerRuntime {
    binary: String,
}

impl DockerRuntime {
    pub fn new() -> Self {
        Self {
            binary: "docker".to_string(),
        }
    }
}

impl Default for DockerRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NodeRuntime for DockerRuntime {
    async fn remove(&self, name: &str) -> Result<()> {
        let output = Command::new(&self.binary)
            .arg("rm")
            .arg("-f")
            .arg(name)
            .output()
            .await
            .map_err(|e| BootstrapError::Launch(format!("failed to spawn {}: {}", self.binary, e)))?;

        if !output.status.success() {
            return Err(BootstrapError::Launch(format!(
                "removal of '{}' failed: {}",
                name,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }

    async fn run(&self, spec: &LaunchSpec) -> Result<String> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("run").arg("-d").arg("--name").arg(&spec.name);
        for (host, container) in &spec.ports {
            cmd.arg("-p").arg(format!("{}:{}", host, container));
        }
        for (key, value) in &spec.env {
            cmd.arg("-e").arg(format!("{}={}", key, value));
        }
        cmd.arg(&spec.image);

        let output = cmd
            .output()
            .await
            .map_err(|e| BootstrapError::Launch(format!("failed to spawn {}: {}", self.binary, e)))?;

        if !output.status.success() {
            return Err(BootstrapError::Launch(format!(
                "'{}' exited with {:?}: {}",
                spec.name,
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn follow_logs(&self, name: &str, window: Duration) -> Result<()> {
        let mut child = Command::new(&self.binary)
            .arg("logs")
            .arg("-f")
            .arg(name)
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::null())
            .spawn()
            .map_err(|e| BootstrapError::Launch(format!("failed to follow logs: {}", e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| BootstrapError::Launch("log stream unavailable".to_string()))?;
        let mut lines = tokio::io::BufReader::new(stdout).lines();

        // Hard deadline: the follower is killed at the window edge whether
        // or not the stream has ended
        let follow = async {
            while let Ok(Some(line)) = lines.next_line().await {
                tracing::info!("[{}] {}", name, line);
            }
        };

        if tokio::time::timeout(window, follow).await.is_err() {
            tracing::info!(
                "[Launcher] Log follow window of {:?} elapsed for '{}'",
                window,
                name
            );
        }

        let _ = child.kill().await;
        Ok(())
    }
}
