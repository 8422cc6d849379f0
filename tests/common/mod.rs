//! Shared mock implementations of the control-plane API and node runtime
//! boundaries for pipeline tests.
#![allow(dead_code)]

use async_trait::async_trait;
use nodeboot::api::{CertificateCreateOutcome, ControlPlaneApi, ControlPlaneSummary};
use nodeboot::config::BootstrapConfig;
use nodeboot::error::{BootstrapError, Result};
use nodeboot::launcher::{LaunchSpec, NodeRuntime};
use serde_json::Value;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

/// In-process control-plane API with scripted responses and call recording
#[derive(Default)]
pub struct MockApi {
    pub control_planes: Vec<ControlPlaneSummary>,
    pub detail: Option<Value>,
    /// id echoed by the create call; None simulates an error body
    pub create_id: Option<String>,
    /// response body returned alongside (or instead of) the id
    pub create_body: String,
    pub prior_certificates: Vec<String>,
    pub submitted_payloads: Mutex<Vec<String>>,
    pub deleted_certificates: Mutex<Vec<(String, String)>>,
    pub detail_requests: Mutex<Vec<String>>,
}

#[async_trait]
impl ControlPlaneApi for MockApi {
    async fn list_control_planes(&self) -> Result<Vec<ControlPlaneSummary>> {
        Ok(self.control_planes.clone())
    }

    async fn get_control_plane(&self, id: &str) -> Result<Value> {
        self.detail_requests.lock().unwrap().push(id.to_string());
        self.detail
            .clone()
            .ok_or_else(|| BootstrapError::Endpoints("no detail configured".to_string()))
    }

    async fn create_client_certificate(
        &self,
        _control_plane_id: &str,
        cert_pem: &str,
    ) -> Result<CertificateCreateOutcome> {
        self.submitted_payloads
            .lock()
            .unwrap()
            .push(cert_pem.to_string());
        Ok(CertificateCreateOutcome {
            id: self.create_id.clone(),
            body: self.create_body.clone(),
        })
    }

    async fn list_client_certificates(&self, _control_plane_id: &str) -> Result<Vec<String>> {
        Ok(self.prior_certificates.clone())
    }

    async fn delete_client_certificate(
        &self,
        control_plane_id: &str,
        cert_id: &str,
    ) -> Result<()> {
        self.deleted_certificates
            .lock()
            .unwrap()
            .push((control_plane_id.to_string(), cert_id.to_string()));
        Ok(())
    }
}

/// In-process node runtime tracking the single named instance
#[derive(Default)]
pub struct MockRuntime {
    pub fail_run: bool,
    /// Simulate a live container whose log follower never ends on its own
    pub block_follow: bool,
    pub runs: Mutex<Vec<LaunchSpec>>,
    pub removed: Mutex<Vec<String>>,
    pub running: Mutex<Option<String>>,
}

#[async_trait]
impl NodeRuntime for MockRuntime {
    async fn remove(&self, name: &str) -> Result<()> {
        self.removed.lock().unwrap().push(name.to_string());
        *self.running.lock().unwrap() = None;
        Ok(())
    }

    async fn run(&self, spec: &LaunchSpec) -> Result<String> {
        if self.fail_run {
            return Err(BootstrapError::Launch("image not found".to_string()));
        }
        self.runs.lock().unwrap().push(spec.clone());
        *self.running.lock().unwrap() = Some(spec.name.clone());
        Ok("instance-1".to_string())
    }

    async fn follow_logs(&self, _name: &str, window: Duration) -> Result<()> {
        if self.block_follow {
            tokio::time::sleep(window).await;
        }
        Ok(())
    }
}

pub fn test_config(cert_dir: &Path) -> BootstrapConfig {
    BootstrapConfig {
        control_plane: "demo".to_string(),
        region: "us".to_string(),
        image: "nodehub/gateway:latest".to_string(),
        labels: vec![("env".to_string(), "test".to_string())],
        process_name: "managed-node".to_string(),
        ttl_secs: 0,
        cleanup_certificate: false,
        verbose: false,
        cert_dir: cert_dir.to_path_buf(),
        token: "test-token".to_string(),
    }
}

/// Scripted API for the happy path: `demo` resolves to `cp-1`, submission
/// echoes `cert-9`, endpoints are mgmt/tel.example behind https.
pub fn happy_api() -> MockApi {
    MockApi {
        control_planes: vec![ControlPlaneSummary {
            id: "cp-1".to_string(),
            name: "demo".to_string(),
        }],
        detail: Some(serde_json::json!({
            "config": {
                "control_plane_endpoint": "https://mgmt.example:443",
                "telemetry_endpoint": "https://tel.example:443"
            }
        })),
        create_id: Some("cert-9".to_string()),
        create_body: r#"{"id":"cert-9"}"#.to_string(),
        ..MockApi::default()
    }
}
