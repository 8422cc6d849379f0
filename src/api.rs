use crate::config::LIST_PAGE_SIZE;
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

/// Control plane inventory entry
#[derive(Debug, Clone, Deserialize)]
pub struct ControlPlaneSummary {
    pub id: String,
    pub name: String,
}

/// Raw outcome of a certificate-registration call. `id` is present on
/// success; `body` keeps the response text for diagnostic inspection.
#[derive(Debug, Clone)]
pub struct CertificateCreateOutcome {
    pub id: Option<String>,
    pub body: String,
}

/// Remote control-plane API boundary.
///
/// The pipeline stages talk to this trait; production uses the reqwest
/// implementation below, tests substitute in-process mocks.
#[async_trait]
pub trait ControlPlaneApi: Send + Sync {
    /// List control planes (single page, bounded size)
    async fn list_control_planes(&self) -> Result<Vec<ControlPlaneSummary>>;

    /// Fetch a control plane's detail object by id
    async fn get_control_plane(&self, id: &str) -> Result<Value>;

    /// Register a client certificate; non-2xx responses are returned as an
    /// outcome without an id rather than an error
    async fn create_client_certificate(
        &self,
        control_plane_id: &str,
        cert_pem: &str,
    ) -> Result<CertificateCreateOutcome>;

    /// List identifiers of previously registered client certificates
    async fn list_client_certificates(&self, control_plane_id: &str) -> Result<Vec<String>>;

    /// Delete a registered client certificate by id
    async fn delete_client_certificate(&self, control_plane_id: &str, cert_id: &str)
        -> Result<()>;
}

#[derive(Deserialize)]
struct ListEnvelope<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

/// Bearer-authenticated reqwest client against the region-qualified API
pub struct HttpControlPlaneApi {
    client: Client,
    base: String,
    token: String,
}

impl HttpControlPlaneApi {
    pub fn new(base: String, token: String) -> Result<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(4)
            .timeout(std::time::Duration::from_secs(30))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base,
            token,
        })
    }
}

#[async_trait]
impl ControlPlaneApi for HttpControlPlaneApi {
    async fn list_control_planes(&self) -> Result<Vec<ControlPlaneSummary>> {
        let envelope: ListEnvelope<ControlPlaneSummary> = self
            .client
            .get(format!("{}/v2/control-planes", self.base))
            .query(&[("page[size]", LIST_PAGE_SIZE.to_string())])
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(envelope.data)
    }

    async fn get_control_plane(&self, id: &str) -> Result<Value> {
        let detail = self
            .client
            .get(format!("{}/v2/control-planes/{}", self.base, id))
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(detail)
    }

    async fn create_client_certificate(
        &self,
        control_plane_id: &str,
        cert_pem: &str,
    ) -> Result<CertificateCreateOutcome> {
        let response = self
            .client
            .post(format!(
                "{}/v2/control-planes/{}/dp-client-certificates",
                self.base, control_plane_id
            ))
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "cert": cert_pem }))
            .send()
            .await?;

        // Error bodies are inspected by the registrar, not surfaced here
        let body = response.text().await?;
        let id = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("id").and_then(|id| id.as_str()).map(String::from));

        Ok(CertificateCreateOutcome { id, body })
    }

    async fn list_client_certificates(&self, control_plane_id: &str) -> Result<Vec<String>> {
        let envelope: ListEnvelope<Value> = self
            .client
            .get(format!(
                "{}/v2/control-planes/{}/dp-client-certificates",
                self.base, control_plane_id
            ))
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(envelope
            .data
            .iter()
            .filter_map(|item| item.get("id").and_then(|id| id.as_str()).map(String::from))
            .collect())
    }

    async fn delete_client_certificate(
        &self,
        control_plane_id: &str,
        cert_id: &str,
    ) -> Result<()> {
        self.client
            .delete(format!(
                "{}/v2/control-planes/{}/dp-client-certificates/{}",
                self.base, control_plane_id, cert_id
            ))
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
