use crate::api::ControlPlaneApi;
use crate::certs::CertificateMaterial;
use crate::error::{BootstrapError, Result};
use crate::resolve::ControlPlaneIdentity;

const PEM_CERT_HEADER: &str = "-----BEGIN CERTIFICATE-----";

/// Marker the control plane puts in validation-error bodies for bad PEM
const PEM_ERROR_MARKER: &str = "PEM";

/// Certificate registered with the control plane for one run
#[derive(Debug, Clone)]
pub struct RegisteredCertificate {
    pub id: String,
}

/// Normalize certificate bytes for submission: strip carriage returns,
/// preserve literal newlines. The control plane rejects payloads whose
/// line breaks arrive as `\n` escape sequences, so the payload must carry
/// real line breaks.
pub fn normalize_pem(cert_pem: &str) -> String {
    cert_pem.replace('\r', "")
}

/// Register the certificate with the control plane and resolve its
/// remote identifier.
///
/// Payload shape is validated before any network submission; an id-less
/// response is treated as a possible already-registered condition and the
/// prior-certificate listing is consulted as a fallback reuse path.
pub async fn register(
    api: &dyn ControlPlaneApi,
    identity: &ControlPlaneIdentity,
    material: &CertificateMaterial,
) -> Result<RegisteredCertificate> {
    let normalized = normalize_pem(&material.cert_pem);

    match normalized.lines().next() {
        Some(first) if first == PEM_CERT_HEADER => {}
        _ => tracing::warn!(
            "[Registrar] Certificate does not start with the PEM header; submitting anyway"
        ),
    }

    // A literal backslash-n sequence means the material was corrupted
    // upstream (escaped instead of real line breaks). Never submit it.
    if normalized.contains("\\n") {
        return Err(BootstrapError::Registration(
            "certificate contains escaped newline sequences; refusing to submit".to_string(),
        ));
    }

    tracing::info!(
        "[Registrar] Registering client certificate with control plane {}",
        identity.id
    );

    let outcome = match api.create_client_certificate(&identity.id, &normalized).await {
        Ok(outcome) => outcome,
        Err(e) => {
            // Treated like an id-less response: the listing fallback below
            // is still attempted before the stage fails.
            tracing::warn!("[Registrar] Certificate submission failed: {}", e);
            crate::api::CertificateCreateOutcome {
                id: None,
                body: e.to_string(),
            }
        }
    };

    if let Some(id) = outcome.id {
        tracing::info!("[Registrar] Certificate registered with id {}", id);
        return Ok(RegisteredCertificate { id });
    }

    if outcome.body.contains(PEM_ERROR_MARKER) {
        tracing::warn!(
            "[Registrar] Control plane rejected the certificate as invalid PEM; \
             check for carriage returns or escaped newlines in the certificate file"
        );
    }

    // Possible already-registered condition: reuse the first prior id
    tracing::info!(
        "[Registrar] No id in response, checking prior registrations for control plane {}",
        identity.id
    );
    let prior = api
        .list_client_certificates(&identity.id)
        .await
        .unwrap_or_default();

    if let Some(id) = prior.into_iter().next() {
        tracing::info!("[Registrar] Reusing previously registered certificate {}", id);
        return Ok(RegisteredCertificate { id });
    }

    Err(BootstrapError::Registration(format!(
        "no certificate id obtained from control plane {}: {}",
        identity.id, outcome.body
    )))
}
