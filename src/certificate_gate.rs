use crate::error::Error;
use crate::store::CertificateStore;
use chrono::Utc;
use std::sync::Arc;

/// Decides whether digital signing may be enabled for a signature.
///
/// Every doubt resolves to `false`: no id, no certificate, an inactive
/// certificate or a failed query.
#[derive(Clone)]
pub struct DigitalCertificateGate {
    store: Arc<dyn CertificateStore>,
}

impl DigitalCertificateGate {
    pub fn new(store: Arc<dyn CertificateStore>) -> Self {
        DigitalCertificateGate { store }
    }

    pub async fn has_active_certificate(&self, signature_id: Option<i64>) -> bool {
        match self.lookup(signature_id).await {
            Ok(active) => active,
            Err(err) => {
                log::warn!(
                    "Could not check the digital certificate of signature `{:?}`. Err: {}",
                    signature_id,
                    err
                );
                false
            }
        }
    }

    /// Like [`DigitalCertificateGate::has_active_certificate`], but a failed
    /// query is returned instead of read as "no certificate".
    pub async fn lookup(&self, signature_id: Option<i64>) -> Result<bool, Error> {
        let signature_id = match signature_id {
            Some(signature_id) => signature_id,
            None => return Ok(false),
        };
        let certificate = match self.store.find_active_by_signature(signature_id).await? {
            Some(certificate) => certificate,
            None => return Ok(false),
        };
        // The lookup already filters on estado; an explicit inactive flag still wins.
        if certificate.active == Some(false) {
            log::warn!(
                "Certificate returned as active for signature `{}` is flagged inactive.",
                signature_id
            );
            return Ok(false);
        }
        if !certificate.is_valid_at(Utc::now()) {
            log::warn!(
                "Active certificate `{}` of signature `{}` is outside its validity window.",
                certificate.display_name(),
                signature_id
            );
        }
        Ok(true)
    }
}
