//! Seams to the certificate backend. [`crate::BackendClient`] implements all of
//! them over HTTP; tests swap in in-memory fakes.

use crate::assignment::AssignmentRecord;
use crate::digital_certificate::DigitalCertificate;
use crate::error::Error;
use crate::payload::AssignmentPayload;
use crate::signature::Signature;
use async_trait::async_trait;

#[async_trait]
pub trait SignatureSource: Send + Sync {
    /// Every signature, active or not.
    async fn find_all(&self) -> Result<Vec<Signature>, Error>;
}

#[async_trait]
pub trait CertificateStore: Send + Sync {
    /// The active certificate of a signature, if it has one.
    async fn find_active_by_signature(
        &self,
        signature_id: i64,
    ) -> Result<Option<DigitalCertificate>, Error>;

    async fn find_all_by_signature(
        &self,
        signature_id: i64,
    ) -> Result<Vec<DigitalCertificate>, Error>;
}

#[async_trait]
pub trait AssignmentStore: Send + Sync {
    async fn find_all_by_template(&self, template_id: i64) -> Result<Vec<AssignmentRecord>, Error>;

    /// Lookup by the composite `(template, signature)` key.
    async fn find_one(
        &self,
        template_id: i64,
        signature_id: i64,
    ) -> Result<Option<AssignmentRecord>, Error>;

    async fn insert(&self, payload: &AssignmentPayload) -> Result<(), Error>;

    async fn update(&self, payload: &AssignmentPayload) -> Result<(), Error>;

    /// Signature ids already assigned to a template.
    async fn find_signature_ids_by_template(&self, template_id: i64) -> Result<Vec<i64>, Error> {
        Ok(self
            .find_all_by_template(template_id)
            .await?
            .iter()
            .filter_map(AssignmentRecord::signature_id)
            .collect())
    }
}
