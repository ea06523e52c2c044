use crate::api_response::ApiResponse;
use crate::assignment::AssignmentRecord;
use crate::digital_certificate::{DigitalCertificate, RawDigitalCertificate};
use crate::error::Error;
use crate::payload::AssignmentPayload;
use crate::settings::Settings;
use crate::signature::{RawSignature, Signature};
use crate::store::{AssignmentStore, CertificateStore, SignatureSource};
use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

const SIGNATURES_PATH: &str = "tbfirmas";
const CERTIFICATES_PATH: &str = "tbcertificadodigitales";
const ASSIGNMENTS_PATH: &str = "tbformatocertificadofirmas";

/// HTTP client for the certificate backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    /// Always ends in `/`.
    base_url: Url,
    client: reqwest::Client,
}

impl BackendClient {
    pub fn new(settings: &Settings) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .user_agent(settings.user_agent.clone())
            .build()?;
        Self::new_with_client(settings.base_url()?, client)
    }

    pub fn new_with_client(mut base_url: Url, client: reqwest::Client) -> Result<Self, Error> {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(BackendClient { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, Error> {
        let url = self.endpoint(path)?;
        log::debug!("GET {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        let envelope: ApiResponse<T> = response.json().await?;
        envelope.into_data()
    }

    async fn send_payload(&self, method: Method, payload: &AssignmentPayload) -> Result<(), Error> {
        let url = self.endpoint(ASSIGNMENTS_PATH)?;
        log::debug!(
            "{} {} for signature `{}`",
            method,
            url,
            payload.signature_id()
        );
        let response = self
            .client
            .request(method, url)
            .json(payload)
            .send()
            .await?
            .error_for_status()?;
        let envelope: ApiResponse<Value> = response.json().await?;
        envelope.into_data().map(|_| ())
    }
}

#[async_trait]
impl SignatureSource for BackendClient {
    async fn find_all(&self) -> Result<Vec<Signature>, Error> {
        let raw_signatures: Vec<RawSignature> = self
            .get_data(&format!("{}/model-se-ro/findAll", SIGNATURES_PATH))
            .await?
            .unwrap_or_default();
        let mut signatures = Vec::with_capacity(raw_signatures.len());
        for raw in raw_signatures {
            match Signature::try_from(raw) {
                Ok(signature) => signatures.push(signature),
                Err(err) => log::warn!("Skipping signature record. Err: {}", err),
            }
        }
        Ok(signatures)
    }
}

#[async_trait]
impl CertificateStore for BackendClient {
    async fn find_active_by_signature(
        &self,
        signature_id: i64,
    ) -> Result<Option<DigitalCertificate>, Error> {
        let raw: Option<RawDigitalCertificate> = self
            .get_data(&format!(
                "{}/findFirstByFirmaIdAndEstado/{}/true",
                CERTIFICATES_PATH, signature_id
            ))
            .await?;
        Ok(raw.map(DigitalCertificate::from))
    }

    async fn find_all_by_signature(
        &self,
        signature_id: i64,
    ) -> Result<Vec<DigitalCertificate>, Error> {
        let raw: Vec<RawDigitalCertificate> = self
            .get_data(&format!(
                "{}/findAllByFirmaId/{}",
                CERTIFICATES_PATH, signature_id
            ))
            .await?
            .unwrap_or_default();
        Ok(raw.into_iter().map(DigitalCertificate::from).collect())
    }
}

#[async_trait]
impl AssignmentStore for BackendClient {
    async fn find_all_by_template(&self, template_id: i64) -> Result<Vec<AssignmentRecord>, Error> {
        Ok(self
            .get_data(&format!(
                "{}/findAllByIdFormatoCertificado/{}",
                ASSIGNMENTS_PATH, template_id
            ))
            .await?
            .unwrap_or_default())
    }

    async fn find_one(
        &self,
        template_id: i64,
        signature_id: i64,
    ) -> Result<Option<AssignmentRecord>, Error> {
        self.get_data(&format!(
            "{}/{}/{}",
            ASSIGNMENTS_PATH, template_id, signature_id
        ))
        .await
    }

    async fn insert(&self, payload: &AssignmentPayload) -> Result<(), Error> {
        self.send_payload(Method::POST, payload).await
    }

    async fn update(&self, payload: &AssignmentPayload) -> Result<(), Error> {
        self.send_payload(Method::PUT, payload).await
    }
}
