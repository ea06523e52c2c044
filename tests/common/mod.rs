#![allow(dead_code)]

use async_trait::async_trait;
use signature_assignment::{
    AssignmentPayload, AssignmentRecord, AssignmentStore, CatalogEntry, CertificateStore,
    DigitalCertificate, Error, Notification, Notifier, Signature, SignatureSource, WriteKind,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TEMPLATE_ID: i64 = 8;

#[derive(Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn all(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

/// In-memory backend. Every request is recorded; failures and delays are
/// scripted per signature.
#[derive(Default)]
pub struct FakeBackend {
    pub signatures: Vec<Signature>,
    pub fail_signatures: bool,
    pub active_certificates: HashMap<i64, DigitalCertificate>,
    pub fail_certificates: bool,
    pub records: Vec<AssignmentRecord>,
    pub fail_records: bool,
    pub fail_lookup: bool,
    pub failing_writes: HashSet<i64>,
    pub write_delays: HashMap<i64, Duration>,
    writes: Mutex<Vec<(WriteKind, AssignmentPayload)>>,
    completions: Mutex<Vec<i64>>,
    lookups: Mutex<Vec<(i64, i64)>>,
}

impl FakeBackend {
    pub fn writes(&self) -> Vec<(WriteKind, AssignmentPayload)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn write_for(&self, signature_id: i64) -> Option<(WriteKind, AssignmentPayload)> {
        self.writes()
            .into_iter()
            .find(|(_, payload)| payload.signature_id() == signature_id)
    }

    pub fn completions(&self) -> Vec<i64> {
        self.completions.lock().unwrap().clone()
    }

    pub fn lookups(&self) -> Vec<(i64, i64)> {
        self.lookups.lock().unwrap().clone()
    }

    async fn write(&self, kind: WriteKind, payload: &AssignmentPayload) -> Result<(), Error> {
        let signature_id = payload.signature_id();
        self.writes.lock().unwrap().push((kind, payload.clone()));
        if let Some(delay) = self.write_delays.get(&signature_id) {
            tokio::time::sleep(*delay).await;
        }
        self.completions.lock().unwrap().push(signature_id);
        if self.failing_writes.contains(&signature_id) {
            return Err(Error::Api {
                codigo: 500,
                mensaje: format!("write of signature {} failed", signature_id),
            });
        }
        Ok(())
    }
}

fn network_error() -> Error {
    Error::Other("connection refused".to_owned())
}

#[async_trait]
impl SignatureSource for FakeBackend {
    async fn find_all(&self) -> Result<Vec<Signature>, Error> {
        if self.fail_signatures {
            return Err(network_error());
        }
        Ok(self.signatures.clone())
    }
}

#[async_trait]
impl CertificateStore for FakeBackend {
    async fn find_active_by_signature(
        &self,
        signature_id: i64,
    ) -> Result<Option<DigitalCertificate>, Error> {
        if self.fail_certificates {
            return Err(network_error());
        }
        Ok(self.active_certificates.get(&signature_id).cloned())
    }

    async fn find_all_by_signature(
        &self,
        signature_id: i64,
    ) -> Result<Vec<DigitalCertificate>, Error> {
        if self.fail_certificates {
            return Err(network_error());
        }
        Ok(self
            .active_certificates
            .get(&signature_id)
            .cloned()
            .into_iter()
            .collect())
    }
}

#[async_trait]
impl AssignmentStore for FakeBackend {
    async fn find_all_by_template(&self, template_id: i64) -> Result<Vec<AssignmentRecord>, Error> {
        if self.fail_records {
            return Err(network_error());
        }
        Ok(self
            .records
            .iter()
            .filter(|record| record.template_id() == Some(template_id))
            .cloned()
            .collect())
    }

    async fn find_one(
        &self,
        template_id: i64,
        signature_id: i64,
    ) -> Result<Option<AssignmentRecord>, Error> {
        self.lookups.lock().unwrap().push((template_id, signature_id));
        if self.fail_lookup {
            return Err(network_error());
        }
        Ok(self
            .records
            .iter()
            .find(|record| {
                record.template_id() == Some(template_id)
                    && record.signature_id() == Some(signature_id)
            })
            .cloned())
    }

    async fn insert(&self, payload: &AssignmentPayload) -> Result<(), Error> {
        self.write(WriteKind::Insert, payload).await
    }

    async fn update(&self, payload: &AssignmentPayload) -> Result<(), Error> {
        self.write(WriteKind::Update, payload).await
    }
}

pub fn signature(id: i64) -> Signature {
    Signature::new(id, &format!("F-{:03}", id), &format!("Firma {}", id))
}

pub fn catalog(ids: &[i64]) -> Vec<CatalogEntry> {
    ids.iter().map(|id| CatalogEntry::from(signature(*id))).collect()
}

pub fn active_certificate(signature_id: i64) -> DigitalCertificate {
    DigitalCertificate {
        id: Some(signature_id * 10),
        signature_id: Some(signature_id),
        keystore_type: Some("P12".to_owned()),
        alias: Some(format!("firma-{}", signature_id)),
        subject_dn: Some(format!("CN=Firma {}, O=UNPRG", signature_id)),
        issuer_dn: Some("CN=UNPRG CA".to_owned()),
        serial_number: Some("01".to_owned()),
        valid_from: None,
        valid_to: None,
        active: Some(true),
    }
}

pub fn record(value: serde_json::Value) -> AssignmentRecord {
    serde_json::from_value(value).unwrap()
}

pub fn shared(backend: FakeBackend) -> Arc<FakeBackend> {
    Arc::new(backend)
}
