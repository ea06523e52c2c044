use crate::notification::{Notification, Notifier};
use crate::signature::Signature;
use crate::store::SignatureSource;
use crate::thumbnail::Thumbnail;
use std::sync::Arc;

/// A signature ready to be listed.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub signature: Signature,
    pub thumbnail: Option<Thumbnail>,
}

impl From<Signature> for CatalogEntry {
    fn from(signature: Signature) -> Self {
        let thumbnail = signature
            .image
            .as_deref()
            .and_then(Thumbnail::from_image);
        CatalogEntry {
            signature,
            thumbnail,
        }
    }
}

/// The signatures that can be attached to a template.
#[derive(Clone)]
pub struct SignatureCatalog {
    source: Arc<dyn SignatureSource>,
    notifier: Arc<dyn Notifier>,
}

impl SignatureCatalog {
    pub fn new(source: Arc<dyn SignatureSource>, notifier: Arc<dyn Notifier>) -> Self {
        SignatureCatalog { source, notifier }
    }

    /// Active signatures only. A failed fetch is reported to the operator and
    /// yields an empty catalog.
    pub async fn load(&self) -> Vec<CatalogEntry> {
        match self.source.find_all().await {
            Ok(signatures) => {
                let total = signatures.len();
                let entries: Vec<CatalogEntry> = signatures
                    .into_iter()
                    .filter(|signature| signature.active)
                    .map(CatalogEntry::from)
                    .collect();
                log::debug!("Loaded {} active signatures out of {}.", entries.len(), total);
                entries
            }
            Err(err) => {
                log::warn!("Could not load signatures. Err: {}", err);
                self.notifier
                    .notify(Notification::error("Error loading the signatures"));
                Vec::new()
            }
        }
    }
}
