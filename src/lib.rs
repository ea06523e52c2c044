//! Signature placement configuration for certificate templates.
//!
//! An operator picks which signatures go on a template, configures where and
//! how each one is drawn, and saves the set. The rendering backend later reads
//! the stored configuration when it generates the certificates.

mod api_response;
mod assignment;
mod catalog;
mod certificate_gate;
mod client;
mod configuration_form;
mod configure;
mod digital_certificate;
mod error;
pub mod normalize;
mod notification;
mod payload;
mod persister;
mod placement;
mod seeding;
mod settings;
mod signature;
mod store;
mod thumbnail;

pub use assignment::{
    AssignmentRecord, LayoutMode, SignatureAssignmentConfig, DEFAULT_LOCATION, DEFAULT_REASON,
};
pub use catalog::{CatalogEntry, SignatureCatalog};
pub use certificate_gate::DigitalCertificateGate;
pub use client::BackendClient;
pub use configuration_form::{
    CertificateStatus, ConfigurationForm, Field, FieldError, FieldRule, FormResult, FormValues,
    Violation,
};
pub use digital_certificate::DigitalCertificate;
pub use error::Error;
pub use notification::{LogNotifier, Notification, NotificationLevel, Notifier};
pub use payload::{AssignmentId, AssignmentPayload, IdRef};
pub use persister::{AssignmentPersister, OutcomeTally, PersistOutcome, WriteKind};
pub use placement::{resolve_layout, Placement, Rectangle};
pub use settings::Settings;
pub use signature::Signature;
pub use store::{AssignmentStore, CertificateStore, SignatureSource};
pub use thumbnail::{ImageInfo, Thumbnail};

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Where a signature stands in the current editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Unselected,
    /// Selected, will be saved with the default configuration.
    SelectedNoConfig,
    SelectedConfigured,
}

/// One editing session: the signatures assigned to a single certificate
/// template and their in-memory configurations.
pub struct SelectionController {
    template_id: i64,
    catalog: Vec<CatalogEntry>,
    /// Selected signature ids, in the order they were selected.
    selected: Vec<i64>,
    /// Configurations saved from the form (or seeded from the backend).
    configs: HashMap<i64, SignatureAssignmentConfig>,
    /// Signatures the backend already has an assignment for.
    assigned_ids: HashSet<i64>,
    /// Configurations fetched from the backend, waiting to be seeded.
    persisted: HashMap<i64, SignatureAssignmentConfig>,
    selection_seeded: HashSet<i64>,
    config_seeded: HashSet<i64>,
    closed: bool,
    notifier: Arc<dyn Notifier>,
}

impl SelectionController {
    pub fn new(template_id: i64, notifier: Arc<dyn Notifier>) -> Self {
        SelectionController {
            template_id,
            catalog: Vec::new(),
            selected: Vec::new(),
            configs: HashMap::new(),
            assigned_ids: HashSet::new(),
            persisted: HashMap::new(),
            selection_seeded: HashSet::new(),
            config_seeded: HashSet::new(),
            closed: false,
            notifier,
        }
    }

    pub fn template_id(&self) -> i64 {
        self.template_id
    }

    pub fn catalog(&self) -> &[CatalogEntry] {
        &self.catalog
    }

    pub fn entry(&self, signature_id: i64) -> Option<&CatalogEntry> {
        self.catalog
            .iter()
            .find(|entry| entry.signature.id == signature_id)
    }

    pub fn selected_ids(&self) -> &[i64] {
        &self.selected
    }

    pub fn is_selected(&self, signature_id: i64) -> bool {
        self.selected.contains(&signature_id)
    }

    pub fn config(&self, signature_id: i64) -> Option<&SignatureAssignmentConfig> {
        self.configs.get(&signature_id)
    }

    /// Signature ids that already have a stored assignment for this template.
    pub fn assigned_ids(&self) -> &HashSet<i64> {
        &self.assigned_ids
    }

    /// `true` once a save went through (fully or partially).
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn state(&self, signature_id: i64) -> SelectionState {
        if !self.is_selected(signature_id) {
            SelectionState::Unselected
        } else if self.configs.contains_key(&signature_id) {
            SelectionState::SelectedConfigured
        } else {
            SelectionState::SelectedNoConfig
        }
    }

    /// Flip selection. Configurations survive deselection, so selecting the
    /// signature again brings them back.
    pub fn toggle(&mut self, signature_id: i64) -> Result<SelectionState, Error> {
        if self.is_selected(signature_id) {
            self.deselect(signature_id)?;
        } else {
            self.select(signature_id)?;
        }
        Ok(self.state(signature_id))
    }

    pub fn select(&mut self, signature_id: i64) -> Result<(), Error> {
        self.ensure_in_catalog(signature_id)?;
        if !self.is_selected(signature_id) {
            self.selected.push(signature_id);
        }
        Ok(())
    }

    pub fn deselect(&mut self, signature_id: i64) -> Result<(), Error> {
        self.ensure_in_catalog(signature_id)?;
        self.selected.retain(|id| *id != signature_id);
        Ok(())
    }

    pub fn select_all(&mut self) {
        for entry in &self.catalog {
            if !self.selected.contains(&entry.signature.id) {
                self.selected.push(entry.signature.id);
            }
        }
    }

    pub fn deselect_all(&mut self) {
        self.selected.clear();
    }

    /// 1-based order a signature takes among the selection. Signatures that
    /// are not selected yet go after the last selected one.
    pub fn order_for(&self, signature_id: i64) -> i64 {
        let position = self
            .selected
            .iter()
            .position(|id| *id == signature_id)
            .unwrap_or(self.selected.len());
        position as i64 + 1
    }

    /// The selection as it would be saved: the stored configuration when there
    /// is one, the defaults otherwise.
    pub fn assignments(&self) -> Vec<(i64, SignatureAssignmentConfig)> {
        self.selected
            .iter()
            .enumerate()
            .map(|(index, signature_id)| {
                let config = self.configs.get(signature_id).cloned().unwrap_or_else(|| {
                    SignatureAssignmentConfig::with_defaults(index as i64 + 1)
                });
                (*signature_id, config)
            })
            .collect()
    }

    /// Where every visible selected signature would land on its page.
    pub fn preview(&self) -> Vec<Placement> {
        resolve_layout(&self.assignments())
    }

    fn ensure_in_catalog(&self, signature_id: i64) -> Result<(), Error> {
        if self.entry(signature_id).is_none() {
            return Err(Error::UnknownSignature(signature_id));
        }
        Ok(())
    }
}
