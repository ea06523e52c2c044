use crate::assignment::{AssignmentRecord, SignatureAssignmentConfig};
use crate::catalog::{CatalogEntry, SignatureCatalog};
use crate::notification::Notification;
use crate::store::AssignmentStore;
use crate::SelectionController;

impl SelectionController {
    /// Fetch the catalog and the template's stored assignments together and
    /// seed the selection from them. Failures leave that source empty.
    pub async fn load(&mut self, catalog: &SignatureCatalog, store: &dyn AssignmentStore) {
        let template_id = self.template_id;
        let (entries, records) = futures::join!(
            catalog.load(),
            store.find_all_by_template(template_id)
        );
        let records = match records {
            Ok(records) => records,
            Err(err) => {
                log::warn!(
                    "Could not load the signatures assigned to template `{}`. Err: {}",
                    template_id,
                    err
                );
                self.notifier.notify(Notification::warning(
                    "Could not load the signatures already assigned to this template",
                ));
                Vec::new()
            }
        };
        self.on_catalog_loaded(entries);
        self.on_assignments_loaded(records);
    }

    /// Ids the template is known to have assignments for.
    pub fn set_assigned_ids<I: IntoIterator<Item = i64>>(&mut self, signature_ids: I) {
        self.assigned_ids.extend(signature_ids);
        self.seed();
    }

    /// The catalog may arrive before or after the assignments.
    pub fn on_catalog_loaded(&mut self, entries: Vec<CatalogEntry>) {
        self.catalog = entries;
        let catalog = &self.catalog;
        self.selected
            .retain(|id| catalog.iter().any(|entry| entry.signature.id == *id));
        self.seed();
    }

    pub fn on_assignments_loaded(&mut self, records: Vec<AssignmentRecord>) {
        for (index, record) in records.iter().enumerate() {
            if let Some(template_id) = record.template_id() {
                if template_id != self.template_id {
                    log::warn!(
                        "Ignoring assignment for template `{}` while editing template `{}`.",
                        template_id,
                        self.template_id
                    );
                    continue;
                }
            }
            let signature_id = match record.signature_id() {
                Some(signature_id) => signature_id,
                None => {
                    log::warn!("Ignoring assignment without signature id.");
                    continue;
                }
            };
            self.assigned_ids.insert(signature_id);
            self.persisted
                .entry(signature_id)
                .or_insert_with(|| SignatureAssignmentConfig::from_record(record, index as i64 + 1));
        }
        self.seed();
    }

    /// Seeds each signature at most once per source: a later call never
    /// reselects a signature the operator deselected, nor replaces a
    /// configuration already in memory.
    fn seed(&mut self) {
        let catalog_ids: Vec<i64> = self
            .catalog
            .iter()
            .map(|entry| entry.signature.id)
            .collect();
        for signature_id in catalog_ids {
            if self.assigned_ids.contains(&signature_id)
                && self.selection_seeded.insert(signature_id)
                && !self.selected.contains(&signature_id)
            {
                log::debug!("Preselecting signature `{}`.", signature_id);
                self.selected.push(signature_id);
            }
            if let Some(config) = self.persisted.get(&signature_id) {
                if self.config_seeded.insert(signature_id) {
                    self.configs
                        .entry(signature_id)
                        .or_insert_with(|| config.clone());
                }
            }
        }
    }
}
