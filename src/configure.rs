use crate::assignment::SignatureAssignmentConfig;
use crate::certificate_gate::DigitalCertificateGate;
use crate::configuration_form::{ConfigurationForm, FormResult};
use crate::error::Error;
use crate::notification::Notification;
use crate::store::AssignmentStore;
use crate::{SelectionController, SelectionState};

impl SelectionController {
    /// Open the form for one signature, in any order and whether it is
    /// selected or not.
    ///
    /// The form is prefilled with the in-memory configuration. A selected
    /// signature without one is looked up in the store first, so a stored
    /// configuration that was never seeded is still edited instead of being
    /// replaced by the defaults. A failed lookup opens the form with defaults.
    pub async fn begin_configure(
        &self,
        signature_id: i64,
        gate: &DigitalCertificateGate,
        store: &dyn AssignmentStore,
    ) -> Result<ConfigurationForm, Error> {
        let signature = self
            .entry(signature_id)
            .map(|entry| entry.signature.clone())
            .ok_or(Error::UnknownSignature(signature_id))?;
        let order = self.order_for(signature_id);

        let existing = match self.configs.get(&signature_id) {
            Some(config) => Some(config.clone()),
            None if self.is_selected(signature_id) => {
                self.lookup_config(signature_id, order, store).await
            }
            None => None,
        };

        Ok(ConfigurationForm::open(
            signature,
            order,
            existing.as_ref(),
            gate,
            self.notifier.clone(),
        )
        .await)
    }

    async fn lookup_config(
        &self,
        signature_id: i64,
        order: i64,
        store: &dyn AssignmentStore,
    ) -> Option<SignatureAssignmentConfig> {
        match store.find_one(self.template_id, signature_id).await {
            Ok(Some(record)) => {
                log::debug!(
                    "Found stored configuration for signature `{}` on template `{}`.",
                    signature_id,
                    self.template_id
                );
                Some(SignatureAssignmentConfig::from_record(&record, order))
            }
            Ok(None) => None,
            Err(err) => {
                log::warn!(
                    "Could not look up the configuration of signature `{}`. Err: {}",
                    signature_id,
                    err
                );
                self.notifier.notify(Notification::warning(
                    "Could not load the stored configuration, showing the defaults",
                ));
                None
            }
        }
    }

    /// Apply the closed form. Saving stores the configuration and selects the
    /// signature; cancelling leaves everything as it was.
    pub fn finish_configure(
        &mut self,
        signature_id: i64,
        result: FormResult,
    ) -> Result<SelectionState, Error> {
        match result {
            FormResult::Saved(config) => {
                self.select(signature_id)?;
                self.configs.insert(signature_id, config);
            }
            FormResult::Cancelled => {
                self.ensure_in_catalog(signature_id)?;
            }
        }
        Ok(self.state(signature_id))
    }
}
