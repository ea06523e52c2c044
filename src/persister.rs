use crate::assignment::SignatureAssignmentConfig;
use crate::error::Error;
use crate::notification::{Notification, Notifier};
use crate::payload::AssignmentPayload;
use crate::store::AssignmentStore;
use crate::SelectionController;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Insert,
    Update,
}

/// Aggregate result of one save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    Success {
        total: usize,
    },
    /// Some assignments took effect. Treated as a success by the session.
    PartialSuccess {
        completed: usize,
        failed: usize,
        failed_signatures: Vec<i64>,
    },
    Failure {
        failed: usize,
        failed_signatures: Vec<i64>,
    },
}

impl PersistOutcome {
    /// Whether at least one assignment took effect, which closes the session.
    pub fn ends_session(&self) -> bool {
        !matches!(self, PersistOutcome::Failure { .. })
    }

    pub fn completed(&self) -> usize {
        match self {
            PersistOutcome::Success { total } => *total,
            PersistOutcome::PartialSuccess { completed, .. } => *completed,
            PersistOutcome::Failure { .. } => 0,
        }
    }

    fn notification(&self) -> Notification {
        match self {
            PersistOutcome::Success { total } => {
                Notification::success(format!("{} signature(s) assigned successfully", total))
            }
            PersistOutcome::PartialSuccess {
                completed, failed, ..
            } => Notification::info(format!(
                "{} signature(s) assigned, {} with errors",
                completed, failed
            )),
            PersistOutcome::Failure { .. } => Notification::error("Error assigning the signatures"),
        }
    }
}

/// Counts responses as they arrive, in whatever order, and yields the
/// outcome once every request has answered.
#[derive(Debug, Clone)]
pub struct OutcomeTally {
    total: usize,
    completed: usize,
    failed: usize,
    failed_signatures: Vec<i64>,
}

impl OutcomeTally {
    pub fn new(total: usize) -> Self {
        OutcomeTally {
            total,
            completed: 0,
            failed: 0,
            failed_signatures: Vec::new(),
        }
    }

    pub fn is_settled(&self) -> bool {
        self.completed + self.failed == self.total
    }

    /// `Some` exactly when this response is the last one outstanding.
    pub fn record(&mut self, signature_id: i64, succeeded: bool) -> Option<PersistOutcome> {
        if self.is_settled() {
            log::warn!(
                "Response for signature `{}` arrived after every request was counted.",
                signature_id
            );
            return None;
        }
        if succeeded {
            self.completed += 1;
        } else {
            self.failed += 1;
            self.failed_signatures.push(signature_id);
        }
        if self.is_settled() {
            Some(self.outcome())
        } else {
            None
        }
    }

    fn outcome(&self) -> PersistOutcome {
        let mut failed_signatures = self.failed_signatures.clone();
        failed_signatures.sort_unstable();
        if self.failed == 0 {
            PersistOutcome::Success { total: self.total }
        } else if self.failed == self.total {
            PersistOutcome::Failure {
                failed: self.failed,
                failed_signatures,
            }
        } else {
            PersistOutcome::PartialSuccess {
                completed: self.completed,
                failed: self.failed,
                failed_signatures,
            }
        }
    }
}

/// Writes the assignments of one template, one request per signature.
#[derive(Clone)]
pub struct AssignmentPersister {
    store: Arc<dyn AssignmentStore>,
    notifier: Arc<dyn Notifier>,
}

impl AssignmentPersister {
    pub fn new(store: Arc<dyn AssignmentStore>, notifier: Arc<dyn Notifier>) -> Self {
        AssignmentPersister { store, notifier }
    }

    /// Insert the assignments not in `persisted_ids`, update the others. All
    /// requests run concurrently; failures are counted, never retried. Exactly
    /// one notification is sent per call.
    pub async fn persist(
        &self,
        template_id: i64,
        assignments: &[(i64, SignatureAssignmentConfig)],
        persisted_ids: &HashSet<i64>,
    ) -> Result<PersistOutcome, Error> {
        if assignments.is_empty() {
            self.notifier
                .notify(Notification::error("At least one signature must be selected"));
            return Err(Error::EmptySelection);
        }

        let mut pending: FuturesUnordered<_> = assignments
            .iter()
            .map(|(signature_id, config)| {
                let payload = AssignmentPayload::new(*signature_id, template_id, config);
                let kind = if persisted_ids.contains(signature_id) {
                    WriteKind::Update
                } else {
                    WriteKind::Insert
                };
                let store = self.store.clone();
                async move {
                    let result = match kind {
                        WriteKind::Insert => store.insert(&payload).await,
                        WriteKind::Update => store.update(&payload).await,
                    };
                    (payload.signature_id(), kind, result)
                }
            })
            .collect();

        let mut tally = OutcomeTally::new(assignments.len());
        while let Some((signature_id, kind, result)) = pending.next().await {
            if let Err(err) = &result {
                log::error!(
                    "{:?} of signature `{}` on template `{}` failed. Err: {}",
                    kind,
                    signature_id,
                    template_id,
                    err
                );
            }
            if let Some(outcome) = tally.record(signature_id, result.is_ok()) {
                log::info!("Saved assignments of template `{}`: {:?}", template_id, outcome);
                self.notifier.notify(outcome.notification());
                return Ok(outcome);
            }
        }
        Err(Error::Other(
            "Assignment requests ended without a response for every signature.".to_owned(),
        ))
    }
}

impl SelectionController {
    /// Save the whole selection. The session stays borrowed until every
    /// request has answered, so it can not be closed with requests in flight.
    pub async fn save(&mut self, persister: &AssignmentPersister) -> Result<PersistOutcome, Error> {
        let assignments = self.assignments();
        let outcome = persister
            .persist(self.template_id, &assignments, &self.assigned_ids)
            .await?;
        if outcome.ends_session() {
            let failed: HashSet<i64> = match &outcome {
                PersistOutcome::PartialSuccess {
                    failed_signatures, ..
                } => failed_signatures.iter().copied().collect(),
                _ => HashSet::new(),
            };
            self.assigned_ids.extend(
                assignments
                    .iter()
                    .map(|(signature_id, _)| *signature_id)
                    .filter(|signature_id| !failed.contains(signature_id)),
            );
            self.closed = true;
        }
        Ok(outcome)
    }
}
