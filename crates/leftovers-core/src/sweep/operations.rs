use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::types::{Outcome, ResourceKey, SkipReason, SweepReport};
use crate::interaction::ConfirmationGate;
use crate::resources::{Deletable, DeleteError, ResourceSet};

/// An item still waiting to be deleted, with its latest dependency error.
#[derive(Clone)]
pub(crate) struct Pending {
    pub item: Arc<dyn Deletable>,
    pub last_error: Option<DeleteError>,
}

impl Pending {
    pub fn key(&self) -> ResourceKey {
        ResourceKey::new(self.item.resource_type(), self.item.identifier())
    }
}

/// Outstanding work for one resource kind. Processed start-to-finish by a
/// single worker per pass.
#[derive(Clone)]
pub(crate) struct Lane {
    pub resource_type: String,
    pub outstanding: Vec<Pending>,
}

impl Lane {
    pub fn is_empty(&self) -> bool {
        self.outstanding.is_empty()
    }
}

impl From<ResourceSet> for Lane {
    fn from(set: ResourceSet) -> Self {
        Self {
            resource_type: set.resource_type().to_string(),
            outstanding: set
                .items()
                .iter()
                .map(|item| Pending {
                    item: Arc::clone(item),
                    last_error: None,
                })
                .collect(),
        }
    }
}

pub(crate) fn record(report: &Mutex<SweepReport>, key: ResourceKey, outcome: Outcome) {
    match report.lock() {
        Ok(mut guard) => guard.record(key, outcome),
        Err(poisoned) => poisoned.into_inner().record(key, outcome),
    }
}

/// Run one pass over a lane.
///
/// Returns the items still dependency-blocked and how many items resolved
/// (deleted, declined, failed or cancelled) during this pass.
pub(crate) async fn process_lane(
    lane: Lane,
    gate: ConfirmationGate,
    report: Arc<Mutex<SweepReport>>,
    cancel: CancellationToken,
) -> (Lane, usize) {
    let mut still_blocked = Vec::new();
    let mut resolved = 0;

    for mut pending in lane.outstanding {
        let key = pending.key();

        if cancel.is_cancelled() {
            record(&report, key, Outcome::skipped(SkipReason::Cancelled));
            resolved += 1;
            continue;
        }

        if !gate.confirm(&key.resource_type, &key.identifier) {
            info!(
                event = "core.sweep.delete_declined",
                resource_type = key.resource_type,
                resource = key.identifier
            );
            record(&report, key, Outcome::skipped(SkipReason::UserDeclined));
            resolved += 1;
            continue;
        }

        // An interrupt may land while the prompt is open.
        if cancel.is_cancelled() {
            info!(
                event = "core.sweep.delete_cancelled",
                resource_type = key.resource_type,
                resource = key.identifier
            );
            record(&report, key, Outcome::skipped(SkipReason::Cancelled));
            resolved += 1;
            continue;
        }

        info!(
            event = "core.sweep.delete_started",
            resource_type = key.resource_type,
            resource = key.identifier
        );

        match pending.item.delete().await {
            Err(e) if e.is_dependency_blocked() => {
                warn!(
                    event = "core.sweep.delete_blocked",
                    resource_type = key.resource_type,
                    resource = key.identifier,
                    error = %e
                );
                pending.last_error = Some(e);
                still_blocked.push(pending);
            }
            result => {
                match &result {
                    Ok(()) => info!(
                        event = "core.sweep.delete_completed",
                        resource_type = key.resource_type,
                        resource = key.identifier
                    ),
                    Err(e) if e.is_already_gone() => info!(
                        event = "core.sweep.delete_already_gone",
                        resource_type = key.resource_type,
                        resource = key.identifier
                    ),
                    Err(e) => error!(
                        event = "core.sweep.delete_failed",
                        resource_type = key.resource_type,
                        resource = key.identifier,
                        error = %e
                    ),
                }
                record(&report, key, Outcome::from_delete_result(&result));
                resolved += 1;
            }
        }
    }

    (
        Lane {
            resource_type: lane.resource_type,
            outstanding: still_blocked,
        },
        resolved,
    )
}
