use std::sync::{Arc, Mutex};

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::operations::{Lane, process_lane, record};
use super::types::{FailureKind, Outcome, SkipReason, SweepOptions, SweepReport};
use crate::events;
use crate::interaction::{Advisor, ConfirmationGate};
use crate::resources::{Lister, NameFilter, ResourceSet, list_resource_sets};

/// Multi-pass deletion orchestrator.
///
/// Deletion order across kinds is never computed. Items whose delete is
/// dependency-blocked stay outstanding and are retried on the next pass,
/// so blockers removed earlier let them succeed later. The run stops when
/// everything resolved, `max_passes` is spent, or a pass resolves nothing.
pub struct Sweeper {
    gate: ConfirmationGate,
    advisor: Arc<dyn Advisor>,
    options: SweepOptions,
    cancel: CancellationToken,
}

impl Sweeper {
    pub fn new(
        gate: ConfirmationGate,
        advisor: Arc<dyn Advisor>,
        options: SweepOptions,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            gate,
            advisor,
            options,
            cancel,
        }
    }

    /// List every kind through `listers`, then sweep the matching resources.
    pub async fn run(
        &self,
        listers: &[Arc<dyn Lister>],
        scope: &str,
        filter: &NameFilter,
    ) -> SweepReport {
        events::log_sweep_started(listers.len(), scope, filter);

        let listing = list_resource_sets(listers, scope, filter, &self.cancel).await;

        let mut report = SweepReport::new();
        for (resource_type, error) in &listing.failures {
            report.record_list_error(resource_type, error);
        }

        self.sweep(listing.sets, report).await
    }

    /// Delete every item of `sets`, appending outcomes to `report`.
    pub async fn sweep(&self, sets: Vec<ResourceSet>, report: SweepReport) -> SweepReport {
        let report = Arc::new(Mutex::new(report));
        let max_passes = self.options.max_passes.max(1);
        let concurrent = self.options.concurrent_kinds && !self.gate.is_interactive();
        if self.options.concurrent_kinds && !concurrent {
            warn!(
                event = "core.sweep.concurrency_disabled",
                reason = "interactive confirmation requires sequential prompts"
            );
        }

        let mut lanes: Vec<Lane> = sets
            .into_iter()
            .map(Lane::from)
            .filter(|lane| !lane.is_empty())
            .collect();
        let mut passes: u32 = 0;

        while passes < max_passes && !lanes.is_empty() && !self.cancel.is_cancelled() {
            passes += 1;
            let outstanding_before: usize = lanes.iter().map(|l| l.outstanding.len()).sum();
            info!(
                event = "core.sweep.pass_started",
                pass = passes,
                outstanding = outstanding_before,
                concurrent = concurrent
            );

            let (next, resolved) = if concurrent {
                self.run_lanes_concurrently(lanes, &report).await
            } else {
                self.run_lanes_sequentially(lanes, &report).await
            };
            lanes = next.into_iter().filter(|lane| !lane.is_empty()).collect();

            let outstanding_after: usize = lanes.iter().map(|l| l.outstanding.len()).sum();
            info!(
                event = "core.sweep.pass_completed",
                pass = passes,
                resolved = resolved,
                outstanding = outstanding_after
            );

            if outstanding_after > 0 && resolved == 0 {
                warn!(
                    event = "core.sweep.no_progress",
                    pass = passes,
                    outstanding = outstanding_after
                );
                break;
            }
        }

        self.settle_outstanding(lanes, passes, &report);

        let mut report = match Arc::try_unwrap(report) {
            Ok(mutex) => mutex.into_inner().unwrap_or_else(|p| p.into_inner()),
            Err(shared) => match shared.lock() {
                Ok(guard) => guard.clone(),
                Err(poisoned) => poisoned.into_inner().clone(),
            },
        };
        report.passes = passes;
        report.finish();

        events::log_sweep_completed(&report);

        report
    }

    async fn run_lanes_sequentially(
        &self,
        lanes: Vec<Lane>,
        report: &Arc<Mutex<SweepReport>>,
    ) -> (Vec<Lane>, usize) {
        let mut next = Vec::with_capacity(lanes.len());
        let mut resolved = 0;

        for lane in lanes {
            let (lane, count) = process_lane(
                lane,
                self.gate.clone(),
                Arc::clone(report),
                self.cancel.clone(),
            )
            .await;
            resolved += count;
            next.push(lane);
        }

        (next, resolved)
    }

    async fn run_lanes_concurrently(
        &self,
        lanes: Vec<Lane>,
        report: &Arc<Mutex<SweepReport>>,
    ) -> (Vec<Lane>, usize) {
        let mut workers = JoinSet::new();
        let mut spawned = Vec::with_capacity(lanes.len());

        for (position, lane) in lanes.into_iter().enumerate() {
            spawned.push(lane.clone());
            let gate = self.gate.clone();
            let report = Arc::clone(report);
            let cancel = self.cancel.clone();
            workers.spawn(async move {
                let (lane, count) = process_lane(lane, gate, report, cancel).await;
                (position, lane, count)
            });
        }

        let mut finished: Vec<Option<Lane>> = vec![None; spawned.len()];
        let mut resolved = 0;

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((position, lane, count)) => {
                    resolved += count;
                    finished[position] = Some(lane);
                }
                Err(e) => {
                    error!(event = "core.sweep.lane_aborted", error = %e);
                }
            }
        }

        let mut next = Vec::with_capacity(finished.len());
        for (position, lane) in finished.into_iter().enumerate() {
            match lane {
                Some(lane) => next.push(lane),
                None => resolved += self.fail_aborted_lane(&spawned[position], report),
            }
        }

        (next, resolved)
    }

    /// Record a failure for every item of a lane whose worker died, unless
    /// the worker already recorded an outcome for it.
    fn fail_aborted_lane(&self, lane: &Lane, report: &Arc<Mutex<SweepReport>>) -> usize {
        let mut failed = 0;
        for pending in &lane.outstanding {
            let key = pending.key();
            let known = report
                .lock()
                .map(|guard| {
                    guard
                        .outcome(&key.resource_type, &key.identifier)
                        .is_some()
                })
                .unwrap_or(false);
            if !known {
                record(
                    report,
                    key,
                    Outcome::Failed {
                        failure: FailureKind::Provider,
                        message: format!("worker lane for {} aborted", lane.resource_type),
                    },
                );
                failed += 1;
            }
        }
        failed
    }

    fn settle_outstanding(&self, lanes: Vec<Lane>, passes: u32, report: &Arc<Mutex<SweepReport>>) {
        let cancelled = self.cancel.is_cancelled();

        for lane in lanes {
            for pending in lane.outstanding {
                let key = pending.key();
                if cancelled {
                    record(report, key, Outcome::skipped(SkipReason::Cancelled));
                    continue;
                }

                self.advisor.advise(&format!(
                    "{} {} is still in use by another resource after {} pass(es); \
                     remove the dependency manually and run leftovers again.",
                    key.resource_type, key.identifier, passes
                ));
                record(
                    report,
                    key,
                    Outcome::no_progress(passes, pending.last_error.as_ref()),
                );
            }
        }
    }
}
