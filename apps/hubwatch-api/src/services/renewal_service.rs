//! # Renewal Scheduler
//!
//! One run per external trigger (`POST /renew`, typically from cron).
//!
//! ## Run Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  load ──► for each record (sorted by channel_id)                        │
//! │              │                                                          │
//! │              ├─ Skip       not in report, untouched                     │
//! │              ├─ Exhausted  failed result, no hub call, untouched        │
//! │              └─ Attempt    hub subscribe                                │
//! │                              ├─ ok    record_renewal_success            │
//! │                              └─ err   record_renewal_failure            │
//! │                                                                         │
//! │  candidates > 0 ? ──► save once (all or nothing)                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One record's hub failure never stops the batch. Only a failed save aborts
//! the run, and then none of its mutations are persisted.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use hubwatch_core::{RenewalDecision, RenewalReport, RenewalResult};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub struct RenewalService {
    state: Arc<AppState>,
}

impl RenewalService {
    pub fn new(state: Arc<AppState>) -> Self {
        RenewalService { state }
    }

    /// Runs one renewal pass over the whole collection.
    pub async fn run(&self) -> ApiResult<RenewalReport> {
        let mut collection = self.state.store.load().await.map_err(ApiError::load_failed)?;
        let now = self.state.clock.now();
        let policy = self.state.policy;

        let mut report = RenewalReport::new(collection.len());

        let mut channel_ids: Vec<String> = collection.subscriptions.keys().cloned().collect();
        channel_ids.sort();

        for channel_id in channel_ids {
            let decision = match collection.get(&channel_id) {
                Some(subscription) => policy.decide(subscription, now),
                None => continue,
            };

            match decision {
                RenewalDecision::Skip => {}
                RenewalDecision::Exhausted => {
                    let attempts = collection
                        .get(&channel_id)
                        .map(|s| s.renewal_attempts)
                        .unwrap_or_default();
                    warn!(channel_id = %channel_id, attempts, "Renewal attempts exhausted");
                    report.push(RenewalResult::failed(
                        &channel_id,
                        policy.exhausted_message(),
                        attempts,
                    ));
                }
                RenewalDecision::Attempt => {
                    let outcome = self.state.hub_subscribe(&channel_id).await;

                    let Some(subscription) = collection.get_mut(&channel_id) else {
                        continue;
                    };

                    let result = match outcome {
                        Ok(ack) => {
                            let hub_status = ack.status;
                            let expiry = subscription.record_renewal_success(
                                now,
                                policy.lease_seconds,
                                ack.message,
                            );
                            debug!(channel_id = %channel_id, hub_status, expires_at = %expiry, "Renewed");
                            RenewalResult::renewed(&channel_id, expiry)
                        }
                        Err(e) => {
                            let attempts = subscription.record_renewal_failure();
                            warn!(channel_id = %channel_id, attempts, error = %e, "Renewal failed");
                            RenewalResult::failed(
                                &channel_id,
                                format!("Failed to renew subscription: {}", e),
                                attempts,
                            )
                        }
                    };

                    report.push(result);
                }
            }
        }

        if report.has_candidates() {
            self.state.store.save(&mut collection).await.map_err(|e| {
                error!(candidates = report.candidates, error = %e, "Renewal results not saved");
                ApiError::save_failed(e)
            })?;
        }

        report.sort();

        info!(
            total_checked = report.total_checked,
            candidates = report.candidates,
            succeeded = report.succeeded,
            failed = report.failed,
            "Renewal run complete"
        );

        Ok(report)
    }
}
