//! # jobs: asset update jobs and an in-process at-least-once queue
//!
//! Producers (see [`crate::attachments`]) enqueue [`AssetUpdateJob`]s through the
//! [`JobQueue`] trait; a queue implementation later delivers each job to the
//! [`AssetManagerUpdateAssetWorker`].
//!
//! [`InMemoryJobQueue`] is the in-process host: jobs are delivered in FIFO
//! order, a failed delivery goes to the back of the queue and is retried until
//! `max_attempts` deliveries have failed, after which it is reported dead.
//! Redelivery leans on the worker being idempotent.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use mockall::automock;

use crate::contract::{AssetManager, AttributeMap};
use crate::worker::{AssetManagerUpdateAssetWorker, UpdateOutcome};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Arguments of one worker invocation, as carried on the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetUpdateJob {
    pub jid: Uuid,
    pub legacy_url_path: String,
    #[serde(default)]
    pub attributes: AttributeMap,
}

impl AssetUpdateJob {
    pub fn new(legacy_url_path: impl Into<String>, attributes: AttributeMap) -> Self {
        Self {
            jid: Uuid::new_v4(),
            legacy_url_path: legacy_url_path.into(),
            attributes,
        }
    }

    /// A job that sets only the `draft` flag.
    pub fn set_draft(legacy_url_path: impl Into<String>, draft: bool) -> Self {
        let mut attributes = AttributeMap::new();
        attributes.insert("draft".to_string(), serde_json::Value::Bool(draft));
        Self::new(legacy_url_path, attributes)
    }
}

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("queue rejected job {jid}: {reason}")]
    Rejected { jid: Uuid, reason: String },
}

#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn enqueue(&self, job: AssetUpdateJob) -> Result<(), QueueError>;
}

#[derive(Debug)]
struct Delivery {
    job: AssetUpdateJob,
    failed_attempts: u32,
}

/// A job that exhausted its delivery attempts.
#[derive(Debug, Clone)]
pub struct DeadJob {
    pub job: AssetUpdateJob,
    pub last_error: String,
}

#[derive(Debug, Default)]
pub struct DrainReport {
    pub updated: Vec<String>,
    pub unchanged: usize,
    pub dead: Vec<DeadJob>,
}

pub struct InMemoryJobQueue {
    pending: Mutex<VecDeque<Delivery>>,
    max_attempts: u32,
}

impl Default for InMemoryJobQueue {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

impl InMemoryJobQueue {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of queued jobs in delivery order.
    pub fn pending_jobs(&self) -> Vec<AssetUpdateJob> {
        self.lock().iter().map(|d| d.job.clone()).collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Delivery>> {
        // Every critical section is a single deque operation, so poisoning is ignored.
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn pop(&self) -> Option<Delivery> {
        self.lock().pop_front()
    }

    /// Deliver every pending job to `worker` until the queue is empty.
    pub async fn drain<A>(&self, worker: &AssetManagerUpdateAssetWorker<'_, A>) -> DrainReport
    where
        A: AssetManager + ?Sized,
    {
        let mut report = DrainReport::default();

        while let Some(mut delivery) = self.pop() {
            let jid = delivery.job.jid;
            match worker
                .perform(&delivery.job.legacy_url_path, &delivery.job.attributes)
                .await
            {
                Ok(UpdateOutcome::Updated { asset_id }) => {
                    info!(%jid, asset_id = %asset_id, "[QUEUE] Job updated asset");
                    report.updated.push(asset_id);
                }
                Ok(UpdateOutcome::Unchanged) => {
                    info!(%jid, "[QUEUE] Job found asset already up to date");
                    report.unchanged += 1;
                }
                Err(e) => {
                    delivery.failed_attempts += 1;
                    if delivery.failed_attempts >= self.max_attempts {
                        error!(%jid, error = %e, attempts = delivery.failed_attempts, "[QUEUE] Job dead after final attempt");
                        report.dead.push(DeadJob {
                            job: delivery.job,
                            last_error: e.to_string(),
                        });
                    } else {
                        warn!(%jid, error = %e, attempts = delivery.failed_attempts, "[QUEUE] Job failed, redelivering");
                        self.lock().push_back(delivery);
                    }
                }
            }
        }

        report
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn enqueue(&self, job: AssetUpdateJob) -> Result<(), QueueError> {
        info!(jid = %job.jid, legacy_url_path = %job.legacy_url_path, "[QUEUE] Enqueued asset update job");
        self.lock().push_back(Delivery {
            job,
            failed_attempts: 0,
        });
        Ok(())
    }
}
