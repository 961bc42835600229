//! Keeps the asset manager's `draft` flag in step with attachment visibility.
//!
//! Attachments of a draft edition are stored as draft assets and must not be
//! served publicly. When an edition is published its attachments (and their
//! thumbnails) become public; when it is unpublished they go back to draft.
//! Consultation responses follow their parent edition, and policy group
//! attachments are public immediately.
//!
//! The updater only enqueues [`AssetUpdateJob`]s; the asset manager is touched
//! when the queue delivers them to the worker.

use tracing::info;

use crate::edition::{ConsultationResponse, Edition, EditionState, FileAttachment, PolicyGroup};
use crate::jobs::{AssetUpdateJob, JobQueue, QueueError};

#[derive(Debug, Clone, Copy)]
pub enum PublicationEvent<'a> {
    EditionPublished(&'a Edition),
    EditionUnpublished(&'a Edition),
    /// An outcome or public feedback changed, e.g. an attachment was added.
    ConsultationResponseUpdated {
        parent_state: EditionState,
        response: &'a ConsultationResponse,
    },
    PolicyGroupUpdated(&'a PolicyGroup),
}

pub struct AttachmentDraftStatusUpdater<'a, Q: ?Sized> {
    queue: &'a Q,
}

impl<'a, Q> AttachmentDraftStatusUpdater<'a, Q>
where
    Q: JobQueue + ?Sized,
{
    pub fn new(queue: &'a Q) -> Self {
        Self { queue }
    }

    /// Enqueue draft-flag updates for every asset affected by `event`. Returns the number of jobs.
    pub async fn handle(&self, event: PublicationEvent<'_>) -> Result<usize, QueueError> {
        let (draft, attachments): (bool, Vec<&FileAttachment>) = match event {
            PublicationEvent::EditionPublished(edition) => {
                (false, edition.all_attachments().collect())
            }
            PublicationEvent::EditionUnpublished(edition) => {
                (true, edition.all_attachments().collect())
            }
            PublicationEvent::ConsultationResponseUpdated {
                parent_state,
                response,
            } => (
                !parent_state.is_publicly_visible(),
                response.attachments.iter().collect(),
            ),
            PublicationEvent::PolicyGroupUpdated(group) => (false, group.attachments.iter().collect()),
        };

        let mut enqueued = 0;
        for path in attachments.iter().flat_map(|a| a.asset_paths()) {
            self.queue.enqueue(AssetUpdateJob::set_draft(path, draft)).await?;
            enqueued += 1;
        }

        info!(draft, jobs = enqueued, "[DRAFT] Enqueued draft status updates");
        Ok(enqueued)
    }
}
