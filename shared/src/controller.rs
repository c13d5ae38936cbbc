use std::rc::Rc;

use derive_more::Display;

use crate::error::{DetectionError, Failure};
use crate::model::{UploadedFile, WorkflowState};
use crate::normalizer::ResponseNormalizer;
use crate::transport::{RawResponse, UploadTransport};

/// Identity of one `submit` call. Only the newest one may change state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display(fmt = "#{}", _0)]
pub struct SubmissionId(u64);

/// Permission to run the transport exchange for one submission.
#[derive(Debug)]
pub struct Ticket<S> {
    id: SubmissionId,
    file: Rc<UploadedFile<S>>,
}

impl<S> Ticket<S> {
    pub fn id(&self) -> SubmissionId {
        self.id
    }

    pub fn file(&self) -> &UploadedFile<S> {
        &self.file
    }

    /// Runs the single transport call for this submission.
    pub async fn exchange<T: UploadTransport<S>>(self, transport: &T) -> Completion {
        let outcome = transport.upload(&self.file).await;
        Completion::new(self.id, outcome)
    }
}

/// The outcome of a transport exchange, tagged with the submission it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    id: SubmissionId,
    outcome: Result<RawResponse, DetectionError>,
}

impl Completion {
    pub fn new(id: SubmissionId, outcome: Result<RawResponse, DetectionError>) -> Self {
        Self { id, outcome }
    }

    pub fn id(&self) -> SubmissionId {
        self.id
    }
}

/// Owns the page state and sequences uploads.
///
/// `submit` switches to `Uploading` before handing out a [`Ticket`], so a
/// completion from an older submission is recognised as stale and dropped
/// when it reaches [`WorkflowController::complete`].
#[derive(Debug)]
pub struct WorkflowController<S> {
    state: WorkflowState<S>,
    active: Option<SubmissionId>,
    issued: u64,
    normalizer: ResponseNormalizer,
}

impl<S> Default for WorkflowController<S> {
    fn default() -> Self {
        Self::new(ResponseNormalizer::default())
    }
}

impl<S> WorkflowController<S> {
    pub fn new(normalizer: ResponseNormalizer) -> Self {
        Self {
            state: WorkflowState::Idle,
            active: None,
            issued: 0,
            normalizer,
        }
    }

    pub fn state(&self) -> &WorkflowState<S> {
        &self.state
    }

    pub fn active_submission(&self) -> Option<SubmissionId> {
        self.active
    }

    pub fn normalizer(&self) -> &ResponseNormalizer {
        &self.normalizer
    }

    pub fn submit(&mut self, file: UploadedFile<S>) -> Ticket<S> {
        self.issued += 1;
        let id = SubmissionId(self.issued);
        if let Some(previous) = self.active.replace(id) {
            if matches!(self.state, WorkflowState::Uploading(_)) {
                log::debug!("submission {} superseded by {}", previous, id);
            }
        }

        let file = Rc::new(file);
        // Replacing the state drops the previous file or result right here.
        self.state = WorkflowState::Uploading(Rc::clone(&file));
        log::debug!("submission {} started for {} ({})", id, file.name(), file.id());

        Ticket { id, file }
    }

    /// Applies a finished exchange. Returns `false` when it was stale.
    pub fn complete(&mut self, completion: Completion) -> bool {
        let Completion { id, outcome } = completion;
        let current = self.active == Some(id) && matches!(self.state, WorkflowState::Uploading(_));
        if !current {
            log::debug!("discarding stale completion for submission {}", id);
            return false;
        }

        self.state = match outcome.and_then(|raw| self.normalizer.normalize(&raw)) {
            Ok(result) => {
                log::debug!(
                    "submission {} succeeded with {} detections",
                    id,
                    result.count()
                );
                WorkflowState::Succeeded(result)
            }
            Err(err) => {
                log::warn!("submission {} failed: {}", id, err);
                WorkflowState::Failed(Failure::from(err))
            }
        };
        true
    }

    /// Dismisses a failure and returns to `Idle`; a no-op in any other state.
    pub fn acknowledge(&mut self) -> bool {
        if matches!(self.state, WorkflowState::Failed(_)) {
            self.state = WorkflowState::Idle;
            true
        } else {
            false
        }
    }
}
