//! The view controller: owns the displayed post list and the single open
//! draft, and drives the round trips to the store.
use std::{future::Future, time::Duration};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    config::BlogConfig,
    draft::{Draft, FieldErrors},
    post::{Post, PostId},
    store::{PostStore, StoreError, StoreResult},
    wire::PostSubmission,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// Submit was called with no open draft.
    #[error("No draft is open")]
    NoDraft,
    /// A submission is already in flight.
    #[error("A submission is already in progress")]
    Busy,
    /// The post to edit is not in the displayed list.
    #[error("Post does not exist with the given ID({id})")]
    UnknownPost { id: PostId },
    /// The draft failed validation; the store was not contacted.
    #[error("{0}")]
    Invalid(FieldErrors),
    /// The store rejected the call or could not be reached.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What a draft will become once submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftTarget {
    Create,
    Edit(PostId),
}

/// A draft plus the errors from its last submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenDraft {
    pub target: DraftTarget,
    pub draft: Draft,
    pub field_errors: Option<FieldErrors>,
    pub store_error: Option<StoreError>,
}

impl OpenDraft {
    fn new(target: DraftTarget, draft: Draft) -> Self {
        Self {
            target,
            draft,
            field_errors: None,
            store_error: None,
        }
    }
}

/// Lifecycle of the single open draft.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DraftState {
    #[default]
    Idle,
    Drafting(OpenDraft),
    Submitting(OpenDraft),
}

impl DraftState {
    /// Open an empty draft for a new post, discarding any other draft.
    pub fn open_create(&mut self) -> Result<(), ViewError> {
        self.replace_draft(OpenDraft::new(DraftTarget::Create, Draft::default()))
    }

    /// Open a draft pre-populated from `post`, discarding any other draft.
    pub fn open_edit(&mut self, post: &Post) -> Result<(), ViewError> {
        self.replace_draft(OpenDraft::new(
            DraftTarget::Edit(post.id),
            Draft::from_post(post),
        ))
    }

    /// Drop the open draft.
    pub fn cancel(&mut self) -> Result<(), ViewError> {
        if self.is_submitting() {
            return Err(ViewError::Busy);
        }
        *self = DraftState::Idle;
        Ok(())
    }

    /// Validate the open draft and, if it passes, move to `Submitting` and
    /// hand back what must be sent to the store. Field errors stay attached
    /// to the draft when validation fails.
    pub fn begin_submit(&mut self) -> Result<(DraftTarget, PostSubmission), ViewError> {
        let open = match self {
            DraftState::Idle => return Err(ViewError::NoDraft),
            DraftState::Submitting(_) => return Err(ViewError::Busy),
            DraftState::Drafting(open) => open,
        };

        if let Err(errors) = open.draft.validate() {
            open.field_errors = Some(errors.clone());
            return Err(ViewError::Invalid(errors));
        }
        open.field_errors = None;
        open.store_error = None;
        let request = (open.target, open.draft.to_wire());

        if let DraftState::Drafting(open) = std::mem::take(self) {
            *self = DraftState::Submitting(open);
        }
        Ok(request)
    }

    /// Apply the store's answer: success disposes of the draft, failure puts
    /// it back in `Drafting` untouched, with the error attached.
    pub fn finish_submit(&mut self, result: &StoreResult<()>) {
        let open = match std::mem::take(self) {
            DraftState::Submitting(open) => open,
            other => {
                *self = other;
                return;
            }
        };
        if let Err(err) = result {
            *self = DraftState::Drafting(OpenDraft {
                store_error: Some(err.clone()),
                ..open
            });
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, DraftState::Submitting(_))
    }

    pub fn open_draft(&self) -> Option<&OpenDraft> {
        match self {
            DraftState::Idle => None,
            DraftState::Drafting(open) | DraftState::Submitting(open) => Some(open),
        }
    }

    /// The editable draft; only available while drafting.
    pub fn draft_mut(&mut self) -> Option<&mut Draft> {
        match self {
            DraftState::Drafting(open) => Some(&mut open.draft),
            _ => None,
        }
    }

    fn replace_draft(&mut self, open: OpenDraft) -> Result<(), ViewError> {
        if self.is_submitting() {
            return Err(ViewError::Busy);
        }
        *self = DraftState::Drafting(open);
        Ok(())
    }
}

/// Identifies one `load_all` round trip. Only the most recently issued
/// ticket may replace the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

pub struct PostViewController<S> {
    store: S,
    posts: Vec<Post>,
    state: DraftState,
    timeout: Duration,
    issued_loads: u64,
    last_load_error: Option<StoreError>,
}

impl<S: PostStore> PostViewController<S> {
    pub fn new(store: S, timeout: Duration) -> Self {
        Self {
            store,
            posts: Vec::new(),
            state: DraftState::Idle,
            timeout,
            issued_loads: 0,
            last_load_error: None,
        }
    }

    pub fn from_config(store: S, config: &BlogConfig) -> Self {
        Self::new(store, config.request_timeout())
    }

    /// The list as of the last applied `load_all`, in store order.
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn state(&self) -> &DraftState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Error of the most recent failed reload, cleared by the next success.
    pub fn last_load_error(&self) -> Option<&StoreError> {
        self.last_load_error.as_ref()
    }

    pub fn open_create(&mut self) -> Result<(), ViewError> {
        self.state.open_create()
    }

    pub fn open_edit(&mut self, id: PostId) -> Result<(), ViewError> {
        let post = self
            .posts
            .iter()
            .find(|post| post.id == id)
            .ok_or(ViewError::UnknownPost { id })?;
        self.state.open_edit(post)
    }

    pub fn cancel(&mut self) -> Result<(), ViewError> {
        self.state.cancel()
    }

    pub fn draft_mut(&mut self) -> Option<&mut Draft> {
        self.state.draft_mut()
    }

    /// Fetch the full list and replace the local one. On failure the previous
    /// list stays on display.
    pub async fn load_all(&mut self) -> StoreResult<()> {
        let ticket = self.begin_load();
        let result = with_timeout(self.timeout, self.store.get_posts()).await;
        self.finish_load(ticket, result).map(|_| ())
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.issued_loads += 1;
        LoadTicket(self.issued_loads)
    }

    /// Apply a fetched list. Returns `Ok(false)` when the response was
    /// dropped because a newer load has been issued since.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: StoreResult<Vec<Post>>,
    ) -> StoreResult<bool> {
        if ticket.0 != self.issued_loads {
            debug!(?ticket, latest = self.issued_loads, "dropping stale post list");
            return Ok(false);
        }
        match result {
            Ok(posts) => {
                info!(count = posts.len(), "loaded posts");
                self.posts = posts;
                self.last_load_error = None;
                Ok(true)
            }
            Err(err) => {
                warn!(error = %err, "unable to load posts, keeping the current list");
                self.last_load_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Validate the open draft and send it to the store. On success the draft
    /// is discarded, the list reloaded, and the id of the created or edited
    /// post returned. On failure the draft stays open for correction.
    pub async fn submit(&mut self) -> Result<PostId, ViewError> {
        let (target, post) = match self.state.begin_submit() {
            Ok(request) => request,
            Err(err) => {
                debug!(error = %err, "submission blocked");
                return Err(err);
            }
        };

        let result = match target {
            DraftTarget::Create => {
                with_timeout(self.timeout, self.store.create_post(&post)).await
            }
            DraftTarget::Edit(id) => with_timeout(self.timeout, self.store.edit_post(id, &post))
                .await
                .map(|_| id),
        };
        self.state.finish_submit(&result.as_ref().map(|_| ()).map_err(Clone::clone));

        match result {
            Ok(id) => {
                info!(id, ?target, "post saved");
                // A failed reload is recorded and leaves the stale list up.
                let _ = self.load_all().await;
                Ok(id)
            }
            Err(err) => {
                warn!(error = %err, ?target, "store refused the post");
                Err(err.into())
            }
        }
    }
}

async fn with_timeout<T>(
    timeout: Duration,
    call: impl Future<Output = StoreResult<T>>,
) -> StoreResult<T> {
    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| StoreError::Timeout { after: timeout })?
}
