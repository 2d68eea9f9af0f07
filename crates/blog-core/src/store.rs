//! The port through which the front-end reaches the post store.
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::{
    ledger::PostLedger,
    post::{Post, PostId},
    wire::PostSubmission,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store answered with an explicit `{err: message}`.
    #[error("{msg}")]
    Rejected { msg: String },
    /// The call did not complete: connection, I/O or decoding failure.
    #[error("Unable to reach the post store: {msg}")]
    Transport { msg: String },
    /// No answer arrived within the configured bound.
    #[error("The post store did not answer within {}ms", .after.as_millis())]
    Timeout { after: Duration },
}

impl StoreError {
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected { msg: msg.into() }
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport { msg: msg.into() }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The three operations the post store exposes.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Create a post; the store assigns its id and timestamp.
    async fn create_post(&self, post: &PostSubmission) -> StoreResult<PostId>;

    /// Replace the editable fields of post `id`.
    async fn edit_post(&self, id: PostId, post: &PostSubmission) -> StoreResult<()>;

    /// Every post, in store order.
    async fn get_posts(&self) -> StoreResult<Vec<Post>>;
}

/// A store kept in process memory, used for local runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    ledger: Mutex<PostLedger>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ledger(ledger: PostLedger) -> Self {
        Self {
            ledger: Mutex::new(ledger),
        }
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn create_post(&self, post: &PostSubmission) -> StoreResult<PostId> {
        self.ledger
            .lock()
            .await
            .create_post(post.clone())
            .map_err(|err| StoreError::rejected(err.to_string()))
    }

    async fn edit_post(&self, id: PostId, post: &PostSubmission) -> StoreResult<()> {
        self.ledger
            .lock()
            .await
            .edit_post(id, post.clone())
            .map_err(|err| StoreError::rejected(err.to_string()))
    }

    async fn get_posts(&self) -> StoreResult<Vec<Post>> {
        Ok(self.ledger.lock().await.posts().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::PostType;

    #[tokio::test]
    async fn memory_store_reports_rejections() {
        let store = MemoryStore::new();
        let post = PostSubmission {
            post_type: PostType::Standard,
            title: "Hello".into(),
            content: "World".into(),
            image_url: None,
            video_url: None,
        };
        let id = store.create_post(&post).await.unwrap();

        let err = store.edit_post(id + 1, &post).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected { .. }), "{err:?}");

        let posts = store.get_posts().await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, id);
    }

    #[test]
    fn timeout_message_mentions_bound() {
        let err = StoreError::Timeout {
            after: Duration::from_millis(250),
        };
        assert_eq!(err.to_string(), "The post store did not answer within 250ms");
    }
}
