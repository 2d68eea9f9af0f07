use crate::{
    post::{time_in_nanos, Post, PostId},
    wire::PostSubmission,
    BlogError, BlogResult,
};
use std::time::SystemTime;

/// The reference post store: every post ever created, in creation order,
/// plus the id counter. Ids are never reused.
#[derive(Debug, Default)]
pub struct PostLedger {
    posts: Vec<Post>,
    next_id: PostId,
}

impl PostLedger {
    // ***
    // Command handlers
    // ***

    /// Adds a new post, stamped with the current time.
    pub fn create_post(&mut self, submission: PostSubmission) -> BlogResult<PostId> {
        self.create_post_at(submission, time_in_nanos(SystemTime::now())?)
    }

    /// Adds a new post with an explicit creation timestamp.
    pub fn create_post_at(
        &mut self,
        submission: PostSubmission,
        timestamp: i64,
    ) -> BlogResult<PostId> {
        verify_submission(&submission)?;
        let id = self.next_id;
        let PostSubmission {
            post_type,
            title,
            content,
            image_url,
            video_url,
        } = submission;
        self.posts.push(Post {
            id,
            post_type,
            title,
            content,
            image_url,
            video_url,
            timestamp,
        });
        self.next_id += 1;
        Ok(id)
    }

    /// Replaces the mutable fields of an existing post. The creation
    /// timestamp is left untouched.
    pub fn edit_post(&mut self, id: PostId, submission: PostSubmission) -> BlogResult<()> {
        verify_submission(&submission)?;
        let idx = self.post_id_to_idx(id)?;
        let post = self
            .posts
            .get_mut(idx)
            .ok_or(BlogError::InvalidId { id })?;
        post.post_type = submission.post_type;
        post.title = submission.title;
        post.content = submission.content;
        post.image_url = submission.image_url;
        post.video_url = submission.video_url;
        Ok(())
    }

    /// All posts, oldest first.
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Return a specific post.
    pub fn get_post(&self, id: PostId) -> Option<&Post> {
        self.post_id_to_idx(id)
            .ok()
            .and_then(|idx| self.posts.get(idx))
    }

    // ***
    // Helpers
    // ***

    /// Get the number of posts in the ledger
    pub fn size(&self) -> usize {
        self.posts.len()
    }

    /// Returns the index of the post with the associated ID. Ids are handed
    /// out in increasing order, so `posts` is sorted by id.
    fn post_id_to_idx(&self, id: PostId) -> BlogResult<usize> {
        self.posts
            .binary_search_by_key(&id, |post| post.id)
            .map_err(|_| BlogError::InvalidId { id }.into())
    }
}

/// Some necessary checks before a submission is accepted.
fn verify_submission(submission: &PostSubmission) -> BlogResult<()> {
    if submission.title.trim().is_empty() {
        return Err(BlogError::EmptyTitle.into());
    }
    if submission.content.trim().is_empty() {
        return Err(BlogError::EmptyContent.into());
    }
    Ok(())
}
