//! The editable working copy of a post and the checks it must pass before
//! anything is sent to the store.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use crate::{
    post::{Post, PostMedia, PostType},
    wire::PostSubmission,
    BlogError,
};

/// Form fields that can carry a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Title,
    Content,
    VideoUrl,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Content => "content",
            Field::VideoUrl => "videoUrl",
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Every failing field of a draft, with a message for each.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    fn insert(&mut self, field: Field, error: BlogError) {
        self.0.insert(field, error.to_string());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let summary = self
            .iter()
            .map(|(field, msg)| format!("{field}: {msg}"))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{summary}")
    }
}

impl std::error::Error for FieldErrors {}

/// Client-side buffer behind the new/edit post form. Both URL fields are kept
/// whatever the post type is, so toggling the type never loses input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub post_type: PostType,
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub video_url: String,
}

impl Draft {
    /// Pre-populate a draft from the current values of an existing post.
    pub fn from_post(post: &Post) -> Self {
        Self {
            post_type: post.post_type,
            title: post.title.clone(),
            content: post.content.clone(),
            image_url: post.image_url.clone().unwrap_or_default(),
            video_url: post.video_url.clone().unwrap_or_default(),
        }
    }

    /// Check the draft and report all failing fields together.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        if is_blank(&self.title) {
            errors.insert(Field::Title, BlogError::EmptyTitle);
        }
        if is_blank(&self.content) {
            errors.insert(Field::Content, BlogError::EmptyContent);
        }
        if self.post_type == PostType::Video && is_blank(&self.video_url) {
            errors.insert(Field::VideoUrl, BlogError::MissingVideoUrl);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// The media variant the draft would submit. The field hidden by the
    /// current post type is left out.
    pub fn media(&self) -> PostMedia {
        match self.post_type {
            PostType::Standard => PostMedia::Standard {
                image_url: optional(&self.image_url),
            },
            PostType::Video => PostMedia::Video {
                video_url: optional(&self.video_url),
            },
        }
    }

    /// Normalize into what the store receives, on both create and edit.
    pub fn to_wire(&self) -> PostSubmission {
        PostSubmission::new(self.title.clone(), self.content.clone(), self.media())
    }
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Blank text is "no value"; anything else is sent exactly as typed.
fn optional(text: &str) -> Option<String> {
    (!is_blank(text)).then(|| text.to_string())
}
