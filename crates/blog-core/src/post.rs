//! This module defines the `Post` struct, the record the store owns and the
//! front-end lists.

use chrono::{DateTime, Local, Utc};
use std::fmt::{Display, Formatter};
use std::time::SystemTime;
use textwrap::core::display_width;
use textwrap::{self, wrap};

use crate::{constant::CARD_WIDTH, BlogResult};

/// Store-assigned identifier of a post.
pub type PostId = u64;

const NANOS_PER_SEC: i64 = 1_000_000_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    #[default]
    Standard,
    Video,
}

impl Display for PostType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PostType::Standard => write!(f, "standard"),
            PostType::Video => write!(f, "video"),
        }
    }
}

impl std::str::FromStr for PostType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(PostType::Standard),
            "video" => Ok(PostType::Video),
            other => Err(format!("unknown post type '{other}', expected standard or video")),
        }
    }
}

/// The media attached to a post, keyed on its type. Only one of the two
/// URLs carried on the wire is ever meaningful.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostMedia {
    Standard { image_url: Option<String> },
    Video { video_url: Option<String> },
}

impl PostMedia {
    pub fn post_type(&self) -> PostType {
        match self {
            PostMedia::Standard { .. } => PostType::Standard,
            PostMedia::Video { .. } => PostType::Video,
        }
    }

    /// Split back into the `(image_url, video_url)` pair the store expects.
    pub fn into_urls(self) -> (Option<String>, Option<String>) {
        match self {
            PostMedia::Standard { image_url } => (image_url, None),
            PostMedia::Video { video_url } => (None, video_url),
        }
    }
}

/// A post as listed by the store.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub post_type: PostType,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    /// Creation time in nanoseconds since the Unix epoch. Edits keep it.
    pub timestamp: i64,
}

impl Post {
    /// The media field that is active for this post's type.
    pub fn media(&self) -> PostMedia {
        match self.post_type {
            PostType::Standard => PostMedia::Standard {
                image_url: self.image_url.clone(),
            },
            PostType::Video => PostMedia::Video {
                video_url: self.video_url.clone(),
            },
        }
    }

    /// Creation time in the local timezone, if the timestamp is representable.
    pub fn created_at(&self) -> Option<DateTime<Local>> {
        let secs = self.timestamp.div_euclid(NANOS_PER_SEC);
        let nanos = self.timestamp.rem_euclid(NANOS_PER_SEC) as u32;
        DateTime::<Utc>::from_timestamp(secs, nanos).map(|utc| utc.with_timezone(&Local))
    }
}

pub(crate) fn time_in_nanos(time: SystemTime) -> BlogResult<i64> {
    Ok(time
        .duration_since(std::time::UNIX_EPOCH)?
        .as_nanos()
        .try_into()?)
}

impl Display for Post {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let width = CARD_WIDTH;
        let border = width + 4;
        writeln!(f, "{:-<border$}", "")?;
        writeln!(f, "\\ {:^width$} /", self.title)?;

        let created = self
            .created_at()
            .map(|time| time.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown date".into());
        let media = match self.media() {
            PostMedia::Standard {
                image_url: Some(url),
            } => Some(format!("[image] {url}")),
            PostMedia::Video {
                video_url: Some(url),
            } => Some(format!("[video] {url}")),
            _ => None,
        };

        let mut lines = vec![format!("#{} {}", self.id, created)];
        lines.extend(media);
        lines.push(String::new());

        let wrapping_config = textwrap::Options::new(width).break_words(true);
        let body = lines
            .iter()
            .flat_map(|line| wrap(line, wrapping_config.clone()))
            .map(|line| line.into_owned())
            .chain(
                wrap(&self.content, wrapping_config.clone())
                    .into_iter()
                    .map(|line| line.into_owned()),
            );

        // Closures alternate so the card edges zig-zag.
        for (count, line) in body.enumerate() {
            let (left_closure, right_closure) = if count % 2 == 0 {
                ("/ ", " \\")
            } else {
                ("\\ ", " /")
            };
            let whitespace = width.saturating_sub(display_width(&line));
            writeln!(
                f,
                "{left_closure}{}{}{right_closure}",
                line,
                " ".repeat(whitespace)
            )?;
        }
        write!(f, "{:-<border$}", "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(post_type: PostType) -> Post {
        Post {
            id: 3,
            post_type,
            title: String::from("First Post"),
            content: String::from("This is a demo post with emojis to test formatting 😃😃"),
            image_url: Some("https://example.com/cat.png".into()),
            video_url: Some("https://example.com/cat.mp4".into()),
            timestamp: 1_700_000_000_123_456_789,
        }
    }

    #[test]
    fn post_formatting_using_display() {
        let rendered = sample(PostType::Standard).to_string();
        println!("{}", rendered);
        assert!(rendered.contains("First Post"));
        assert!(rendered.contains("[image] https://example.com/cat.png"));
        assert!(!rendered.contains("[video]"));

        let rendered = sample(PostType::Video).to_string();
        println!("{}", rendered);
        assert!(rendered.contains("[video] https://example.com/cat.mp4"));
        assert!(!rendered.contains("[image]"));
    }

    #[test]
    fn media_follows_post_type() {
        let post = sample(PostType::Video);
        assert_eq!(
            post.media(),
            PostMedia::Video {
                video_url: Some("https://example.com/cat.mp4".into())
            }
        );
        assert_eq!(
            post.media().into_urls(),
            (None, Some("https://example.com/cat.mp4".into()))
        );
    }

    #[test]
    fn serializes_with_store_field_names() {
        let mut post = sample(PostType::Standard);
        post.video_url = None;
        let value = serde_json::to_value(&post).unwrap();
        assert_eq!(value["postType"], "standard");
        assert_eq!(value["imageUrl"], "https://example.com/cat.png");
        assert!(value["videoUrl"].is_null());
        assert_eq!(value["timestamp"], 1_700_000_000_123_456_789i64);

        let back: Post = serde_json::from_value(value).unwrap();
        assert_eq!(back, post);
    }

    #[test]
    fn created_at_uses_nanosecond_epoch() {
        let post = sample(PostType::Standard);
        let created = post.created_at().unwrap();
        assert_eq!(created.timestamp(), 1_700_000_000);
    }

    #[test]
    fn post_type_from_str() {
        assert_eq!("Video".parse::<PostType>(), Ok(PostType::Video));
        assert_eq!(" standard ".parse::<PostType>(), Ok(PostType::Standard));
        assert!("gallery".parse::<PostType>().is_err());
    }
}
