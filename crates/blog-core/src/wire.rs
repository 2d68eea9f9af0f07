//! Messages exchanged with the post store.
use serde::{Deserialize, Serialize};

use crate::post::{PostId, PostMedia, PostType};

/// The normalized fields sent to the store on create and edit. `None` and
/// `Some("")` are different values on the wire.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PostSubmission {
    pub post_type: PostType,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
}

impl PostSubmission {
    pub fn new(title: String, content: String, media: PostMedia) -> Self {
        let post_type = media.post_type();
        let (image_url, video_url) = media.into_urls();
        Self {
            post_type,
            title,
            content,
            image_url,
            video_url,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreatePost(PostSubmission),
    EditPost { id: PostId, post: PostSubmission },
    GetPosts,
}

/// Result shape used by the store: `{"ok": value}` or `{"err": message}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RpcResult<T> {
    Ok(T),
    Err(String),
}

impl<T> From<Result<T, String>> for RpcResult<T> {
    fn from(value: Result<T, String>) -> Self {
        match value {
            Ok(val) => RpcResult::Ok(val),
            Err(msg) => RpcResult::Err(msg),
        }
    }
}

impl<T> From<RpcResult<T>> for Result<T, String> {
    fn from(value: RpcResult<T>) -> Self {
        match value {
            RpcResult::Ok(val) => Ok(val),
            RpcResult::Err(msg) => Err(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn result_uses_ok_err_keys() {
        let ok: RpcResult<PostId> = RpcResult::Ok(7);
        assert_eq!(serde_json::to_value(&ok).unwrap(), json!({ "ok": 7 }));

        let unit: RpcResult<()> = RpcResult::Ok(());
        assert_eq!(serde_json::to_value(&unit).unwrap(), json!({ "ok": null }));

        let err: RpcResult<()> =
            serde_json::from_value(json!({ "err": "duplicate title" })).unwrap();
        assert_eq!(
            Result::<(), String>::from(err),
            Err("duplicate title".to_string())
        );
    }

    #[test]
    fn edit_command_carries_id_and_fields() {
        let cmd = Command::EditPost {
            id: 4,
            post: PostSubmission {
                post_type: PostType::Video,
                title: "Clip".into(),
                content: "desc".into(),
                image_url: None,
                video_url: Some(String::new()),
            },
        };
        let value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(value["EditPost"]["id"], 4);
        assert_eq!(value["EditPost"]["post"]["postType"], "video");
        assert!(value["EditPost"]["post"]["imageUrl"].is_null());
        assert_eq!(value["EditPost"]["post"]["videoUrl"], "");

        let back: Command = serde_json::from_value(value).unwrap();
        assert_eq!(back, cmd);
    }

    #[test]
    fn get_posts_is_a_bare_string() {
        assert_eq!(
            serde_json::to_value(&Command::GetPosts).unwrap(),
            json!("GetPosts")
        );
    }
}
