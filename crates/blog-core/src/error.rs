use thiserror::Error;

pub type BlogResult<T> = anyhow::Result<T>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlogError {
    /// An empty title was provided for the post.
    #[error("Title cannot be empty")]
    EmptyTitle,
    /// An empty body was provided for the post.
    #[error("Content cannot be empty")]
    EmptyContent,
    /// A video post was submitted without a video URL.
    #[error("Video posts need a video URL")]
    MissingVideoUrl,
    /// The requested/specified ID does not exist.
    #[error("Post does not exist with the given ID({id})")]
    InvalidId { id: u64 },
    /// The config file could not be read or written.
    #[error("Config error: {msg}")]
    ConfigError { msg: String },
    /// Custom Error type for errors not covered by the above errors.
    #[error("{msg}")]
    CustomError { msg: String },
}

impl BlogError {
    pub fn custom_error(msg: String) -> Self {
        Self::CustomError { msg }
    }

    pub fn config_error(msg: String) -> Self {
        Self::ConfigError { msg }
    }
}
