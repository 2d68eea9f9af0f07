//! Core of the blog: the post model, the draft validator, the store port
//! and the view controller that ties them together. The reference store
//! server and the command-line front-end live in the `server` crate.
mod error;
pub mod client;
pub mod config;
pub mod controller;
pub mod draft;
pub mod ledger;
pub mod post;
pub mod store;
pub mod wire;

pub use error::{BlogError, BlogResult};

pub mod constant {
    pub const CONFIG_DIR: &str = ".blog";
    pub const CONFIG_FILE: &str = "blog.toml";
    pub const CONFIG_ENV: &str = "BLOGCONF";
    pub const DEFAULT_PORT: u16 = 8080;
    pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
    pub const DEFAULT_LOG_FILTER: &str = "info";
    /// Width of the text cards used to render posts.
    pub const CARD_WIDTH: usize = 50;
}

/// Used to send the store's answer back to the connection handler.
pub type Responder<T> = tokio::sync::oneshot::Sender<T>;
