//! Typed RPC client for the reference post store server.
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::net::SocketAddr;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
};
use tracing::debug;

use crate::{
    post::{Post, PostId},
    store::{PostStore, StoreError, StoreResult},
    wire::{Command, PostSubmission, RpcResult},
};

/// 10Kb buffer
const BUFFER_SIZE: usize = 10240;

/// Talks to the store over TCP, one connection per call: the JSON command is
/// written, the write half is shut down, and the whole reply is read back.
#[derive(Debug, Clone)]
pub struct RpcStore {
    socket: SocketAddr,
}

impl RpcStore {
    pub fn new(socket: SocketAddr) -> Self {
        Self { socket }
    }

    async fn call<T: DeserializeOwned>(&self, request: &Command) -> StoreResult<T> {
        let payload = serde_json::to_vec(request).map_err(transport)?;
        let mut stream = TcpStream::connect(self.socket).await.map_err(transport)?;

        stream.write_all(&payload).await.map_err(transport)?;
        stream.shutdown().await.map_err(transport)?;
        debug!(bytes = payload.len(), socket = %self.socket, "sent request");

        let mut kb_buffer = Vec::with_capacity(BUFFER_SIZE);
        let bytes = stream
            .read_to_end(&mut kb_buffer)
            .await
            .map_err(transport)?;
        debug!(bytes, "read response");

        serde_json::from_slice::<T>(&kb_buffer[..bytes]).map_err(transport)
    }
}

fn transport(err: impl std::fmt::Display) -> StoreError {
    StoreError::transport(err.to_string())
}

fn into_store_result<T>(response: RpcResult<T>) -> StoreResult<T> {
    Result::<T, String>::from(response).map_err(StoreError::rejected)
}

#[async_trait]
impl PostStore for RpcStore {
    async fn create_post(&self, post: &PostSubmission) -> StoreResult<PostId> {
        let response = self
            .call::<RpcResult<PostId>>(&Command::CreatePost(post.clone()))
            .await?;
        into_store_result(response)
    }

    async fn edit_post(&self, id: PostId, post: &PostSubmission) -> StoreResult<()> {
        let response = self
            .call::<RpcResult<()>>(&Command::EditPost {
                id,
                post: post.clone(),
            })
            .await?;
        into_store_result(response)
    }

    async fn get_posts(&self) -> StoreResult<Vec<Post>> {
        let response = self
            .call::<RpcResult<Vec<Post>>>(&Command::GetPosts)
            .await?;
        into_store_result(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn unreachable_store_is_a_transport_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let socket = listener.local_addr().unwrap();
        drop(listener);

        let err = RpcStore::new(socket).get_posts().await.unwrap_err();
        assert!(matches!(err, StoreError::Transport { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn garbage_reply_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let socket = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut conn, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            conn.read_to_end(&mut buf).await.unwrap();
            conn.write_all(b"not json").await.unwrap();
            conn.shutdown().await.unwrap();
        });

        let err = RpcStore::new(socket).get_posts().await.unwrap_err();
        assert!(matches!(err, StoreError::Transport { .. }), "{err:?}");
        server.await.unwrap();
    }
}
