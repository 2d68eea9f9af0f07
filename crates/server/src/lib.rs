mod error;

pub use error::ServerError;

use blog_core::{
    ledger::PostLedger,
    wire::{Command, RpcResult},
    Responder,
};
use serde::Serialize;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    sync::{mpsc, oneshot},
};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// 10Kb buffer
const BUFFER_SIZE: usize = 10240;
/// Pending commands queued for the ledger task.
const COMMAND_QUEUE: usize = 16;

/// A decoded request together with the channel its reply goes back on.
pub struct StoreCommand {
    pub cmd: Command,
    pub resp: Responder<Vec<u8>>,
}

pub mod interprocess {
    use super::oneshot;

    /// Sending a response over a oneshot channel returns the input value
    /// as the error. So, no point in error handling thus this function.
    pub fn respond_with_bytes(responder: oneshot::Sender<Vec<u8>>, msg: Vec<u8>) {
        let _ = responder.send(msg);
    }
}

/// Install the `fmt` subscriber. `RUST_LOG` wins over `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn encode<T: Serialize>(result: RpcResult<T>) -> Vec<u8> {
    serde_json::to_vec(&result)
        .unwrap_or_else(|err| encode_error(format!("Unable to encode response: {err}")))
}

fn encode_error(msg: String) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({ "err": msg })).unwrap_or_default()
}

/// Run one command against the ledger and encode the reply.
pub fn dispatch(ledger: &mut PostLedger, cmd: Command) -> Vec<u8> {
    match cmd {
        Command::CreatePost(post) => {
            let result = ledger.create_post(post).map_err(|err| err.to_string());
            if let Ok(id) = &result {
                info!(id, "created post");
            }
            encode(RpcResult::from(result))
        }
        Command::EditPost { id, post } => {
            let result = ledger.edit_post(id, post).map_err(|err| err.to_string());
            if result.is_ok() {
                info!(id, "edited post");
            }
            encode(RpcResult::from(result))
        }
        Command::GetPosts => encode(RpcResult::Ok(ledger.posts())),
    }
}

/// Owns the ledger and answers queued commands one at a time.
pub async fn run_ledger(mut ledger: PostLedger, mut rx: mpsc::Receiver<StoreCommand>) {
    debug!("ledger task running");
    while let Some(StoreCommand { cmd, resp }) = rx.recv().await {
        let reply = dispatch(&mut ledger, cmd);
        interprocess::respond_with_bytes(resp, reply);
    }
    debug!("ledger task stopped");
}

pub async fn handle_conn_request(
    mut conn: TcpStream,
    tx: mpsc::Sender<StoreCommand>,
) -> anyhow::Result<()> {
    debug!(peer = ?conn.peer_addr().ok(), "connected");

    let mut kb_buffer = Vec::with_capacity(BUFFER_SIZE);
    let bytes = conn.read_to_end(&mut kb_buffer).await?;
    debug!(bytes, "read request");

    let reply = match serde_json::from_slice::<Command>(&kb_buffer[..bytes]) {
        Ok(cmd) => {
            let (responder, receiver) = oneshot::channel();
            tx.send(StoreCommand {
                cmd,
                resp: responder,
            })
            .await
            .map_err(|_| ServerError::LedgerClosed)?;
            receiver.await.map_err(|_| ServerError::LedgerClosed)?
        }
        Err(err) => {
            warn!(error = %err, "malformed request");
            encode::<()>(RpcResult::Err(format!("Malformed request: {err}")))
        }
    };

    conn.write_all(reply.as_slice()).await?;
    conn.shutdown().await?;
    Ok(())
}

/// Accept connections on `listener` forever, serving `ledger`.
pub async fn serve(listener: TcpListener, ledger: PostLedger) -> anyhow::Result<()> {
    let (tx, rx) = mpsc::channel(COMMAND_QUEUE);
    tokio::spawn(run_ledger(ledger, rx));

    info!("Listening on {}...", listener.local_addr()?);
    loop {
        let (conn, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(err) => {
                warn!(error = %err, "unable to accept connection");
                continue;
            }
        };
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Err(err) = handle_conn_request(conn, tx).await {
                error!(%peer, error = %err, "connection failed");
            }
        });
    }
}
