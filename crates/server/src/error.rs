use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    /// The task that owns the ledger has stopped.
    #[error("ERROR: the post ledger is no longer running")]
    LedgerClosed,
}
