use thiserror::Error;

/// Failure reported by a remote client implementation.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("remote returned HTTP {status} for {path}")]
    Status { status: u16, path: String },
    #[error("failed to decode remote response: {0}")]
    Decode(String),
}

/// Why a poll cycle produced no snapshot.
///
/// Both variants abort the cycle: the previous snapshot stays
/// published untouched and no side effects run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("remote fetch failed: {0}")]
    Remote(#[from] RemoteError),
    #[error("poll cycle exceeded its {secs}s deadline")]
    Timeout { secs: u64 },
}
