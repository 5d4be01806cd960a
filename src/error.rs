use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can stop a call from producing a decoded reply.
///
/// A remote `RpcError` is not in here: the call went through, and the error
/// sits in the decoded `Response`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("request method must not be empty")]
    EmptyMethod,

    #[error("failed to serialize request: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to connect to daemon, is it running?")]
    Connection(#[source] reqwest::Error),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// A non-200 reply. `status_line` is the code plus the reason phrase the
    /// server actually sent; `body` holds the raw bytes. Display renders the
    /// body lossily as UTF-8.
    #[error("{status_line}: {}", String::from_utf8_lossy(.body))]
    Http {
        status: StatusCode,
        status_line: String,
        body: Vec<u8>,
    },

    #[error("{status_line}: failed to read response body")]
    HttpBody {
        status: StatusCode,
        status_line: String,
        #[source]
        source: reqwest::Error,
    },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed response envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("response result does not match the expected type: {0}")]
    Result(#[source] serde_json::Error),
}
