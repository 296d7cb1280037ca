//! Request error types.

/// Request errors.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Transport-level failure (connection, timeout, invalid URL).
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("server returned {status}: {body}")]
    Status {
        /// HTTP status code of the response.
        status: reqwest::StatusCode,
        /// Raw response body, kept for display.
        body: String,
    },

    /// The response body was not the expected JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
