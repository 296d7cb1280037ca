//! Factory SDK error types.

use crate::job::JobKind;

/// Factory SDK errors.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An export or publish was requested before any model id is known.
    #[error("no model available; run a fine-tune or set a model id first")]
    NoModel,

    /// Publish was requested with an empty display name.
    #[error("model name must not be empty")]
    EmptyModelName,

    /// The poll round ceiling was reached before a terminal status.
    #[error("job {job_id} still not terminal after {rounds} poll round(s)")]
    PollCeiling {
        /// The job that was being polled.
        job_id: String,
        /// Number of poll rounds issued.
        rounds: u64,
    },

    /// The polling watch was cancelled before reaching a terminal status.
    #[error("polling was cancelled")]
    Cancelled,

    /// A wait was issued for a stage with no job being tracked.
    #[error("no {0} job is being tracked")]
    NoActiveJob(JobKind),

    /// A job finished with the `error` status.
    #[error("job {job_id} failed: {message}")]
    JobFailed {
        /// The failed job.
        job_id: String,
        /// Failure detail reported by the server, or a placeholder.
        message: String,
    },

    /// A string field carried a value outside the supported set.
    #[error("unsupported {field} value: {value}")]
    Unsupported {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: String,
    },

    /// HTTP request failed.
    #[error(transparent)]
    Request(#[from] lf_requests::error::Error),

    /// Configuration loading failed.
    #[error(transparent)]
    Config(#[from] lf_config::error::Error),

    /// JSON serialization/deserialization failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
