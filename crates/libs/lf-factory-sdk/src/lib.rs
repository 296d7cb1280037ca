//! SDK for the LLM Factory model-preparation workflow.
//!
//! The factory runs long-lived jobs (fine-tune, export, publish to Ollama)
//! behind an HTTP API with no push channel: a client submits a job, then
//! polls `/status/{job_id}` until the job reaches a terminal status. This
//! crate provides the pieces of that client:
//!
//! - [`job`] — the wire types: requests, statuses, and per-poll snapshots.
//! - [`controller`] — submission plus the polling loop, with a cancellation
//!   handle for background watches.
//! - [`workflow`] — a session that sequences the three stages and threads
//!   the produced model id from one stage into the next.
//! - [`telemetry`] — one-shot GPU and diagnostics fetches.
//!
//! # Usage
//!
//! ```rust,no_run
//! use lf_config::PollSettings;
//! use lf_factory_sdk::WorkflowSession;
//! use lf_factory_sdk::job::FineTuneRequest;
//! use lf_requests::ApiClient;
//!
//! # async fn example() -> lf_factory_sdk::prelude::Result<()> {
//! let api = ApiClient::new("http://127.0.0.1:8000/api")?;
//! let mut session = WorkflowSession::new(api, PollSettings::default());
//!
//! session
//!     .start_fine_tune(&FineTuneRequest::default(), |job| {
//!         println!("{}: {}", job.id, job.status);
//!     })
//!     .await?;
//! let job = session.wait_fine_tune().await?;
//! println!("fine-tune finished: {}", job.status);
//! # Ok(())
//! # }
//! ```

pub mod controller;
pub mod error;
pub mod job;
pub mod prelude;
pub mod telemetry;
pub mod workflow;

#[cfg(test)]
mod test_support;

pub use controller::{JobController, PollHandle};
pub use telemetry::{GpuProbe, GpuStatus, TelemetryClient};
pub use workflow::{ExportOutcome, WorkflowSession};
