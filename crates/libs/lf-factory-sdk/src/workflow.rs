//! Workflow session sequencing fine-tune, export, and publish.

use std::collections::HashMap;

use lf_config::PollSettings;
use lf_requests::ApiClient;
use tracing::{info, warn};

use crate::controller::{JobController, PollHandle};
use crate::job::{ExportRequest, FineTuneRequest, JobKind, JobSnapshot, PublishRequest};
use crate::prelude::*;

/// Outcome of an export stage.
#[derive(Debug)]
pub struct ExportOutcome {
    /// Terminal snapshot of the export job.
    pub job: JobSnapshot,
    /// Model summary fetched after the job ended. `None` when the fetch
    /// failed; the export result itself is unaffected.
    pub summary: Option<serde_json::Value>,
}

/// Drives the three-stage model-preparation workflow.
///
/// The session owns the model id produced by the workflow and the active
/// polling watch for each stage. Starting a stage that is already being
/// watched cancels the previous watch first, so an abandoned job can never
/// deliver a stale terminal snapshot into the session. Export and publish
/// refuse to run until a model id is known; the session does not otherwise
/// enforce stage ordering.
pub struct WorkflowSession {
    controller: JobController,
    current_model_id: Option<String>,
    watches: HashMap<JobKind, PollHandle>,
}

impl WorkflowSession {
    /// Creates a session over the given API client and polling settings.
    pub fn new(api: ApiClient, poll: PollSettings) -> Self {
        Self {
            controller: JobController::new(api, poll),
            current_model_id: None,
            watches: HashMap::new(),
        }
    }

    /// The underlying job controller.
    pub fn controller(&self) -> &JobController {
        &self.controller
    }

    /// The model id the workflow is currently operating on, if any.
    pub fn current_model_id(&self) -> Option<&str> {
        self.current_model_id.as_deref()
    }

    /// Seeds the session with an already-known model id, e.g. to export or
    /// publish a model produced by an earlier run.
    pub fn set_model_id(&mut self, model_id: impl Into<String>) {
        self.current_model_id = Some(model_id.into());
    }

    /// Submits a fine-tune job and starts watching it, superseding any
    /// fine-tune watch already in flight.
    pub async fn start_fine_tune<F>(
        &mut self,
        request: &FineTuneRequest,
        on_update: F,
    ) -> Result<String>
    where
        F: FnMut(&JobSnapshot) + Send + 'static,
    {
        let job_id = self.controller.submit_fine_tune(request).await?;
        self.replace_watch(JobKind::FineTune, self.controller.watch(&*job_id, on_update));
        Ok(job_id)
    }

    /// Waits for the watched fine-tune job. A terminal snapshot carrying a
    /// `model_id` artifact becomes the session's current model.
    pub async fn wait_fine_tune(&mut self) -> Result<JobSnapshot> {
        let handle = self.take_watch(JobKind::FineTune)?;
        let snapshot = handle.wait().await?;
        self.record_artifacts(&snapshot);
        Ok(snapshot)
    }

    /// Submits an export job for the current model and starts watching it.
    ///
    /// Fails with [`Error::NoModel`] before any request is issued when no
    /// model id is known.
    pub async fn start_export<F>(&mut self, on_update: F) -> Result<String>
    where
        F: FnMut(&JobSnapshot) + Send + 'static,
    {
        let model_id = self.current_model_id.clone().ok_or(Error::NoModel)?;
        let request = ExportRequest::gguf(model_id);
        let job_id = self.controller.submit_export(&request).await?;
        self.replace_watch(JobKind::Export, self.controller.watch(&*job_id, on_update));
        Ok(job_id)
    }

    /// Waits for the watched export job, then fetches the model summary.
    ///
    /// The summary is requested only once the export job itself is terminal,
    /// and only best-effort: a failed fetch is logged and reported as
    /// `summary: None`.
    pub async fn wait_export(&mut self) -> Result<ExportOutcome> {
        let handle = self.take_watch(JobKind::Export)?;
        let job = handle.wait().await?;
        self.record_artifacts(&job);

        let summary = match self.current_model_id.as_deref() {
            Some(model_id) => {
                let endpoint = format!("summary/{model_id}");
                match self.controller.api().get_value(&endpoint).await {
                    Ok(summary) => Some(summary),
                    Err(e) => {
                        warn!("Summary fetch for model {} failed: {}", model_id, e);
                        None
                    }
                }
            }
            None => None,
        };
        Ok(ExportOutcome { job, summary })
    }

    /// Submits a publish job for the current model under the given display
    /// name and starts watching it.
    ///
    /// Fails with [`Error::NoModel`] or [`Error::EmptyModelName`] before any
    /// request is issued.
    pub async fn start_publish<F>(&mut self, display_name: &str, on_update: F) -> Result<String>
    where
        F: FnMut(&JobSnapshot) + Send + 'static,
    {
        let model_id = self.current_model_id.clone().ok_or(Error::NoModel)?;
        if display_name.trim().is_empty() {
            return Err(Error::EmptyModelName);
        }
        let request = PublishRequest::new(model_id, display_name);
        let job_id = self.controller.submit_publish(&request).await?;
        self.replace_watch(JobKind::Publish, self.controller.watch(&*job_id, on_update));
        Ok(job_id)
    }

    /// Waits for the watched publish job.
    pub async fn wait_publish(&mut self) -> Result<JobSnapshot> {
        let handle = self.take_watch(JobKind::Publish)?;
        let snapshot = handle.wait().await?;
        self.record_artifacts(&snapshot);
        Ok(snapshot)
    }

    fn replace_watch(&mut self, kind: JobKind, handle: PollHandle) {
        if let Some(previous) = self.watches.insert(kind, handle) {
            warn!(
                "Superseding {} watch for job {}; cancelling it",
                kind,
                previous.job_id()
            );
            previous.cancel();
        }
    }

    fn take_watch(&mut self, kind: JobKind) -> Result<PollHandle> {
        self.watches.remove(&kind).ok_or(Error::NoActiveJob(kind))
    }

    /// Adopts the model id from a terminal snapshot, when it carries one.
    fn record_artifacts(&mut self, snapshot: &JobSnapshot) {
        if let Some(model_id) = snapshot.model_id() {
            if self.current_model_id.as_deref() != Some(model_id) {
                info!("Workflow now tracking model {}", model_id);
            }
            self.current_model_id = Some(model_id.to_string());
        }
    }
}
