//! Job submission and the status polling loop.

use lf_config::PollSettings;
use lf_requests::ApiClient;
use tokio::task::JoinHandle;
use tracing::info;

use crate::job::{ExportRequest, FineTuneRequest, JobSnapshot, PublishRequest, SubmitResponse};
use crate::prelude::*;

/// Submits jobs to the factory and polls them to a terminal status.
///
/// The factory exposes no push channel: after submission the only way to
/// observe a job is to fetch `/status/{job_id}` repeatedly. The loop here is
/// strictly sequential (the next round is issued only after the previous
/// response is processed), waits a fixed interval between rounds, and stops
/// exactly when the job reports `done` or `error`. A transport or decoding
/// failure during a round aborts the loop and is reported to the caller.
#[derive(Debug, Clone)]
pub struct JobController {
    api: ApiClient,
    poll: PollSettings,
}

impl JobController {
    /// Creates a controller over the given API client and polling settings.
    pub fn new(api: ApiClient, poll: PollSettings) -> Self {
        Self { api, poll }
    }

    /// The underlying API client.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Submits a fine-tune job and returns its id.
    pub async fn submit_fine_tune(&self, request: &FineTuneRequest) -> Result<String> {
        let response: SubmitResponse = self.api.post_and_deserialize("fine-tune", request).await?;
        info!("Submitted fine-tune job {}", response.job_id);
        Ok(response.job_id)
    }

    /// Submits an export job for the request's model and returns its id.
    pub async fn submit_export(&self, request: &ExportRequest) -> Result<String> {
        let endpoint = format!("export/{}", request.model_id);
        let response: SubmitResponse = self.api.post_and_deserialize(&endpoint, request).await?;
        info!(
            "Submitted export job {} for model {}",
            response.job_id, request.model_id
        );
        Ok(response.job_id)
    }

    /// Submits an Ollama publish job for the request's model and returns its id.
    pub async fn submit_publish(&self, request: &PublishRequest) -> Result<String> {
        let endpoint = format!("ollama/publish/{}", request.model_id);
        let response: SubmitResponse = self.api.post_and_deserialize(&endpoint, request).await?;
        info!(
            "Submitted publish job {} for model {} as {}",
            response.job_id, request.model_id, request.ollama_name
        );
        Ok(response.job_id)
    }

    /// Fetches the current snapshot of a job.
    pub async fn status(&self, job_id: &str) -> Result<JobSnapshot> {
        let endpoint = format!("status/{job_id}");
        Ok(self.api.get(&endpoint).await?)
    }

    /// Polls a job until it reaches a terminal status.
    ///
    /// `on_update` is invoked once per round with the fresh snapshot,
    /// including the terminal one; the terminal snapshot is then returned.
    /// With `max_rounds` configured the loop gives up with
    /// [`Error::PollCeiling`] instead of polling forever.
    pub async fn poll_to_terminal<F>(&self, job_id: &str, mut on_update: F) -> Result<JobSnapshot>
    where
        F: FnMut(&JobSnapshot),
    {
        let mut rounds: u64 = 0;
        loop {
            let snapshot = self.status(job_id).await?;
            on_update(&snapshot);
            if snapshot.status.is_terminal() {
                info!("Job {} reached terminal status {}", job_id, snapshot.status);
                return Ok(snapshot);
            }
            rounds += 1;
            if let Some(max_rounds) = self.poll.max_rounds {
                if rounds >= max_rounds {
                    return Err(Error::PollCeiling {
                        job_id: job_id.to_string(),
                        rounds,
                    });
                }
            }
            tokio::time::sleep(self.poll.interval()).await;
        }
    }

    /// Starts polling a job on a background task.
    ///
    /// The returned handle can cancel the watch or be awaited for the
    /// terminal snapshot. A watch that is never awaited keeps polling on its
    /// own until the job ends; cancel it when superseding the job.
    pub fn watch<F>(&self, job_id: impl Into<String>, on_update: F) -> PollHandle
    where
        F: FnMut(&JobSnapshot) + Send + 'static,
    {
        let controller = self.clone();
        let job_id = job_id.into();
        let task_job_id = job_id.clone();
        let task =
            tokio::spawn(async move { controller.poll_to_terminal(&task_job_id, on_update).await });
        PollHandle { job_id, task }
    }
}

/// Handle to a background polling watch.
pub struct PollHandle {
    job_id: String,
    task: JoinHandle<Result<JobSnapshot>>,
}

impl PollHandle {
    /// The job this watch is polling.
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Stops the watch. The remote job keeps running; only the client-side
    /// polling loop is torn down.
    pub fn cancel(&self) {
        self.task.abort();
    }

    /// Waits for the terminal snapshot. A cancelled watch resolves to
    /// [`Error::Cancelled`].
    pub async fn wait(self) -> Result<JobSnapshot> {
        match self.task.await {
            Ok(result) => result,
            Err(_) => Err(Error::Cancelled),
        }
    }
}
