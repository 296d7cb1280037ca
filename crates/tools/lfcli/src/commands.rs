use lf_factory_sdk::job::{FineTuneRequest, JobSnapshot};
use lf_factory_sdk::prelude::*;
use lf_factory_sdk::{GpuProbe, TelemetryClient, WorkflowSession};
use log::info;

/// Per-round progress line for a watched job.
fn log_round(job: &JobSnapshot) {
    match job.progress {
        Some(progress) => info!("Job {}: {} ({}%)", job.id, job.status, progress),
        None => info!("Job {}: {}", job.id, job.status),
    }
}

/// Turns a terminal snapshot into a hard error when the job failed.
fn check_terminal(job: &JobSnapshot) -> Result<()> {
    if job.succeeded() {
        return Ok(());
    }
    Err(Error::JobFailed {
        job_id: job.id.clone(),
        message: job
            .error
            .clone()
            .unwrap_or_else(|| "no error detail reported".to_string()),
    })
}

pub async fn handle_fine_tune(
    session: &mut WorkflowSession,
    request: &FineTuneRequest,
) -> Result<()> {
    let job_id = session.start_fine_tune(request, log_round).await?;
    info!("Following fine-tune job {}", job_id);

    let job = session.wait_fine_tune().await?;
    println!("{job}");
    check_terminal(&job)?;
    match session.current_model_id() {
        Some(model_id) => println!("Model ready: {model_id}"),
        None => println!("Fine-tune finished but reported no model id"),
    }
    Ok(())
}

pub async fn handle_export(session: &mut WorkflowSession, model_id: &str) -> Result<()> {
    session.set_model_id(model_id);
    let job_id = session.start_export(log_round).await?;
    info!("Following export job {}", job_id);

    let outcome = session.wait_export().await?;
    println!("{}", outcome.job);
    check_terminal(&outcome.job)?;
    match outcome.summary {
        Some(summary) => println!("{}", serde_json::to_string_pretty(&summary)?),
        None => println!("No summary available for model {model_id}"),
    }
    Ok(())
}

pub async fn handle_publish(
    session: &mut WorkflowSession,
    model_id: &str,
    name: &str,
) -> Result<()> {
    session.set_model_id(model_id);
    let job_id = session.start_publish(name, log_round).await?;
    info!("Following publish job {}", job_id);

    let job = session.wait_publish().await?;
    println!("{job}");
    check_terminal(&job)?;
    println!("Published {model_id} to Ollama as {name}");
    Ok(())
}

pub async fn handle_pipeline(
    session: &mut WorkflowSession,
    request: &FineTuneRequest,
    name: &str,
) -> Result<()> {
    session.start_fine_tune(request, log_round).await?;
    let job = session.wait_fine_tune().await?;
    println!("{job}");
    check_terminal(&job)?;

    session.start_export(log_round).await?;
    let outcome = session.wait_export().await?;
    println!("{}", outcome.job);
    check_terminal(&outcome.job)?;
    if let Some(summary) = outcome.summary {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    session.start_publish(name, log_round).await?;
    let job = session.wait_publish().await?;
    println!("{job}");
    check_terminal(&job)?;

    // the precondition on start_export guarantees a model id by now
    if let Some(model_id) = session.current_model_id() {
        println!("Published {model_id} to Ollama as {name}");
    }
    Ok(())
}

pub async fn handle_gpu(telemetry: &TelemetryClient) -> Result<()> {
    let probe = telemetry.fetch_gpu_status().await;
    println!("{probe}");
    if let GpuProbe::Unavailable(_) = probe {
        info!("The factory may be down or not exposing metrics");
    }
    Ok(())
}

pub async fn handle_diagnose(telemetry: &TelemetryClient) -> Result<()> {
    let diagnostics = telemetry.fetch_diagnostics().await?;
    println!("{}", serde_json::to_string_pretty(&diagnostics)?);
    Ok(())
}
