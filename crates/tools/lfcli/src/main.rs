mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use lf_config::FactoryConfig;
use lf_factory_sdk::job::FineTuneRequest;
use lf_factory_sdk::prelude::*;
use lf_factory_sdk::{TelemetryClient, WorkflowSession};
use lf_requests::ApiClient;

use crate::commands::{
    handle_diagnose, handle_export, handle_fine_tune, handle_gpu, handle_pipeline, handle_publish,
};

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => FactoryConfig::from_file(path)?,
        None => FactoryConfig::default(),
    };
    if let Some(server) = &cli.server {
        config.server.base_url = server.clone();
    }
    if let Some(interval_ms) = cli.interval_ms {
        config.poll.interval_ms = interval_ms;
    }
    if let Some(max_rounds) = cli.max_rounds {
        config.poll.max_rounds = Some(max_rounds);
    }

    let api = ApiClient::new(config.server.base_url.as_str())?;
    let telemetry = TelemetryClient::new(api.clone());
    let mut session = WorkflowSession::new(api, config.poll.clone());

    let result = match cli.command {
        Commands::FineTune { job } => {
            let request = FineTuneRequest::try_from(job)?;
            handle_fine_tune(&mut session, &request).await
        }
        Commands::Export { model_id } => handle_export(&mut session, &model_id).await,
        Commands::Publish { model_id, name } => {
            handle_publish(&mut session, &model_id, &name).await
        }
        Commands::Pipeline { job, name } => {
            let request = FineTuneRequest::try_from(job)?;
            handle_pipeline(&mut session, &request, &name).await
        }
        Commands::Gpu => handle_gpu(&telemetry).await,
        Commands::Diagnose => handle_diagnose(&telemetry).await,
    };

    if let Err(ref e) = result {
        log::error!("Error: {}", e);
    }

    result
}
