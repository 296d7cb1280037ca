use clap::{Args, Parser, Subcommand};
use lf_factory_sdk::job::{
    BaseModelSource, ExportFormat, FineTuneMethod, FineTuneRequest, QuantizationTarget, TargetGpu,
};
use lf_factory_sdk::prelude::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lfc")]
#[command(about = "LLM Factory - fine-tune, export, and publish models to Ollama")]
pub struct Cli {
    /// Base URL of the factory API
    #[arg(short, long)]
    pub server: Option<String>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Delay between status polls, in milliseconds
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Give up after this many status polls per job
    #[arg(long)]
    pub max_rounds: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start a fine-tune job and follow it to completion
    FineTune {
        #[command(flatten)]
        job: FineTuneArgs,
    },

    /// Export a model to GGUF and print its summary
    Export {
        /// Model to export
        #[arg(long)]
        model_id: String,
    },

    /// Publish an exported model to Ollama
    Publish {
        /// Model to publish
        #[arg(long)]
        model_id: String,

        /// Display name the model is registered under
        #[arg(long)]
        name: String,
    },

    /// Run the whole workflow: fine-tune, export, publish
    Pipeline {
        #[command(flatten)]
        job: FineTuneArgs,

        /// Display name for the published model
        #[arg(long)]
        name: String,
    },

    /// Show GPU availability on the factory host
    Gpu,

    /// Fetch the factory's diagnostics payload
    Diagnose,
}

#[derive(Args)]
pub struct FineTuneArgs {
    /// Base model reference
    #[arg(long, default_value = "Qwen/Qwen2.5-0.5B")]
    pub base_model: String,

    /// Where the base model comes from: local_path, huggingface, github_release, url
    #[arg(long, default_value = "huggingface")]
    pub source: String,

    /// GPU to target: nvidia, amd, cpu
    #[arg(long, default_value = "cpu")]
    pub gpu: String,

    /// Fine-tune method: lora, full_finetune, rlhf, dpo
    #[arg(long, default_value = "lora")]
    pub method: String,

    /// Training dataset reference
    #[arg(long)]
    pub dataset: Option<String>,

    /// Quantization target: none, int8, int4, fp8
    #[arg(long, default_value = "int8")]
    pub quantization: String,

    /// Export format requested downstream: gguf, safetensors
    #[arg(long, default_value = "gguf")]
    pub format: String,

    /// Actually run the job instead of a dry run
    #[arg(long)]
    pub no_dry_run: bool,
}

impl TryFrom<FineTuneArgs> for FineTuneRequest {
    type Error = Error;

    fn try_from(value: FineTuneArgs) -> Result<Self> {
        Ok(Self {
            base_model_source: BaseModelSource::try_from(value.source.as_str())?,
            base_model: value.base_model,
            target_gpu: TargetGpu::try_from(value.gpu.as_str())?,
            fine_tune_method: FineTuneMethod::try_from(value.method.as_str())?,
            dataset: value.dataset,
            quantization_target: QuantizationTarget::try_from(value.quantization.as_str())?,
            export_format: ExportFormat::try_from(value.format.as_str())?,
            dry_run: !value.no_dry_run,
        })
    }
}
