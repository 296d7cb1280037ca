//! Job types for the factory workflow.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::prelude::*;

/// Artifact key under which a job reports the model it produced.
pub const MODEL_ID_ARTIFACT: &str = "model_id";

/// Workflow stage a job belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    /// Fine-tune a base model.
    FineTune,
    /// Export a fine-tuned model to a packaging format.
    Export,
    /// Publish an exported model to Ollama.
    Publish,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::FineTune => write!(f, "fine-tune"),
            JobKind::Export => write!(f, "export"),
            JobKind::Publish => write!(f, "publish"),
        }
    }
}

/// Status of a remote job as reported by the server.
///
/// The terminal labels are server-defined; only `done` and `error` stop the
/// polling loop. Anything else, known or not, keeps it running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Waiting to be picked up by a worker.
    Queued,
    /// Currently executing.
    Running,
    /// Finished successfully.
    Done,
    /// Finished with a failure.
    Error,
    /// A status string this client does not recognize.
    Other(String),
}

impl JobStatus {
    /// Whether polling should stop at this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Error)
    }

    /// The raw status string.
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Done => "done",
            JobStatus::Error => "error",
            JobStatus::Other(value) => value,
        }
    }
}

impl From<&str> for JobStatus {
    fn from(value: &str) -> Self {
        match value {
            "queued" => JobStatus::Queued,
            "running" => JobStatus::Running,
            "done" => JobStatus::Done,
            "error" => JobStatus::Error,
            other => JobStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for JobStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JobStatus {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> core::result::Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(JobStatus::from(value.as_str()))
    }
}

/// One poll response for a job.
///
/// The server reports the full log tail on every round; each snapshot
/// replaces the previous one rather than extending it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSnapshot {
    /// Opaque job identifier assigned by the server.
    pub id: String,
    /// Server-side job kind label, when reported.
    #[serde(default)]
    pub kind: Option<String>,
    /// Current status.
    pub status: JobStatus,
    /// Progress percentage, when reported.
    #[serde(default)]
    pub progress: Option<u8>,
    /// Most recent log lines, most-recent-last.
    #[serde(default)]
    pub logs_tail: Vec<String>,
    /// Named outputs of the job.
    #[serde(default)]
    pub artifacts: HashMap<String, String>,
    /// Failure detail when the job ended in an error.
    #[serde(default)]
    pub error: Option<String>,
}

impl JobSnapshot {
    /// The model id artifact, when the job has produced one.
    pub fn model_id(&self) -> Option<&str> {
        self.artifacts.get(MODEL_ID_ARTIFACT).map(String::as_str)
    }

    /// Whether the job finished successfully.
    pub fn succeeded(&self) -> bool {
        self.status == JobStatus::Done
    }
}

impl fmt::Display for JobSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Job {} - {}", self.id, self.status)?;
        if let Some(progress) = self.progress {
            write!(f, " ({progress}%)")?;
        }
        if let Some(error) = &self.error {
            write!(f, " - {error}")?;
        }
        for line in &self.logs_tail {
            write!(f, "\n{line}")?;
        }
        Ok(())
    }
}

/// Response to a job submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// Identifier of the newly created job.
    pub job_id: String,
}

/// Where the base model is fetched from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseModelSource {
    /// A path on the factory host.
    LocalPath,
    /// A Hugging Face model reference.
    #[default]
    Huggingface,
    /// A GitHub release asset.
    GithubRelease,
    /// A plain download URL.
    Url,
}

/// GPU vendor the fine-tune should target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetGpu {
    /// NVIDIA CUDA device.
    Nvidia,
    /// AMD ROCm device.
    Amd,
    /// CPU-only execution.
    #[default]
    Cpu,
}

/// Fine-tuning algorithm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FineTuneMethod {
    /// Low-rank adaptation.
    #[default]
    Lora,
    /// Full-parameter fine-tune.
    FullFinetune,
    /// Reinforcement learning from human feedback.
    Rlhf,
    /// Direct preference optimization.
    Dpo,
}

/// Quantization applied after fine-tuning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantizationTarget {
    /// Keep full precision.
    None,
    /// 8-bit integer quantization.
    #[default]
    Int8,
    /// 4-bit integer quantization.
    Int4,
    /// 8-bit float quantization.
    Fp8,
}

/// Packaging format for exported models.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// GGUF, the format Ollama consumes.
    #[default]
    Gguf,
    /// Raw safetensors weights.
    Safetensors,
}

impl TryFrom<&str> for BaseModelSource {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "local_path" => Ok(BaseModelSource::LocalPath),
            "huggingface" => Ok(BaseModelSource::Huggingface),
            "github_release" => Ok(BaseModelSource::GithubRelease),
            "url" => Ok(BaseModelSource::Url),
            other => Err(Error::Unsupported {
                field: "base_model_source",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<&str> for TargetGpu {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "nvidia" => Ok(TargetGpu::Nvidia),
            "amd" => Ok(TargetGpu::Amd),
            "cpu" => Ok(TargetGpu::Cpu),
            other => Err(Error::Unsupported {
                field: "target_gpu",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<&str> for FineTuneMethod {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "lora" => Ok(FineTuneMethod::Lora),
            "full_finetune" => Ok(FineTuneMethod::FullFinetune),
            "rlhf" => Ok(FineTuneMethod::Rlhf),
            "dpo" => Ok(FineTuneMethod::Dpo),
            other => Err(Error::Unsupported {
                field: "fine_tune_method",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<&str> for QuantizationTarget {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "none" => Ok(QuantizationTarget::None),
            "int8" => Ok(QuantizationTarget::Int8),
            "int4" => Ok(QuantizationTarget::Int4),
            "fp8" => Ok(QuantizationTarget::Fp8),
            other => Err(Error::Unsupported {
                field: "quantization_target",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<&str> for ExportFormat {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "gguf" => Ok(ExportFormat::Gguf),
            "safetensors" => Ok(ExportFormat::Safetensors),
            other => Err(Error::Unsupported {
                field: "export_format",
                value: other.to_string(),
            }),
        }
    }
}

/// Fine-tune submission body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FineTuneRequest {
    /// Where the base model is fetched from.
    pub base_model_source: BaseModelSource,
    /// Base model reference.
    pub base_model: String,
    /// GPU vendor to run on.
    pub target_gpu: TargetGpu,
    /// Fine-tuning algorithm.
    pub fine_tune_method: FineTuneMethod,
    /// Optional training dataset reference.
    #[serde(default)]
    pub dataset: Option<String>,
    /// Quantization applied after fine-tuning.
    pub quantization_target: QuantizationTarget,
    /// Packaging format requested for the later export.
    pub export_format: ExportFormat,
    /// Whether to run a quick dry-run pass instead of a real job.
    pub dry_run: bool,
}

impl Default for FineTuneRequest {
    fn default() -> Self {
        Self {
            base_model_source: BaseModelSource::default(),
            base_model: "Qwen/Qwen2.5-0.5B".to_string(),
            target_gpu: TargetGpu::default(),
            fine_tune_method: FineTuneMethod::default(),
            dataset: None,
            quantization_target: QuantizationTarget::default(),
            export_format: ExportFormat::default(),
            dry_run: true,
        }
    }
}

/// Export submission body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRequest {
    /// Model to export.
    pub model_id: String,
    /// Packaging format.
    pub export_format: ExportFormat,
}

impl ExportRequest {
    /// An export request for the GGUF format Ollama consumes.
    pub fn gguf(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            export_format: ExportFormat::Gguf,
        }
    }
}

/// Publish submission body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishRequest {
    /// Model to publish.
    pub model_id: String,
    /// Display name the model is registered under in Ollama.
    pub ollama_name: String,
    /// Whether the server should start serving the model right away.
    pub auto_serve: bool,
}

impl PublishRequest {
    /// A publish request with serving enabled.
    pub fn new(model_id: impl Into<String>, ollama_name: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            ollama_name: ollama_name.into(),
            auto_serve: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_done_and_error_are_terminal() {
        assert!(JobStatus::Done.is_terminal());
        assert!(JobStatus::Error.is_terminal());
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(!JobStatus::Other("quantizing".to_string()).is_terminal());
    }

    #[test]
    fn status_round_trips_through_json() {
        let status: JobStatus = serde_json::from_str("\"running\"").unwrap();
        assert_eq!(status, JobStatus::Running);
        let status: JobStatus = serde_json::from_str("\"quantizing\"").unwrap();
        assert_eq!(status, JobStatus::Other("quantizing".to_string()));
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"quantizing\"");
    }

    #[test]
    fn snapshot_deserializes_server_payload() {
        let snapshot: JobSnapshot = serde_json::from_str(
            r#"{
                "id": "abc",
                "kind": "fine-tune",
                "status": "done",
                "progress": 80,
                "logs_tail": ["started", "finished"],
                "artifacts": {"model_id": "m1"},
                "error": null
            }"#,
        )
        .unwrap();
        assert_eq!(snapshot.model_id(), Some("m1"));
        assert!(snapshot.succeeded());
        assert_eq!(snapshot.logs_tail.len(), 2);
    }

    #[test]
    fn snapshot_tolerates_missing_optional_fields() {
        let snapshot: JobSnapshot =
            serde_json::from_str(r#"{"id": "abc", "status": "queued"}"#).unwrap();
        assert_eq!(snapshot.status, JobStatus::Queued);
        assert_eq!(snapshot.model_id(), None);
        assert!(snapshot.logs_tail.is_empty());
        assert!(!snapshot.succeeded());
    }

    #[test]
    fn fine_tune_defaults_match_service_defaults() {
        let request = FineTuneRequest::default();
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["base_model_source"], "huggingface");
        assert_eq!(json["target_gpu"], "cpu");
        assert_eq!(json["fine_tune_method"], "lora");
        assert_eq!(json["quantization_target"], "int8");
        assert_eq!(json["export_format"], "gguf");
        assert_eq!(json["dry_run"], true);
    }

    #[test]
    fn publish_request_always_asks_for_serving() {
        let request = PublishRequest::new("m1", "demo-model");
        assert!(request.auto_serve);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["ollama_name"], "demo-model");
    }

    #[test]
    fn enum_values_parse_from_cli_strings() {
        assert_eq!(
            FineTuneMethod::try_from("dpo").unwrap(),
            FineTuneMethod::Dpo
        );
        assert_eq!(
            QuantizationTarget::try_from("fp8").unwrap(),
            QuantizationTarget::Fp8
        );
        assert!(matches!(
            TargetGpu::try_from("tpu"),
            Err(Error::Unsupported { field: "target_gpu", .. })
        ));
    }
}
