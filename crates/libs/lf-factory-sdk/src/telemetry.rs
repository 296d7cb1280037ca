//! One-shot GPU and diagnostics fetches.

use std::fmt;

use lf_requests::ApiClient;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::prelude::*;

/// GPU availability as reported by the factory host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpuStatus {
    /// An NVIDIA device was detected.
    pub nvidia: bool,
    /// An AMD device was detected.
    pub amd: bool,
    /// Driver identification lines, when the host reports them.
    #[serde(default)]
    pub drivers: Vec<String>,
}

/// Result of a GPU probe.
///
/// A failed probe is not an error: the factory may simply be unreachable or
/// not expose metrics. It is surfaced as a distinct state so callers can
/// display it instead of silently dropping it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GpuProbe {
    /// The probe answered.
    Available(GpuStatus),
    /// The probe failed; carries the failure text.
    Unavailable(String),
}

impl fmt::Display for GpuStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPU: NVIDIA={} AMD={}", self.nvidia, self.amd)?;
        for driver in &self.drivers {
            write!(f, "\n  {driver}")?;
        }
        Ok(())
    }
}

impl fmt::Display for GpuProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuProbe::Available(status) => write!(f, "{status}"),
            GpuProbe::Unavailable(reason) => write!(f, "GPU status unavailable: {reason}"),
        }
    }
}

/// Client for the factory's metrics endpoints.
///
/// Fetches are one-shot: no retry, no state kept between calls.
#[derive(Debug, Clone)]
pub struct TelemetryClient {
    api: ApiClient,
}

impl TelemetryClient {
    /// Creates a telemetry client over the given API client.
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Probes GPU availability. Never fails; an unreachable or broken
    /// endpoint yields [`GpuProbe::Unavailable`].
    pub async fn fetch_gpu_status(&self) -> GpuProbe {
        match self.api.get::<GpuStatus>("metrics/gpu").await {
            Ok(status) => GpuProbe::Available(status),
            Err(e) => {
                warn!("GPU probe failed: {}", e);
                GpuProbe::Unavailable(e.to_string())
            }
        }
    }

    /// Fetches the diagnostics payload. The structure is server-defined and
    /// returned as raw JSON for display.
    pub async fn fetch_diagnostics(&self) -> Result<serde_json::Value> {
        Ok(self.api.get_value("metrics/diagnose").await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeFactory;

    #[tokio::test]
    async fn gpu_probe_reports_detected_devices() {
        let server = FakeFactory::spawn(|method, path, _| {
            assert_eq!(method, "GET");
            assert_eq!(path, "/metrics/gpu");
            (
                200,
                "{\"nvidia\": true, \"amd\": false, \"drivers\": [\"NVIDIA-SMI 550.54\"]}"
                    .to_string(),
            )
        })
        .await;

        let client = TelemetryClient::new(ApiClient::new(server.url()).unwrap());
        match client.fetch_gpu_status().await {
            GpuProbe::Available(status) => {
                assert!(status.nvidia);
                assert!(!status.amd);
                assert_eq!(status.drivers, vec!["NVIDIA-SMI 550.54"]);
            }
            GpuProbe::Unavailable(reason) => panic!("Expected available probe, got {reason}"),
        }
    }

    #[tokio::test]
    async fn failed_gpu_probe_is_unavailable_not_an_error() {
        let server =
            FakeFactory::spawn(|_, _, _| (500, "{\"detail\": \"no metrics\"}".to_string())).await;

        let client = TelemetryClient::new(ApiClient::new(server.url()).unwrap());
        match client.fetch_gpu_status().await {
            GpuProbe::Unavailable(reason) => assert!(reason.contains("500")),
            GpuProbe::Available(status) => panic!("Expected unavailable probe, got {status}"),
        }
    }

    #[tokio::test]
    async fn diagnostics_returns_opaque_json() {
        let server = FakeFactory::spawn(|_, path, _| {
            assert_eq!(path, "/metrics/diagnose");
            (200, "{\"ollama\": \"reachable\", \"disk_free_gb\": 12}".to_string())
        })
        .await;

        let client = TelemetryClient::new(ApiClient::new(server.url()).unwrap());
        let diagnostics = client.fetch_diagnostics().await.unwrap();
        assert_eq!(diagnostics["disk_free_gb"], 12);
    }

    #[tokio::test]
    async fn diagnostics_failure_surfaces_displayable_text() {
        let server =
            FakeFactory::spawn(|_, _, _| (503, "{\"detail\": \"probe crashed\"}".to_string())).await;

        let client = TelemetryClient::new(ApiClient::new(server.url()).unwrap());
        let error = client.fetch_diagnostics().await.unwrap_err();
        assert!(error.to_string().contains("probe crashed"));
    }
}
