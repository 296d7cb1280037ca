//! In-process fake factory server for tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A minimal HTTP/1.1 server answering one scripted response per request.
///
/// The responder is called with `(method, path, body)` and returns the status
/// code and JSON payload to send back. Every request is recorded as
/// `"METHOD path"` so tests can assert which endpoints were (not) hit and in
/// which order.
pub struct FakeFactory {
    addr: SocketAddr,
    hits: Arc<Mutex<Vec<String>>>,
    task: JoinHandle<()>,
}

impl FakeFactory {
    pub async fn spawn<F>(mut responder: F) -> Self
    where
        F: FnMut(&str, &str, &str) -> (u16, String) + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(Mutex::new(Vec::new()));
        let recorded = hits.clone();

        let task = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let (read, mut write) = stream.into_split();
                let mut reader = BufReader::new(read);

                let mut request_line = String::new();
                if reader.read_line(&mut request_line).await.unwrap_or(0) == 0 {
                    continue;
                }
                let mut parts = request_line.split_whitespace();
                let method = parts.next().unwrap_or_default().to_string();
                let path = parts.next().unwrap_or_default().to_string();

                let mut content_length = 0usize;
                loop {
                    let mut header = String::new();
                    if reader.read_line(&mut header).await.unwrap_or(0) == 0 {
                        break;
                    }
                    if header == "\r\n" || header == "\n" {
                        break;
                    }
                    let header = header.to_ascii_lowercase();
                    if let Some(value) = header.strip_prefix("content-length:") {
                        content_length = value.trim().parse().unwrap_or(0);
                    }
                }
                let mut body = vec![0u8; content_length];
                if content_length > 0 {
                    reader.read_exact(&mut body).await.unwrap();
                }
                let body = String::from_utf8_lossy(&body).into_owned();

                recorded.lock().unwrap().push(format!("{method} {path}"));
                let (status, payload) = responder(&method, &path, &body);
                let response = format!(
                    "HTTP/1.1 {status} OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{payload}",
                    payload.len()
                );
                let _ = write.write_all(response.as_bytes()).await;
                let _ = write.shutdown().await;
            }
        });

        Self { addr, hits, task }
    }

    /// Base URL to point an `ApiClient` at.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Requests seen so far, as `"METHOD path"` in arrival order.
    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }
}

impl Drop for FakeFactory {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Serialized status payload for scripting poll rounds.
pub fn status_payload(id: &str, status: &str, logs: &[&str], model_id: Option<&str>) -> String {
    let artifacts = match model_id {
        Some(model_id) => serde_json::json!({ "model_id": model_id }),
        None => serde_json::json!({}),
    };
    serde_json::json!({
        "id": id,
        "status": status,
        "logs_tail": logs,
        "artifacts": artifacts,
    })
    .to_string()
}
