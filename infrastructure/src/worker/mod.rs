//! Worker RPC client.
//!
//! Speaks the `message/send` wire shape to remote workers:
//!
//! ```json
//! {
//!   "message": {"role": "user", "parts": [{"kind": "text", "text": "..."}],
//!               "messageId": "msg_<task_id>"},
//!   "thread": {"threadId": "<run-scoped id>"}
//! }
//! ```
//!
//! A success reply carries `result.parts`, whose text parts are
//! concatenated into the task result; `error.message` becomes a Remote
//! failure. The client verifies the worker's existence through the
//! registry's (cached) capability card before dispatching, and holds no
//! run-scoped state; it is safe to share across concurrent dispatches.

use async_trait::async_trait;
use fleet_application::{RegistryError, WorkerClient, WorkerError, WorkerRegistry, WorkerRequest};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

/// RPC client for the worker fleet
pub struct HttpWorkerClient {
    client: reqwest::Client,
    base_url: String,
    registry: Arc<dyn WorkerRegistry>,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<RpcResult>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcResult {
    #[serde(default)]
    parts: Vec<RpcPart>,
}

#[derive(Debug, Deserialize)]
struct RpcPart {
    #[serde(default)]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    #[serde(default)]
    message: String,
}

impl HttpWorkerClient {
    pub fn new(base_url: impl Into<String>, registry: Arc<dyn WorkerRegistry>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            registry,
        }
    }

    fn extract_text(response: RpcResponse) -> Result<String, WorkerError> {
        if let Some(error) = response.error {
            let message = if error.message.is_empty() {
                "unknown error".to_string()
            } else {
                error.message
            };
            return Err(WorkerError::Remote(message));
        }

        let Some(result) = response.result else {
            return Err(WorkerError::Protocol(
                "reply carried neither result nor error".to_string(),
            ));
        };

        let text = result
            .parts
            .iter()
            .filter(|part| part.kind == "text")
            .map(|part| part.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        if text.is_empty() {
            return Err(WorkerError::Protocol("no text parts in result".to_string()));
        }
        Ok(text)
    }
}

#[async_trait]
impl WorkerClient for HttpWorkerClient {
    async fn invoke(&self, worker_id: &str, request: WorkerRequest) -> Result<String, WorkerError> {
        // Existence check against the capability card (cached per worker)
        self.registry.get_card(worker_id).await.map_err(|e| match e {
            RegistryError::NotFound(id) => WorkerError::NotFound(id),
            RegistryError::Unreachable(msg) => WorkerError::Transport(msg),
        })?;

        let body = json!({
            "message": {
                "role": "user",
                "parts": [{"kind": "text", "text": request.payload}],
                "messageId": format!("msg_{}", request.correlation_id),
            },
            "thread": {"threadId": request.thread_id},
        });

        debug!("Dispatching task {} to worker {}", request.correlation_id, worker_id);

        let response = self
            .client
            .post(format!("{}/rpc/{}", self.base_url, worker_id))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    WorkerError::Timeout
                } else {
                    WorkerError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(WorkerError::Transport(format!(
                "worker RPC returned {}",
                status
            )));
        }

        let parsed: RpcResponse = response
            .json()
            .await
            .map_err(|e| WorkerError::Protocol(e.to_string()))?;

        let text = Self::extract_text(parsed)?;
        info!(
            "Worker {} completed task {} ({} chars)",
            worker_id,
            request.correlation_id,
            text.len()
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_joins_text_parts() {
        let response: RpcResponse = serde_json::from_str(
            r#"{"result": {"parts": [
                {"kind": "text", "text": "line one"},
                {"kind": "data", "text": "ignored"},
                {"kind": "text", "text": "line two"}
            ]}}"#,
        )
        .unwrap();
        assert_eq!(
            HttpWorkerClient::extract_text(response).unwrap(),
            "line one\nline two"
        );
    }

    #[test]
    fn test_extract_text_surfaces_remote_error() {
        let response: RpcResponse =
            serde_json::from_str(r#"{"error": {"message": "worker exploded"}}"#).unwrap();
        match HttpWorkerClient::extract_text(response) {
            Err(WorkerError::Remote(message)) => assert_eq!(message, "worker exploded"),
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_extract_text_rejects_shapeless_reply() {
        let response: RpcResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(matches!(
            HttpWorkerClient::extract_text(response),
            Err(WorkerError::Protocol(_))
        ));
    }

    #[test]
    fn test_extract_text_rejects_empty_parts() {
        let response: RpcResponse =
            serde_json::from_str(r#"{"result": {"parts": []}}"#).unwrap();
        assert!(matches!(
            HttpWorkerClient::extract_text(response),
            Err(WorkerError::Protocol(_))
        ));
    }
}
