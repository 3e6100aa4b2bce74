//! Worker discovery over the control plane.
//!
//! Enumerates workers via `POST {base}/workers/search`, then fetches each
//! worker's capability card from `GET {base}/workers/{id}/card`. Workers
//! that cannot present a card are silently excluded; an unreachable
//! control plane yields an empty list so the planner can report "no
//! workers available" as a normal outcome. Cards are cached for the
//! registry's lifetime.

use async_trait::async_trait;
use fleet_application::{RegistryError, WorkerRegistry};
use fleet_domain::WorkerCapability;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, warn};

const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);
const CARD_TIMEOUT: Duration = Duration::from_secs(5);

/// Registry backed by the control plane's discovery endpoints
pub struct HttpWorkerRegistry {
    client: reqwest::Client,
    base_url: String,
    cards: RwLock<HashMap<String, WorkerCapability>>,
}

#[derive(Debug, Deserialize)]
struct SearchEntry {
    worker_id: String,
    /// The control plane lists the router itself among its workers
    #[serde(default)]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct CardPayload {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    capabilities: Vec<String>,
    #[serde(default)]
    skills: Vec<String>,
}

impl HttpWorkerRegistry {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            cards: RwLock::new(HashMap::new()),
        }
    }

    /// Worker ids worth fetching cards for: everything except the router.
    fn dispatchable_ids(entries: Vec<SearchEntry>) -> Vec<String> {
        entries
            .into_iter()
            .filter(|e| e.kind != "router")
            .map(|e| e.worker_id)
            .collect()
    }

    async fn fetch_card(&self, worker_id: &str) -> Result<WorkerCapability, RegistryError> {
        let url = format!("{}/workers/{}/card", self.base_url, worker_id);
        let response = self
            .client
            .get(&url)
            .timeout(CARD_TIMEOUT)
            .send()
            .await
            .map_err(|e| RegistryError::Unreachable(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(worker_id.to_string()));
        }
        if !response.status().is_success() {
            return Err(RegistryError::Unreachable(format!(
                "card fetch returned {}",
                response.status()
            )));
        }

        let payload: CardPayload = response
            .json()
            .await
            .map_err(|e| RegistryError::Unreachable(e.to_string()))?;

        let capability = WorkerCapability {
            worker_id: worker_id.to_string(),
            name: if payload.name.is_empty() {
                worker_id.to_string()
            } else {
                payload.name
            },
            description: payload.description,
            capabilities: payload.capabilities,
            skills: payload.skills,
        };

        self.cards
            .write()
            .await
            .insert(worker_id.to_string(), capability.clone());
        Ok(capability)
    }
}

#[async_trait]
impl WorkerRegistry for HttpWorkerRegistry {
    async fn list_workers(&self) -> Vec<WorkerCapability> {
        let search = self
            .client
            .post(format!("{}/workers/search", self.base_url))
            .timeout(SEARCH_TIMEOUT)
            .json(&json!({}))
            .send()
            .await;

        let entries: Vec<SearchEntry> = match search {
            Ok(response) if response.status().is_success() => {
                match response.json().await {
                    Ok(entries) => entries,
                    Err(e) => {
                        warn!("Discovery reply was not decodable: {}", e);
                        return Vec::new();
                    }
                }
            }
            Ok(response) => {
                warn!("Discovery returned {}", response.status());
                return Vec::new();
            }
            Err(e) => {
                warn!(
                    "Control plane unreachable at {}: {}",
                    self.base_url, e
                );
                return Vec::new();
            }
        };

        let mut workers = Vec::new();
        for worker_id in Self::dispatchable_ids(entries) {
            match self.fetch_card(&worker_id).await {
                Ok(capability) => {
                    info!("Registered worker: {} ({})", capability.name, worker_id);
                    workers.push(capability);
                }
                Err(e) => {
                    warn!("Failed to fetch card for {}: {}", worker_id, e);
                }
            }
        }

        info!("Discovery registered {} workers", workers.len());
        workers
    }

    async fn get_card(&self, worker_id: &str) -> Result<WorkerCapability, RegistryError> {
        if let Some(card) = self.cards.read().await.get(worker_id) {
            return Ok(card.clone());
        }
        self.fetch_card(worker_id).await
    }
}
