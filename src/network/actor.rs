//! Network actor - executes tab requests and cloud calls in the Tokio runtime
//!
//! At most one in-flight call is tracked per tab id. A cancel fires the
//! call's oneshot handle and reports a `Cancelled` completion so the tab
//! never sticks in its loading state; a second execute for the same tab
//! silently supersedes the first.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinSet;

use crate::messages::network::{CloudAction, NetworkCommand, NetworkEvent};
use crate::models::ApiResponse;
use crate::network::cloud::CloudClient;
use crate::network::engine::{self, create_client};

/// Cancellation handle for an in-flight request
struct ActiveCall {
    cancel_tx: oneshot::Sender<()>,
    started: Instant,
    /// Which send owns the slot; stale completions must not touch it
    generation: u64,
}

type CallMap = Arc<Mutex<HashMap<String, ActiveCall>>>;

/// Remove the call entry only when it still belongs to the completing send.
/// A newer send may have claimed the slot, or a cancel may have cleared it;
/// either way the completion is stale and must not surface.
fn claim_completion(calls: &mut HashMap<String, ActiveCall>, tab_id: &str, generation: u64) -> bool {
    match calls.get(tab_id) {
        Some(active) if active.generation == generation => {
            calls.remove(tab_id);
            true
        }
        _ => false,
    }
}

/// Network actor that processes execution and cloud commands
pub struct NetworkActor {
    client: reqwest::Client,
    cloud: CloudClient,
    event_tx: mpsc::UnboundedSender<NetworkEvent>,
    tasks: JoinSet<()>,
    calls: CallMap,
    next_generation: u64,
}

impl NetworkActor {
    pub fn new(event_tx: mpsc::UnboundedSender<NetworkEvent>, cloud_base_url: impl Into<String>) -> Self {
        NetworkActor {
            client: create_client(),
            cloud: CloudClient::new(cloud_base_url),
            event_tx,
            tasks: JoinSet::new(),
            calls: Arc::new(Mutex::new(HashMap::new())),
            next_generation: 0,
        }
    }

    /// Run the network actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<NetworkCommand>) {
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(NetworkCommand::Execute { tab_id, request }) => {
                            self.execute(tab_id, request).await;
                        }
                        Some(NetworkCommand::Cancel { tab_id }) => {
                            self.cancel(tab_id).await;
                        }
                        Some(cloud_cmd @ (NetworkCommand::PushCollection(_)
                            | NetworkCommand::FetchCollections
                            | NetworkCommand::FetchSharedCollection { .. }
                            | NetworkCommand::Register { .. }
                            | NetworkCommand::Login { .. }
                            | NetworkCommand::Logout
                            | NetworkCommand::CheckSession)) => {
                            self.spawn_cloud_call(cloud_cmd);
                        }
                        Some(NetworkCommand::Shutdown) => {
                            for (_, active) in self.calls.lock().await.drain() {
                                let _ = active.cancel_tx.send(());
                            }
                            break;
                        }
                        None => break,
                    }
                }

                // Reap finished tasks
                Some(_result) = self.tasks.join_next() => {}
            }
        }
    }

    async fn execute(&mut self, tab_id: String, request: crate::models::ApiRequest) {
        self.next_generation += 1;
        let generation = self.next_generation;
        {
            let mut calls = self.calls.lock().await;
            // A newer send supersedes any call still in flight for this tab;
            // the superseded task exits without reporting
            if let Some(previous) = calls.remove(&tab_id) {
                tracing::info!(tab = %tab_id, "superseding in-flight request");
                let _ = previous.cancel_tx.send(());
            }
            let (cancel_tx, cancel_rx) = oneshot::channel();
            calls.insert(
                tab_id.clone(),
                ActiveCall {
                    cancel_tx,
                    started: Instant::now(),
                    generation,
                },
            );

            let client = self.client.clone();
            let event_tx = self.event_tx.clone();
            let call_map = Arc::clone(&self.calls);
            self.tasks.spawn(async move {
                tracing::info!(tab = %tab_id, method = ?request.method, url = %request.url, "executing request");
                tokio::select! {
                    biased;

                    _ = cancel_rx => {}
                    response = engine::execute(&client, &request) => {
                        let owned = claim_completion(&mut *call_map.lock().await, &tab_id, generation);
                        if !owned {
                            tracing::debug!(tab = %tab_id, "dropping superseded completion");
                            return;
                        }
                        tracing::info!(tab = %tab_id, status = response.status, "request completed");
                        let _ = event_tx.send(NetworkEvent::RequestCompleted { tab_id, response });
                    }
                }
            });
        }
    }

    async fn cancel(&mut self, tab_id: String) {
        let removed = self.calls.lock().await.remove(&tab_id);
        if let Some(active) = removed {
            tracing::info!(tab = %tab_id, "cancelling request");
            let _ = active.cancel_tx.send(());
            let time_ms = active.started.elapsed().as_millis() as u64;
            let _ = self.event_tx.send(NetworkEvent::RequestCompleted {
                tab_id,
                response: ApiResponse::cancelled(time_ms),
            });
        }
    }

    fn spawn_cloud_call(&mut self, cmd: NetworkCommand) {
        let cloud = self.cloud.clone();
        let event_tx = self.event_tx.clone();
        self.tasks.spawn(async move {
            let event = match cmd {
                NetworkCommand::PushCollection(collection) => {
                    match cloud.push_collection(&collection).await {
                        Ok(access_code) => NetworkEvent::CollectionPushed {
                            id: access_code,
                            name: collection.name,
                        },
                        Err(e) => cloud_failed(CloudAction::Push, e),
                    }
                }
                NetworkCommand::FetchCollections => match cloud.list_collections().await {
                    Ok(collections) => NetworkEvent::CollectionsFetched(collections),
                    Err(e) => cloud_failed(CloudAction::FetchCollections, e),
                },
                NetworkCommand::FetchSharedCollection { access_code } => {
                    match cloud.fetch_shared_collection(&access_code).await {
                        Ok(collection) => NetworkEvent::SharedCollectionFetched(collection),
                        Err(e) => cloud_failed(CloudAction::ImportByCode, e),
                    }
                }
                NetworkCommand::Register { email, password } => {
                    match cloud.register(&email, &password).await {
                        Ok(user) => NetworkEvent::SessionStarted(user),
                        Err(e) => cloud_failed(CloudAction::Register, e),
                    }
                }
                NetworkCommand::Login { email, password } => {
                    match cloud.login(&email, &password).await {
                        Ok(user) => NetworkEvent::SessionStarted(user),
                        Err(e) => cloud_failed(CloudAction::Login, e),
                    }
                }
                NetworkCommand::Logout => {
                    // The local session ends regardless; a failed revocation
                    // is reported separately
                    if let Err(e) = cloud.logout().await {
                        let _ = event_tx.send(cloud_failed(CloudAction::Logout, e));
                    }
                    NetworkEvent::SessionEnded
                }
                NetworkCommand::CheckSession => match cloud.session().await {
                    Ok(user) => NetworkEvent::SessionChecked(user),
                    Err(e) => {
                        // Startup probe; an unreachable service is not a
                        // user-facing error
                        tracing::debug!(error = %e, "session check failed");
                        NetworkEvent::SessionChecked(None)
                    }
                },
                // Execute/Cancel/Shutdown are handled in the run loop
                _ => return,
            };
            let _ = event_tx.send(event);
        });
    }
}

fn cloud_failed(action: CloudAction, error: anyhow::Error) -> NetworkEvent {
    tracing::warn!(?action, error = %error, "cloud call failed");
    NetworkEvent::CloudFailed {
        action,
        message: error.to_string(),
    }
}
