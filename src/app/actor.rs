//! App actor - message loop processing UI intents and network events
//!
//! All state transitions happen here, synchronously, between suspension
//! points; the actors around it only ever see immutable snapshots. After
//! every processed message the state is persisted (fire-and-forget: a failed
//! write is reported, never rolled back) and a fresh snapshot is pushed to
//! the UI.

use tokio::sync::mpsc;

use crate::app::AppState;
use crate::messages::network::CloudAction;
use crate::messages::{Intent, NetworkCommand, NetworkEvent, Notice, UiUpdate};
use crate::models::{ApiRequest, Origin};
use crate::storage::Storage;

/// App actor that processes UI intents and network events
pub struct AppActor {
    state: AppState,
    storage: Storage,
    network_tx: mpsc::UnboundedSender<NetworkCommand>,
    update_tx: mpsc::UnboundedSender<UiUpdate>,
}

impl AppActor {
    pub fn new(
        storage: Storage,
        network_tx: mpsc::UnboundedSender<NetworkCommand>,
        update_tx: mpsc::UnboundedSender<UiUpdate>,
    ) -> Self {
        AppActor {
            state: AppState::new(),
            storage,
            network_tx,
            update_tx,
        }
    }

    /// Run the actor message loop
    pub async fn run(
        mut self,
        mut intent_rx: mpsc::UnboundedReceiver<Intent>,
        mut event_rx: mpsc::UnboundedReceiver<NetworkEvent>,
    ) {
        match self.storage.load() {
            Ok(state) => self.state = state,
            Err(e) => {
                tracing::warn!(error = %e, "could not load persisted state");
                self.notify(Notice::error("Error loading state", e.to_string()));
            }
        }
        // Resume a cloud session if the service still honors our cookie
        self.send_command(NetworkCommand::CheckSession);
        self.publish_state();

        loop {
            tokio::select! {
                Some(intent) = intent_rx.recv() => {
                    if self.handle_intent(intent) {
                        self.send_command(NetworkCommand::Shutdown);
                        break;
                    }
                    self.persist();
                    self.publish_state();
                }
                Some(event) = event_rx.recv() => {
                    self.handle_event(event);
                    self.persist();
                    self.publish_state();
                }
                else => break,
            }
        }
    }

    /// Handle a UI intent, returns true if shutdown was requested
    fn handle_intent(&mut self, intent: Intent) -> bool {
        match intent {
            // Tabs
            Intent::OpenTab { request_id } => match self.state.find_request(&request_id) {
                Some(request) => self.state.open_tab(request),
                None => self.notify(Notice::error("Error", "Request not found.")),
            },
            Intent::CloseTab { request_id } => self.state.close_tab(&request_id),
            Intent::SetActiveTab { request_id } => self.state.set_active_tab(&request_id),
            Intent::UpdateActiveTab(patch) => self.state.update_active_tab(patch),
            Intent::SaveActiveTab => {
                if let Some(collection_id) = self.state.save_active_tab() {
                    self.push_if_cloud(&collection_id);
                }
            }

            // Execution
            Intent::SendRequest { tab_id } => {
                if let Some(tab) = self.state.tab(&tab_id) {
                    let request = tab.request.clone();
                    self.state.request_start(&tab_id);
                    self.send_command(NetworkCommand::Execute { tab_id, request });
                }
            }
            Intent::CancelRequest { tab_id } => {
                self.send_command(NetworkCommand::Cancel { tab_id });
            }

            // Collections
            Intent::CreateCollection { name } => {
                self.state.create_collection(name.clone());
                self.notify(Notice::info(
                    "Collection created",
                    format!("\"{name}\" has been created."),
                ));
            }
            Intent::RenameCollection { id, name } => {
                self.state.rename_collection(&id, name);
                self.push_if_cloud(&id);
            }
            Intent::DeleteCollection { id } => {
                // The service has no delete endpoint; removal is local
                self.state.delete_collection(&id);
                self.notify(Notice::info("Collection deleted", ""));
            }
            Intent::CreateRequest {
                collection_id,
                name,
            } => {
                if self.state.collection(&collection_id).is_some() {
                    let request = ApiRequest::new(&collection_id, name);
                    self.state.add_request(&collection_id, request.clone());
                    self.state.open_tab(request);
                    self.push_if_cloud(&collection_id);
                }
            }
            Intent::DeleteRequest {
                collection_id,
                request_id,
            } => {
                self.state.remove_request(&collection_id, &request_id);
                self.notify(Notice::info("Request deleted", ""));
                self.push_if_cloud(&collection_id);
            }
            Intent::ImportCollections { raw_json } => {
                match self.state.import_collections(&raw_json) {
                    Ok(count) => self.notify(Notice::info(
                        "Import Successful",
                        format!("{count} collection(s) imported."),
                    )),
                    Err(e) => self.notify(Notice::error("Import Failed", e.to_string())),
                }
            }
            Intent::ExportCollection { id } => match self.state.export_collection(&id) {
                Ok((file_name, json)) => {
                    let _ = self.update_tx.send(UiUpdate::ExportReady { file_name, json });
                }
                Err(e) => self.notify(Notice::error("Export Failed", e.to_string())),
            },

            // Cloud session and sync
            Intent::Register { email, password } => {
                self.send_command(NetworkCommand::Register { email, password });
            }
            Intent::Login { email, password } => {
                self.send_command(NetworkCommand::Login { email, password });
            }
            Intent::Logout => self.send_command(NetworkCommand::Logout),
            Intent::SyncCollection { id } => match self.state.collection(&id) {
                Some(collection) => {
                    self.send_command(NetworkCommand::PushCollection(collection.clone()));
                }
                None => self.notify(Notice::error("Sync Failed", "Collection not found locally.")),
            },
            Intent::ImportFromCloud { access_code } => {
                self.send_command(NetworkCommand::FetchSharedCollection { access_code });
            }

            Intent::Shutdown => return true,
        }
        false
    }

    fn handle_event(&mut self, event: NetworkEvent) {
        match event {
            NetworkEvent::RequestCompleted { tab_id, response } => {
                self.state.request_complete(&tab_id, response);
            }
            NetworkEvent::CollectionsFetched(collections) => {
                self.state.merge_cloud_collections(collections);
            }
            NetworkEvent::SharedCollectionFetched(collection) => {
                let name = collection.name.clone();
                self.state.merge_imported(vec![collection]);
                self.notify(Notice::info(
                    "Import Successful",
                    format!("Collection \"{name}\" has been imported."),
                ));
            }
            NetworkEvent::CollectionPushed { id, name } => {
                // Once pushed under a session, the collection follows the
                // cloud lifecycle: future structural edits re-push it
                if let Some(user) = self.state.user.clone() {
                    if let Some(collection) = self.state.collection_mut(&id) {
                        if collection.origin.is_local() {
                            collection.origin = Origin::Cloud { owner_ref: user.id };
                        }
                    }
                }
                self.notify(Notice::info(
                    "Sync Successful",
                    format!("\"{name}\" is available under access code {id}."),
                ));
            }
            NetworkEvent::SessionStarted(user) => {
                let email = user.email.clone();
                self.state.start_session(user);
                self.notify(Notice::info("Logged in", email));
                self.send_command(NetworkCommand::FetchCollections);
            }
            NetworkEvent::SessionChecked(Some(user)) => {
                self.state.start_session(user);
                self.send_command(NetworkCommand::FetchCollections);
            }
            NetworkEvent::SessionChecked(None) => {}
            NetworkEvent::SessionEnded => {
                self.state.end_session();
                self.notify(Notice::info("Logged out", ""));
            }
            NetworkEvent::CloudFailed { action, message } => {
                let title = match action {
                    CloudAction::Register => "Registration Failed",
                    CloudAction::Login => "Login Failed",
                    CloudAction::Logout => "Logout Failed",
                    CloudAction::FetchCollections | CloudAction::Push => "Sync Failed",
                    CloudAction::ImportByCode => "Import Failed",
                };
                self.notify(Notice::error(title, message));
            }
        }
    }

    /// Cloud-owned collections re-push after every structural mutation
    fn push_if_cloud(&mut self, collection_id: &str) {
        if let Some(collection) = self.state.collection(collection_id) {
            if !collection.origin.is_local() {
                self.send_command(NetworkCommand::PushCollection(collection.clone()));
            }
        }
    }

    fn send_command(&self, command: NetworkCommand) {
        let _ = self.network_tx.send(command);
    }

    fn notify(&self, notice: Notice) {
        let _ = self.update_tx.send(UiUpdate::Notice(notice));
    }

    fn publish_state(&self) {
        let _ = self
            .update_tx
            .send(UiUpdate::State(Box::new(self.state.clone())));
    }

    /// Persistence is fire-and-forget: report the failure, keep the state
    fn persist(&self) {
        if let Err(e) = self.storage.save(&self.state) {
            tracing::warn!(error = %e, "could not persist state");
            self.notify(Notice::error(
                "Error saving state",
                "Could not write local storage. Your changes may not be persisted.",
            ));
        }
    }
}
