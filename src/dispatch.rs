//! Request handling for whatever front end drives the dock.
//!
//! [`ShortcutService`] exposes every operation as a plain method. [`Request`]
//! names the same operations as data so they can travel over any transport;
//! [`ShortcutService::serve`] is the JSON-lines one.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast;

use crate::config::{ConfigStore, Shortcut, ShortcutDraft, ShortcutPatch};
use crate::error::MmduckError;
use crate::executor::{ExecutionEngine, ExecutionResult};

/// Notifications for listeners such as the dock window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigEvent {
    /// The stored shortcut list changed
    ShortcutsUpdated,
}

/// One operation, as sent over a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Request {
    GetShortcuts,
    GetAllShortcuts,
    GetShortcut { id: String },
    AddShortcut { shortcut: ShortcutDraft },
    UpdateShortcut { id: String, updates: ShortcutPatch },
    DeleteShortcut { id: String },
    ToggleShortcut { id: String },
    ResetConfig,
    ExecuteShortcut { id: String },
}

/// The store and the engine behind one front door.
pub struct ShortcutService {
    store: ConfigStore,
    engine: ExecutionEngine,
    events: broadcast::Sender<ConfigEvent>,
}

impl ShortcutService {
    pub fn new(store: ConfigStore, engine: ExecutionEngine) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            store,
            engine,
            events,
        }
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Receive a [`ConfigEvent`] after every successful change.
    pub fn subscribe(&self) -> broadcast::Receiver<ConfigEvent> {
        self.events.subscribe()
    }

    fn changed(&self, ok: bool) -> bool {
        if ok {
            // No receivers is fine.
            let _ = self.events.send(ConfigEvent::ShortcutsUpdated);
        }
        ok
    }

    pub fn get_shortcuts(&self) -> Vec<Shortcut> {
        self.store.get_shortcuts()
    }

    pub fn get_all_shortcuts(&self) -> Vec<Shortcut> {
        self.store.get_all_shortcuts()
    }

    pub fn get_shortcut(&self, id: &str) -> Option<Shortcut> {
        self.store.get_shortcut(id)
    }

    pub fn add_shortcut(&self, draft: ShortcutDraft) -> bool {
        self.changed(self.store.add_shortcut(draft))
    }

    pub fn update_shortcut(&self, id: &str, updates: ShortcutPatch) -> bool {
        self.changed(self.store.update_shortcut(id, updates))
    }

    pub fn delete_shortcut(&self, id: &str) -> bool {
        self.changed(self.store.delete_shortcut(id))
    }

    pub fn toggle_shortcut(&self, id: &str) -> bool {
        self.changed(self.store.toggle_shortcut(id))
    }

    pub fn reset_to_default(&self) -> bool {
        self.changed(self.store.reset_to_default())
    }

    /// Look the shortcut up and run it.
    pub async fn execute_shortcut(&self, id: &str) -> ExecutionResult {
        let Some(shortcut) = self.store.get_shortcut(id) else {
            tracing::warn!(id, "Execute requested for unknown shortcut");
            return MmduckError::NotFound(id.to_string()).into();
        };

        tracing::info!(id, title = %shortcut.title, kind = %shortcut.kind, "Executing shortcut");
        self.engine.execute(&shortcut.command, shortcut.kind).await
    }

    /// Run one request and encode its answer.
    pub async fn handle(&self, request: Request) -> Value {
        match request {
            Request::GetShortcuts => json!(self.get_shortcuts()),
            Request::GetAllShortcuts => json!(self.get_all_shortcuts()),
            Request::GetShortcut { id } => json!(self.get_shortcut(&id)),
            Request::AddShortcut { shortcut } => json!(self.add_shortcut(shortcut)),
            Request::UpdateShortcut { id, updates } => json!(self.update_shortcut(&id, updates)),
            Request::DeleteShortcut { id } => json!(self.delete_shortcut(&id)),
            Request::ToggleShortcut { id } => json!(self.toggle_shortcut(&id)),
            Request::ResetConfig => json!(self.reset_to_default()),
            Request::ExecuteShortcut { id } => json!(self.execute_shortcut(&id).await),
        }
    }

    /// Answer JSON requests, one per line, until `reader` ends.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<Request>(line) {
                Ok(request) => self.handle(request).await,
                Err(e) => {
                    tracing::warn!("Rejected request: {}", e);
                    json!(ExecutionResult::failure(format!("invalid request: {}", e)))
                }
            };

            writer.write_all(response.to_string().as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
        Ok(())
    }
}
