use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

/// Responses buffered per session before senders wait on the client.
const SESSION_BUFFER: usize = 100;

/// Open MCP SSE sessions, each with its own outbound queue.
pub struct SessionManager {
    sessions: RwLock<HashMap<Uuid, mpsc::Sender<Value>>>,
}

impl SessionManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start a session and return its id with the receiver feeding the
    /// SSE stream. Sessions whose stream has gone away are pruned first.
    pub async fn open(&self) -> (Uuid, mpsc::Receiver<Value>) {
        let (tx, rx) = mpsc::channel(SESSION_BUFFER);
        let id = Uuid::new_v4();

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, sender| !sender.is_closed());
        sessions.insert(id, tx);
        (id, rx)
    }

    /// Queue a JSON-RPC message for a session.
    /// Returns false if the session is unknown or its stream has closed.
    pub async fn send(&self, id: Uuid, message: Value) -> bool {
        let sender = self.sessions.read().await.get(&id).cloned();
        let Some(sender) = sender else {
            return false;
        };

        if sender.send(message).await.is_ok() {
            true
        } else {
            self.close(id).await;
            false
        }
    }

    /// Whether a session exists and its client is still listening.
    pub async fn contains(&self, id: Uuid) -> bool {
        self.sessions
            .read()
            .await
            .get(&id)
            .is_some_and(|sender| !sender.is_closed())
    }

    /// Drop a session; its SSE stream ends once queued messages drain.
    pub async fn close(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    /// Drop every session, ending all SSE streams.
    pub async fn close_all(&self) {
        self.sessions.write().await.clear();
    }

    /// Sessions whose client is still listening.
    pub async fn len(&self) -> usize {
        self.sessions
            .read()
            .await
            .values()
            .filter(|sender| !sender.is_closed())
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
