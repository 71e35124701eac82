mod task;

use crate::hub::Hub;
use crate::types::Task;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Notification hub shared with the WebSocket endpoint
    pub hub: Arc<Hub>,
    /// In-memory task store, in creation order
    pub tasks: Arc<RwLock<Vec<Task>>>,
}

impl AppState {
    pub fn new(hub: Arc<Hub>) -> Self {
        Self {
            hub,
            tasks: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(Hub::default()))
    }
}
