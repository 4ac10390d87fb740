//! Runtime + client handle shared by every page and dialog

use std::future::Future;
use std::sync::Arc;

use mdp_client::MdpClient;
use mdp_console::{spawn_pending, PendingSlot};

#[derive(Clone)]
pub struct Backend {
    runtime: tokio::runtime::Handle,
    client: Arc<dyn MdpClient>,
}

impl Backend {
    pub fn new(runtime: tokio::runtime::Handle, client: Arc<dyn MdpClient>) -> Self {
        Self { runtime, client }
    }

    /// Run a client call in the background; its result lands in the
    /// returned slot.
    pub fn spawn<T, F, Fut>(&self, call: F) -> PendingSlot<T>
    where
        T: Send + 'static,
        F: FnOnce(Arc<dyn MdpClient>) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        spawn_pending(&self.runtime, call(self.client.clone()))
    }
}
