// Volume endpoints
//
// Resizing is a property update like any other, so it goes through the
// safe updater; the PUT may start a task, which is followed.

use serde_json::{Map, Value, json};
use tracing::debug;

use super::item_path;
use crate::client::StorageClient;
use crate::error::Error;
use crate::monitor::TaskOutcome;

const VOLUMES: &str = "volumes";

impl StorageClient {
    /// `GET volumes`
    pub async fn list_volumes(&self) -> Result<Value, Error> {
        self.get(VOLUMES).await
    }

    /// `GET volumes/{id}`
    pub async fn get_volume(&self, id: &str) -> Result<Value, Error> {
        self.get(&item_path(VOLUMES, id)).await
    }

    /// `POST volumes`
    pub async fn create_volume(&self, volume: Value) -> Result<TaskOutcome, Error> {
        debug!("creating volume");
        self.create(VOLUMES, volume).await
    }

    /// Safe update of `volumes/{id}`, following any task the PUT starts.
    /// The resolved entity is looked up under `volumes/` whatever `id` is.
    pub async fn update_volume(
        &self,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<TaskOutcome, Error> {
        debug!(id, "updating volume");
        let options = self.monitor_options().clone().entity_collection(VOLUMES);
        self.session()
            .update_monitored(&item_path(VOLUMES, id), patch, &options)
            .await
    }

    /// Set a new capacity (bytes) on `volumes/{id}`.
    pub async fn resize_volume(&self, id: &str, capacity: u64) -> Result<TaskOutcome, Error> {
        let mut patch = Map::new();
        patch.insert("capacity".into(), json!(capacity));
        self.update_volume(id, patch).await
    }

    /// `DELETE volumes/{id}`
    pub async fn delete_volume(&self, id: &str) -> Result<TaskOutcome, Error> {
        debug!(id, "deleting volume");
        self.remove(&item_path(VOLUMES, id)).await
    }
}
