// Share endpoints
//
// `shares` collection: list/get are plain reads, create and delete start
// tasks, and property changes go through the safe updater.

use serde_json::{Map, Value};
use tracing::debug;

use super::item_path;
use crate::client::StorageClient;
use crate::error::Error;
use crate::monitor::TaskOutcome;
use crate::request::{QueryValue, RawResult};

const SHARES: &str = "shares";

impl StorageClient {
    /// `GET shares`, optionally filtered by server-side query parameters.
    pub async fn list_shares(&self, query: Vec<(String, QueryValue)>) -> Result<Value, Error> {
        debug!("listing shares");
        self.get_with_query(SHARES, query).await
    }

    /// `GET shares/{id}`
    pub async fn get_share(&self, id: &str) -> Result<Value, Error> {
        self.get(&item_path(SHARES, id)).await
    }

    /// `POST shares`, resolved to the created share when the task names it.
    pub async fn create_share(&self, share: Value) -> Result<TaskOutcome, Error> {
        debug!("creating share");
        self.create(SHARES, share).await
    }

    /// Safe update of `shares/{id}`.
    pub async fn update_share(
        &self,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<RawResult, Error> {
        debug!(id, "updating share");
        self.update(&item_path(SHARES, id), patch).await
    }

    /// `DELETE shares/{id}`
    pub async fn delete_share(&self, id: &str) -> Result<TaskOutcome, Error> {
        debug!(id, "deleting share");
        self.remove(&item_path(SHARES, id)).await
    }
}
