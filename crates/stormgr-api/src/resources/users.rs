// Local user endpoints

use serde_json::{Map, Value};
use tracing::debug;

use super::item_path;
use crate::client::StorageClient;
use crate::error::Error;
use crate::monitor::TaskOutcome;
use crate::request::RawResult;

const USERS: &str = "users";

impl StorageClient {
    /// `GET users`
    pub async fn list_users(&self) -> Result<Value, Error> {
        self.get(USERS).await
    }

    /// `GET users/{id}`
    pub async fn get_user(&self, id: &str) -> Result<Value, Error> {
        self.get(&item_path(USERS, id)).await
    }

    /// `POST users`
    pub async fn create_user(&self, user: Value) -> Result<TaskOutcome, Error> {
        debug!("creating user");
        self.create(USERS, user).await
    }

    /// Safe update of `users/{id}`; fields not in `patch` are kept.
    pub async fn update_user(
        &self,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<RawResult, Error> {
        debug!(id, "updating user");
        self.update(&item_path(USERS, id), patch).await
    }

    /// `DELETE users/{id}`
    pub async fn delete_user(&self, id: &str) -> Result<TaskOutcome, Error> {
        debug!(id, "deleting user");
        self.remove(&item_path(USERS, id)).await
    }
}
