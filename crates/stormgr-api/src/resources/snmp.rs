// SNMP endpoints
//
// The agent configuration is a singleton at `snmp`; trap receivers are a
// sub-collection.

use serde_json::{Map, Value};
use tracing::debug;

use super::item_path;
use crate::client::StorageClient;
use crate::error::Error;
use crate::monitor::TaskOutcome;
use crate::request::RawResult;

const SNMP: &str = "snmp";
const TRAP_RECEIVERS: &str = "snmp/trap-receivers";

impl StorageClient {
    /// `GET snmp`
    pub async fn get_snmp(&self) -> Result<Value, Error> {
        self.get(SNMP).await
    }

    /// Safe update of the SNMP agent settings (community, contact, ...).
    pub async fn update_snmp(&self, patch: Map<String, Value>) -> Result<RawResult, Error> {
        debug!(fields = patch.len(), "updating SNMP settings");
        self.update(SNMP, patch).await
    }

    /// `GET snmp/trap-receivers`
    pub async fn list_trap_receivers(&self) -> Result<Value, Error> {
        self.get(TRAP_RECEIVERS).await
    }

    /// `POST snmp/trap-receivers`
    pub async fn add_trap_receiver(&self, receiver: Value) -> Result<TaskOutcome, Error> {
        self.create(TRAP_RECEIVERS, receiver).await
    }

    /// `DELETE snmp/trap-receivers/{id}`
    pub async fn remove_trap_receiver(&self, id: &str) -> Result<TaskOutcome, Error> {
        self.remove(&item_path(TRAP_RECEIVERS, id)).await
    }
}
