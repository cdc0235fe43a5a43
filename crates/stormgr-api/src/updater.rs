// Safe updates
//
// The backing API replaces whole objects on PUT, so sending only the
// changed fields would erase everything omitted. Updates therefore read
// the full, unformatted resource, merge the patch into it, and write the
// complete document back.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::Error;
use crate::monitor::{MonitorOptions, TaskOutcome};
use crate::request::{RawResult, Request};
use crate::session::Session;

/// Shallow merge: patch keys overwrite or extend `current`; every other
/// key of `current` keeps its value and position.
pub fn merge_patch(mut current: Map<String, Value>, patch: Map<String, Value>) -> Map<String, Value> {
    for (key, value) in patch {
        current.insert(key, value);
    }
    current
}

impl Session {
    /// Read-modify-write `patch` into the resource at `path`.
    pub async fn update(&self, path: &str, patch: Map<String, Value>) -> Result<RawResult, Error> {
        let merged = self.merged_for_update(path, patch).await?;
        self.invoke(Request::put(path).json_value(Some(Value::Object(merged))))
            .await
    }

    /// Same as [`update`](Self::update), following the task the PUT starts.
    pub async fn update_monitored(
        &self,
        path: &str,
        patch: Map<String, Value>,
        options: &MonitorOptions,
    ) -> Result<TaskOutcome, Error> {
        let merged = self.merged_for_update(path, patch).await?;
        self.monitor(
            Request::put(path).json_value(Some(Value::Object(merged))),
            options,
        )
        .await
    }

    async fn merged_for_update(
        &self,
        path: &str,
        patch: Map<String, Value>,
    ) -> Result<Map<String, Value>, Error> {
        let current = match self.invoke(Request::get(path).raw()).await {
            Ok(RawResult::Document(Value::Object(map))) if !map.is_empty() => map,
            Ok(_) => {
                return Err(Error::UpdateTargetNotFound {
                    path: path.to_owned(),
                });
            }
            Err(e) if e.status() == Some(404) => {
                return Err(Error::UpdateTargetNotFound {
                    path: path.to_owned(),
                });
            }
            Err(e) => return Err(e),
        };

        debug!(
            path,
            fields = current.len(),
            changed = patch.len(),
            "merging update into current representation"
        );
        Ok(merge_patch(current, patch))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn map(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => Map::new(),
        }
    }

    #[test]
    fn merge_keeps_unmentioned_fields() {
        let merged = merge_patch(map(json!({"a": 1, "b": 2})), map(json!({"b": 3, "c": 4})));
        assert_eq!(Value::Object(merged), json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn merge_preserves_order_and_appends_new_keys() {
        let merged = merge_patch(
            map(json!({"z": 0, "name": "old", "a": [1]})),
            map(json!({"name": "new", "added": true})),
        );
        let keys: Vec<&str> = merged.keys().map(String::as_str).collect();
        assert_eq!(keys, ["z", "name", "a", "added"]);
    }

    #[test]
    fn merge_replaces_nested_values_wholesale() {
        let merged = merge_patch(
            map(json!({"acl": {"read": ["u1"], "write": ["u2"]}})),
            map(json!({"acl": {"read": ["u3"]}})),
        );
        assert_eq!(Value::Object(merged), json!({"acl": {"read": ["u3"]}}));
    }

    #[test]
    fn empty_patch_is_identity() {
        let current = map(json!({"a": 1, "internalId": 9}));
        assert_eq!(merge_patch(current.clone(), Map::new()), current);
    }
}
