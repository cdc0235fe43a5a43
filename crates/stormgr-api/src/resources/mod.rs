// Resource wrappers
//
// Thin typed conveniences over `StorageClient`'s call primitive, one file
// per resource kind. They only choose paths and the right primitive:
// reads go straight through the gateway, creates and deletes are
// monitored, and property changes use the safe updater.

pub mod shares;
pub mod snmp;
pub mod users;
pub mod volumes;

/// `{collection}/{id}` with stray separators trimmed from the id.
pub(crate) fn item_path(collection: &str, id: &str) -> String {
    format!("{collection}/{}", id.trim_matches('/'))
}
