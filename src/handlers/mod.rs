pub mod projects;
pub mod users;

use serde_json::Value;

/// Body field lookup for partial updates: JSON null counts as absent, so a
/// patch of `{"name": null}` leaves the stored name alone.
pub(crate) fn field<'a>(body: &'a Value, key: &str) -> Option<&'a Value> {
    match body.get(key) {
        Some(Value::Null) | None => None,
        other => other,
    }
}
