//! JSON Schema for the configuration file.

use schemars::schema_for;

use crate::config::WallspanConfig;

/// `$id` of the generated schema.
pub const SCHEMA_ID: &str = "urn:wallspan:config";

/// Generates the configuration schema as a JSON value.
#[must_use]
pub fn generate_schema() -> serde_json::Value {
    let schema = schema_for!(WallspanConfig);
    let mut value = serde_json::to_value(schema).unwrap_or_default();
    if let Some(object) = value.as_object_mut() {
        object.insert("$id".to_string(), serde_json::Value::String(SCHEMA_ID.to_string()));
    }
    value
}

/// Returns the configuration schema as pretty-printed JSON.
#[must_use]
pub fn print_schema() -> String {
    serde_json::to_string_pretty(&generate_schema()).unwrap_or_else(|_| "{}".to_string())
}
