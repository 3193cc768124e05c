//! Storage backend implementations.

pub mod filesystem;

/// Content type recorded for an object key, by extension.
pub fn content_type_for_key(key: &str) -> &'static str {
    if key.ends_with(".prov") {
        "application/pgp-signature"
    } else if key.ends_with(".tgz") {
        "application/x-tar"
    } else if key.ends_with(".yaml") || key.ends_with(".yml") {
        "application/x-yaml"
    } else {
        "application/octet-stream"
    }
}
