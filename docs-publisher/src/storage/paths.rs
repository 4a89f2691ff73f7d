// Object keys are derived from the entity identity. The layout in the
// bucket is:
//
//	<namespace>
//	└── <kind>
//	    └── <name>
//	        ├── index.html
//	        ├── techdocs_metadata.json
//	        └── <any other rendered file, at its path relative to the site root>
//
// Every key written for an entity starts with its `namespace/kind/name/`
// prefix, so entities never share keys.

use std::path::{Component, Path};

use crate::domain::EntityIdentity;

pub const INDEX_FILE: &str = "index.html";
pub const METADATA_FILE: &str = "techdocs_metadata.json";

/// Returns the key of a file of the entity's site,
/// (e.g. `<namespace>/<kind>/<name>/<relative_path>`).
pub fn object_key(entity: &EntityIdentity, relative_path: &str) -> String {
    format!("{}/{}", entity.prefix(), relative_path.trim_start_matches('/'))
}

/// Returns the key of the site's entry page,
/// (e.g. `<namespace>/<kind>/<name>/index.html`).
pub fn index_key(entity: &EntityIdentity) -> String {
    object_key(entity, INDEX_FILE)
}

/// Returns the key of the generator's metadata document,
/// (e.g. `<namespace>/<kind>/<name>/techdocs_metadata.json`).
pub fn metadata_key(entity: &EntityIdentity) -> String {
    object_key(entity, METADATA_FILE)
}

/// Turns a path relative to the site root into a `/`-separated key suffix.
/// Returns `None` when the path is not a plain relative path or is not UTF-8.
pub fn relative_key(relative: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

/// Maps a request path onto an object key: the leading `/` is dropped and a
/// directory path resolves to its `index.html`.
pub fn request_key(request_path: &str) -> String {
    let key = request_path.trim_start_matches('/');
    if key.is_empty() || key.ends_with('/') {
        format!("{key}{INDEX_FILE}")
    } else {
        key.to_string()
    }
}
