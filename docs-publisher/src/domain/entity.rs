use std::fmt;

use crate::error::AppError;

/// Identifies a catalog entity whose documentation lives under
/// `<namespace>/<kind>/<name>` in the object store.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EntityIdentity {
    namespace: String,
    kind: String,
    name: String,
}

impl EntityIdentity {
    /// Builds an identity, rejecting empty parts and parts containing `/`.
    /// A slash inside a part would let two different identities share a prefix.
    pub fn new(
        namespace: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<EntityIdentity, AppError> {
        let identity = EntityIdentity {
            namespace: namespace.into(),
            kind: kind.into(),
            name: name.into(),
        };
        for (field, value) in [
            ("namespace", &identity.namespace),
            ("kind", &identity.kind),
            ("name", &identity.name),
        ] {
            if value.is_empty() {
                return Err(AppError::InvalidEntity(format!("{field} must not be empty")));
            }
            if value.contains('/') {
                return Err(AppError::InvalidEntity(format!(
                    "{field} `{value}` must not contain `/`"
                )));
            }
        }
        Ok(identity)
    }

    /// Storage key prefix, e.g. `default/Component/foo`.
    pub fn prefix(&self) -> String {
        format!("{}/{}/{}", self.namespace, self.kind, self.name)
    }
}

impl fmt::Display for EntityIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.kind, self.namespace, self.name)
    }
}
