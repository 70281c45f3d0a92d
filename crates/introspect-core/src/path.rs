//! Re-evaluable access expressions for nested values.

use std::fmt;

use serde::Serialize;

use crate::value::MapKey;

/// Expression that re-obtains a value from a known root, such as
/// `root['key'].field[0]`.
///
/// Paths are immutable; every `push_*` returns a new path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AccessPath(String);

impl AccessPath {
    /// A root expression, usually the inspected variable's name.
    pub fn new(root: impl Into<String>) -> Self {
        Self(root.into())
    }

    /// Sequence element: `path[3]`.
    pub fn push_index(&self, index: usize) -> Self {
        Self(format!("{}[{index}]", self.0))
    }

    /// Mapping entry: `path['key']` for string keys, `path[7]` for integer keys.
    pub fn push_key(&self, key: &MapKey) -> Self {
        match key {
            MapKey::Int(key) => Self(format!("{}[{key}]", self.0)),
            MapKey::Str(key) => {
                let escaped = key.replace('\\', "\\\\").replace('\'', "\\'");
                Self(format!("{}['{escaped}']", self.0))
            }
        }
    }

    /// Record field: `path.field`.
    pub fn push_field(&self, name: &str) -> Self {
        Self(format!("{}.{name}", self.0))
    }

    /// Function-call substitution used by plugins that decode a value:
    /// `function(path)`.
    pub fn wrap(&self, function: &str) -> Self {
        Self(format!("{function}({})", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccessPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccessPath {
    fn from(root: &str) -> Self {
        Self::new(root)
    }
}

impl From<String> for AccessPath {
    fn from(root: String) -> Self {
        Self(root)
    }
}
