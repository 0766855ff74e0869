//! Error types.
//!
//! Two families only. [`LoadError`] aborts loading a scene or asset and is
//! reported to the caller. [`FieldError`] rejects a text edit without touching
//! the target. Lookup misses are not errors anywhere in the crate; they are
//! `Option`s.

use thiserror::Error;

use crate::ecs::ComponentKind;
use crate::ecs::EntityId;

/// A scene, prefab, or animation asset could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document version {found} is newer than the supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("prefab '{prefab}' has no entities")]
    EmptyPrefab { prefab: String },

    #[error("prefab '{prefab}' root {root} is not among its entities")]
    MissingRoot { prefab: String, root: EntityId },

    #[error("entity id {id} appears more than once")]
    DuplicateEntity { id: EntityId },

    #[error("invalid asset '{asset}': {reason}")]
    InvalidAsset { asset: String, reason: String },
}

/// A text edit to a component field was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("{kind} has no field named '{field}'")]
    UnknownField { kind: String, field: String },

    #[error("cannot parse '{value}' for field '{field}': expected {expected}")]
    Format {
        field: String,
        expected: &'static str,
        value: String,
    },

    #[error("entity has no {0} component")]
    MissingComponent(ComponentKind),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let err = LoadError::UnsupportedVersion {
            found: 7,
            supported: 1,
        };
        assert_eq!(
            err.to_string(),
            "document version 7 is newer than the supported version 1"
        );

        let err = FieldError::Format {
            field: "Speed".into(),
            expected: "a number",
            value: "fast".into(),
        };
        assert!(err.to_string().contains("'fast'"));
    }
}
