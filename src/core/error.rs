//! Engine error types.
//!
//! Nothing in the engine is fatal. Errors surface where an operation can
//! genuinely fail (catalog lookup, wire parsing); callers log and drop.
//! Invalid gameplay actions are not errors at all — they are silent no-ops.

use thiserror::Error;

use super::entity::EntityId;

/// Errors produced by the rules engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An inbound client message failed to parse.
    #[error("malformed client message: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A card name was not present in the catalog.
    #[error("unknown card `{0}`")]
    UnknownCard(String),

    /// An entity id did not resolve to a live card instance.
    #[error("no such entity: {0}")]
    MissingEntity(EntityId),
}

/// Convenience alias for engine results.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = EngineError::UnknownCard("Gloom Wyrm".into());
        assert_eq!(format!("{}", err), "unknown card `Gloom Wyrm`");

        let err = EngineError::MissingEntity(EntityId::new(9));
        assert_eq!(format!("{}", err), "no such entity: Entity(9)");
    }

    #[test]
    fn test_from_serde() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
        let err: EngineError = parse_err.into();
        assert!(matches!(err, EngineError::Malformed(_)));
    }
}
