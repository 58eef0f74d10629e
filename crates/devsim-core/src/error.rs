use thiserror::Error;

/// Structural problems that stop a scenario from being evaluated at all.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("{field} must be a finite number (got {value})")]
    NonFinite { field: String, value: f64 },

    #[error("{field} must not be negative (got {value})")]
    Negative { field: String, value: f64 },

    #[error("{kind} id must not be empty")]
    EmptyId { kind: &'static str },

    #[error("duplicate lot id: {0}")]
    DuplicateLot(String),

    #[error("duplicate tract id: {0}")]
    DuplicateTract(String),

    #[error("tract {0} has no area: set area_m2, or row width and length for a road")]
    UnresolvedTractArea(String),

    #[error("unknown lot id: {0}")]
    UnknownLot(String),

    #[error("unknown tract id: {0}")]
    UnknownTract(String),
}
