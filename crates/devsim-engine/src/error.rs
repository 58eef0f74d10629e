use devsim_core::ModelError;
use thiserror::Error;

use crate::optimize::Dimension;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("invalid {dimension} range: {reason}")]
    InvalidRange {
        dimension: Dimension,
        reason: String,
    },
}
