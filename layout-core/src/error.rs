//! Error types for layout operations.
//!
//! Conversion and state transitions are total and never fail. Errors only
//! surface when parsing persisted layouts or validating geometry on request.

use thiserror::Error;

use crate::node::NodeId;

/// Result type for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Errors that can occur in layout operations.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Layout serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Viewport name did not match any known viewport.
    #[error("Unknown viewport: {0}")]
    UnknownViewport(String),

    /// Persisted layouts were neither versioned nor legacy.
    #[error("Unrecognized layout format: {0}")]
    UnrecognizedFormat(String),

    /// A layout item violates the grid geometry invariants.
    #[error("Invalid geometry for node {node_id}: {reason}")]
    Geometry {
        /// The offending node.
        node_id: NodeId,
        /// What was wrong with it.
        reason: String,
    },
}
