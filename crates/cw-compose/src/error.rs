//! Error types for chip composition.

use cw_graph::GraphError;
use cw_template::TemplateError;

/// Composition error. Every variant is fatal: a failed run produces no output.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    /// A template path required by an enabled feature is absent or mistyped.
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    /// Duplicate names or unresolved references while building the graph.
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Invalid template value at {path}: {reason}")]
    InvalidTemplate { path: String, reason: String },

    #[error("Failed to render configuration: {0}")]
    Render(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for composition operations.
pub type ComposeResult<T> = Result<T, ComposeError>;
