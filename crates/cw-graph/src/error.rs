//! Graph-specific error types.

use cw_core::{BindingId, CompId, PortId};

/// Graph construction and validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Two siblings share a name.
    DuplicateName { parent: String, name: String },

    /// A port was declared fresh but already exists on the component.
    DuplicatePort { comp: String, port: String },

    /// A path segment does not name a child.
    PathNotFound { path: String, segment: String },

    /// A component ID does not belong to this graph.
    InvalidCompRef { comp: CompId },

    /// A port ID does not belong to this graph.
    InvalidPortRef { port: PortId },

    /// A binding endpoint no longer resolves to a live port.
    DanglingBinding { binding: BindingId, port: PortId },

    /// Parent/child links disagree.
    InconsistentTree { comp: CompId },

    /// Operation needs a plain component but got a config wrapper.
    NotAComponent { comp: String },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::DuplicateName { parent, name } => {
                write!(f, "Component '{}' already has a child named '{}'", parent, name)
            }
            GraphError::DuplicatePort { comp, port } => {
                write!(f, "Port '{}' already declared on component '{}'", port, comp)
            }
            GraphError::PathNotFound { path, segment } => {
                write!(f, "Path '{}' not found (missing segment '{}')", path, segment)
            }
            GraphError::InvalidCompRef { comp } => {
                write!(f, "Component {} does not exist in this graph", comp)
            }
            GraphError::InvalidPortRef { port } => {
                write!(f, "Port {} does not exist in this graph", port)
            }
            GraphError::DanglingBinding { binding, port } => {
                write!(f, "Binding {} refers to non-existent port {}", binding, port)
            }
            GraphError::InconsistentTree { comp } => {
                write!(f, "Component {} has inconsistent parent/child links", comp)
            }
            GraphError::NotAComponent { comp } => {
                write!(f, "'{}' wraps a sub-graph and has no properties of its own", comp)
            }
        }
    }
}

impl std::error::Error for GraphError {}

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let err = GraphError::PathNotFound {
            path: "soc/fc".into(),
            segment: "fc".into(),
        };
        assert_eq!(err.to_string(), "Path 'soc/fc' not found (missing segment 'fc')");

        let err = GraphError::NotAComponent { comp: "chip/soc".into() };
        assert!(err.to_string().contains("chip/soc"));
    }
}
