//! Graph validation logic.

use std::collections::HashSet;

use crate::error::{GraphError, GraphResult};
use crate::graph::{ComponentGraph, NodeKind};

/// Validate the graph structure: tree links agree, names are unique among
/// siblings, every port sits on a live component and every binding endpoint
/// resolves to a live port. Wrapped sub-graphs are checked recursively.
pub(crate) fn validate_structure(graph: &ComponentGraph) -> GraphResult<()> {
    // Check that node IDs are contiguous and match their indices
    for (i, node) in graph.nodes.iter().enumerate() {
        if node.id.slot() != i {
            return Err(GraphError::InconsistentTree { comp: node.id });
        }
    }

    // Only the root is parentless
    for node in graph.nodes.iter().skip(1) {
        match node.parent {
            Some(parent) if graph.node(parent).is_some() => {}
            _ => return Err(GraphError::InconsistentTree { comp: node.id }),
        }
    }

    for node in &graph.nodes {
        let mut names = HashSet::new();
        for &child in &node.children {
            let child_node = graph.node_checked(child)?;
            if child_node.parent != Some(node.id) {
                return Err(GraphError::InconsistentTree { comp: child });
            }
            if !names.insert(child_node.name.as_str()) {
                return Err(GraphError::DuplicateName {
                    parent: graph.path_of(node.id),
                    name: child_node.name.clone(),
                });
            }
        }

        for &port in &node.ports {
            match graph.port(port) {
                Some(p) if p.comp == node.id => {}
                _ => return Err(GraphError::InvalidPortRef { port }),
            }
        }

        if let NodeKind::Config(sub) = &node.kind {
            validate_structure(sub)?;
        }
    }

    // Every port must reference a live component
    for port in &graph.ports {
        graph.node_checked(port.comp)?;
    }

    // No dangling binding endpoints
    for binding in &graph.bindings {
        for port in [binding.from, binding.to] {
            if graph.port(port).is_none() {
                return Err(GraphError::DanglingBinding {
                    binding: binding.id,
                    port,
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::graph::Binding;
    use cw_core::Id;

    #[test]
    fn validate_single_root() {
        let g = ComponentGraph::new(Component::new("chip"));
        assert!(validate_structure(&g).is_ok());
    }

    #[test]
    fn validate_dangling_binding() {
        let mut g = ComponentGraph::new(Component::new("chip"));
        let root = g.root();
        let p = g.reference_port(root, "ref_clock").unwrap();
        g.bindings.push(Binding {
            id: Id::from_index(0),
            from: p,
            to: Id::from_index(99), // Invalid!
        });

        let result = validate_structure(&g);
        assert_eq!(
            result,
            Err(GraphError::DanglingBinding {
                binding: Id::from_index(0),
                port: Id::from_index(99)
            })
        );
    }

    #[test]
    fn validate_broken_parent_link() {
        let mut g = ComponentGraph::new(Component::new("chip"));
        let root = g.root();
        let soc = g.add_component(root, Component::new("soc")).unwrap();
        g.nodes[soc.slot()].parent = None;
        assert_eq!(
            validate_structure(&g),
            Err(GraphError::InconsistentTree { comp: soc })
        );
    }

    #[test]
    fn validate_recurses_into_configs() {
        let mut sub = ComponentGraph::new(Component::new("cluster"));
        let sub_root = sub.root();
        let p = sub.reference_port(sub_root, "clock").unwrap();
        sub.bindings.push(Binding {
            id: Id::from_index(0),
            from: p,
            to: Id::from_index(7),
        });

        let mut g = ComponentGraph::new(Component::new("chip"));
        let root = g.root();
        g.add_config(root, "cluster", sub).unwrap();
        assert!(matches!(
            validate_structure(&g),
            Err(GraphError::DanglingBinding { .. })
        ));
    }
}
