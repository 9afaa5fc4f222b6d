//! Core graph data structures.

use cw_core::{BindingId, CompId, Id, PortId};
use serde_json::Value;
use tracing::debug;

use crate::component::{Component, PropertyMap};
use crate::error::{GraphError, GraphResult};
use crate::validate;

/// What a node in the ownership tree holds.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A plain component with its own properties and includes.
    Component {
        properties: PropertyMap,
        includes: Vec<String>,
    },
    /// A sub-graph produced by a peer composer, spliced in place on render.
    Config(Box<ComponentGraph>),
}

/// How a port came into existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortOrigin {
    /// Created fresh with `declare_port`.
    Declared,
    /// Materialized on first reference.
    Referenced,
}

/// A node of the ownership tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: CompId,
    pub name: String,
    pub parent: Option<CompId>,
    pub kind: NodeKind,
    pub(crate) children: Vec<CompId>,
    pub(crate) ports: Vec<PortId>,
}

impl Node {
    /// Children in insertion order.
    pub fn children(&self) -> &[CompId] {
        &self.children
    }

    /// Ports in creation order.
    pub fn ports(&self) -> &[PortId] {
        &self.ports
    }

    pub fn is_config(&self) -> bool {
        matches!(self.kind, NodeKind::Config(_))
    }

    /// Properties of a plain component (None for config wrappers).
    pub fn properties(&self) -> Option<&PropertyMap> {
        match &self.kind {
            NodeKind::Component { properties, .. } => Some(properties),
            NodeKind::Config(_) => None,
        }
    }

    pub fn includes(&self) -> &[String] {
        match &self.kind {
            NodeKind::Component { includes, .. } => includes,
            NodeKind::Config(_) => &[],
        }
    }
}

/// A named connection point on a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    pub id: PortId,
    pub comp: CompId,
    pub name: String,
    pub origin: PortOrigin,
}

/// A directed edge from a producer port to a consumer port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub id: BindingId,
    pub from: PortId,
    pub to: PortId,
}

/// The component graph: an ownership tree of components plus a general
/// binding graph between their ports.
///
/// Nodes and ports live in arenas indexed by their IDs and are never removed.
/// Bindings can be replaced through [`ComponentGraph::reconnect`].
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentGraph {
    pub(crate) nodes: Vec<Node>,
    pub(crate) ports: Vec<Port>,
    pub(crate) bindings: Vec<Binding>,
    next_binding_id: u32,
}

impl ComponentGraph {
    /// Create a graph whose root is `root`.
    pub fn new(root: Component) -> Self {
        let Component {
            name,
            properties,
            includes,
        } = root;
        Self {
            nodes: vec![Node {
                id: Id::from_index(0),
                name,
                parent: None,
                kind: NodeKind::Component {
                    properties,
                    includes,
                },
                children: Vec::new(),
                ports: Vec::new(),
            }],
            ports: Vec::new(),
            bindings: Vec::new(),
            next_binding_id: 0,
        }
    }

    pub fn root(&self) -> CompId {
        Id::from_index(0)
    }

    /// Name of the root component.
    pub fn root_name(&self) -> &str {
        &self.nodes[0].name
    }

    /// Return all nodes in creation order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return all ports in creation order.
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    /// Return all live bindings in creation order.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Get a node by ID (returns None if ID out of bounds).
    pub fn node(&self, id: CompId) -> Option<&Node> {
        self.nodes.get(id.slot())
    }

    /// Get a port by ID (returns None if ID out of bounds).
    pub fn port(&self, id: PortId) -> Option<&Port> {
        self.ports.get(id.slot())
    }

    pub(crate) fn node_checked(&self, id: CompId) -> GraphResult<&Node> {
        self.node(id).ok_or(GraphError::InvalidCompRef { comp: id })
    }

    fn port_checked(&self, id: PortId) -> GraphResult<&Port> {
        self.port(id).ok_or(GraphError::InvalidPortRef { port: id })
    }

    /// Sub-graph wrapped by a config node.
    pub fn config(&self, id: CompId) -> Option<&ComponentGraph> {
        match &self.node(id)?.kind {
            NodeKind::Config(graph) => Some(graph),
            NodeKind::Component { .. } => None,
        }
    }

    /// Insert `component` as a child of `parent`.
    pub fn add_component(&mut self, parent: CompId, component: Component) -> GraphResult<CompId> {
        let Component {
            name,
            properties,
            includes,
        } = component;
        self.insert_node(
            parent,
            name,
            NodeKind::Component {
                properties,
                includes,
            },
        )
    }

    /// Insert a sub-graph produced elsewhere as an opaque child named `name`.
    pub fn add_config(
        &mut self,
        parent: CompId,
        name: impl Into<String>,
        subgraph: ComponentGraph,
    ) -> GraphResult<CompId> {
        self.insert_node(parent, name.into(), NodeKind::Config(Box::new(subgraph)))
    }

    fn insert_node(&mut self, parent: CompId, name: String, kind: NodeKind) -> GraphResult<CompId> {
        let parent_node = self.node_checked(parent)?;
        if parent_node.is_config() {
            return Err(GraphError::NotAComponent {
                comp: self.path_of(parent),
            });
        }
        if self.find_child(parent, &name).is_some() {
            return Err(GraphError::DuplicateName {
                parent: self.path_of(parent),
                name,
            });
        }

        let id = Id::from_usize(self.nodes.len());
        debug!(parent = %self.path_of(parent), name = %name, "add component");
        self.nodes.push(Node {
            id,
            name,
            parent: Some(parent),
            kind,
            children: Vec::new(),
            ports: Vec::new(),
        });
        self.nodes[parent.slot()].children.push(id);
        Ok(id)
    }

    /// Find a direct child by name.
    pub fn find_child(&self, parent: CompId, name: &str) -> Option<CompId> {
        self.node(parent)?
            .children
            .iter()
            .copied()
            .find(|&child| self.nodes[child.slot()].name == name)
    }

    /// Resolve a `/`-delimited path starting at `from`. An empty path is `from` itself.
    pub fn get(&self, from: CompId, path: &str) -> GraphResult<CompId> {
        self.node_checked(from)?;
        let mut current = from;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = self
                .find_child(current, segment)
                .ok_or_else(|| GraphError::PathNotFound {
                    path: path.to_string(),
                    segment: segment.to_string(),
                })?;
        }
        Ok(current)
    }

    /// Resolve a path relative to the root.
    pub fn lookup(&self, path: &str) -> GraphResult<CompId> {
        self.get(self.root(), path)
    }

    /// Full slash-delimited path of a node, root name included.
    pub fn path_of(&self, id: CompId) -> String {
        let mut names = Vec::new();
        let mut cursor = self.node(id);
        while let Some(node) = cursor {
            names.push(node.name.as_str());
            cursor = node.parent.and_then(|p| self.node(p));
        }
        names.reverse();
        names.join("/")
    }

    /// Ancestors of `id`, starting with `id` itself and ending at the root.
    pub(crate) fn ancestors(&self, id: CompId) -> Vec<CompId> {
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            chain.push(current);
            cursor = self.node(current).and_then(|n| n.parent);
        }
        chain
    }

    /// Lowest common ancestor of two nodes.
    pub fn common_ancestor(&self, a: CompId, b: CompId) -> CompId {
        let chain_a = self.ancestors(a);
        self.ancestors(b)
            .into_iter()
            .find(|candidate| chain_a.contains(candidate))
            .unwrap_or_else(|| self.root())
    }

    /// Find an existing port by name.
    pub fn port_named(&self, comp: CompId, name: &str) -> Option<PortId> {
        self.node(comp)?
            .ports
            .iter()
            .copied()
            .find(|&port| self.ports[port.slot()].name == name)
    }

    /// Allocate a fresh, unbound port. Fails if the name is already taken.
    pub fn declare_port(&mut self, comp: CompId, name: &str) -> GraphResult<PortId> {
        self.node_checked(comp)?;
        if self.port_named(comp, name).is_some() {
            return Err(GraphError::DuplicatePort {
                comp: self.path_of(comp),
                port: name.to_string(),
            });
        }
        Ok(self.push_port(comp, name, PortOrigin::Declared))
    }

    /// Return the named port, materializing it unbound on first reference.
    pub fn reference_port(&mut self, comp: CompId, name: &str) -> GraphResult<PortId> {
        self.node_checked(comp)?;
        match self.port_named(comp, name) {
            Some(port) => Ok(port),
            None => Ok(self.push_port(comp, name, PortOrigin::Referenced)),
        }
    }

    fn push_port(&mut self, comp: CompId, name: &str, origin: PortOrigin) -> PortId {
        let id = Id::from_usize(self.ports.len());
        self.ports.push(Port {
            id,
            comp,
            name: name.to_string(),
            origin,
        });
        self.nodes[comp.slot()].ports.push(id);
        id
    }

    /// Bind two existing ports. Binding the same producer again fans out.
    pub fn bind_ports(&mut self, from: PortId, to: PortId) -> GraphResult<BindingId> {
        self.port_checked(from)?;
        self.port_checked(to)?;
        let id = Id::from_index(self.next_binding_id);
        self.next_binding_id += 1;
        debug!(
            from = %self.endpoint_label(from),
            to = %self.endpoint_label(to),
            "bind"
        );
        self.bindings.push(Binding { id, from, to });
        Ok(id)
    }

    /// Bind port `name` of `comp` to an existing port (the `set(name, port)` form).
    pub fn bind(&mut self, comp: CompId, name: &str, to: PortId) -> GraphResult<BindingId> {
        let from = self.reference_port(comp, name)?;
        self.bind_ports(from, to)
    }

    /// Bind `src.src_port` to `dst.dst_port` (the `A.x = B.y` form).
    pub fn connect(
        &mut self,
        src: CompId,
        src_port: &str,
        dst: CompId,
        dst_port: &str,
    ) -> GraphResult<BindingId> {
        // Resolve both endpoints before creating either port.
        self.node_checked(src)?;
        self.node_checked(dst)?;
        let from = self.reference_port(src, src_port)?;
        let to = self.reference_port(dst, dst_port)?;
        self.bind_ports(from, to)
    }

    /// Like [`connect`](Self::connect), but the latest write wins: every
    /// earlier binding out of `src.src_port` is dropped first.
    pub fn reconnect(
        &mut self,
        src: CompId,
        src_port: &str,
        dst: CompId,
        dst_port: &str,
    ) -> GraphResult<BindingId> {
        self.node_checked(src)?;
        self.node_checked(dst)?;
        let from = self.reference_port(src, src_port)?;
        let to = self.reference_port(dst, dst_port)?;
        let before = self.bindings.len();
        self.bindings.retain(|b| b.from != from);
        if self.bindings.len() != before {
            debug!(
                port = %self.endpoint_label(from),
                replaced = before - self.bindings.len(),
                "rebind"
            );
        }
        self.bind_ports(from, to)
    }

    /// Overwrite a property on a plain component. Last write wins.
    pub fn set_property(
        &mut self,
        comp: CompId,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> GraphResult<()> {
        self.node_checked(comp)?;
        let path = self.path_of(comp);
        match &mut self.nodes[comp.slot()].kind {
            NodeKind::Component { properties, .. } => {
                properties.insert(key.into(), value.into());
                Ok(())
            }
            NodeKind::Config(_) => Err(GraphError::NotAComponent { comp: path }),
        }
    }

    /// Bindings whose producer is `port`.
    pub fn bindings_from(&self, port: PortId) -> impl Iterator<Item = &Binding> {
        self.bindings.iter().filter(move |b| b.from == port)
    }

    /// Bindings whose consumer is `port`.
    pub fn bindings_to(&self, port: PortId) -> impl Iterator<Item = &Binding> {
        self.bindings.iter().filter(move |b| b.to == port)
    }

    /// Consumers of `comp.port` as `path->port` labels, in binding order.
    pub fn targets_of(&self, comp: CompId, port: &str) -> Vec<String> {
        match self.port_named(comp, port) {
            Some(id) => self
                .bindings_from(id)
                .map(|b| self.endpoint_label(b.to))
                .collect(),
            None => Vec::new(),
        }
    }

    /// `full/path->port` label of a port.
    pub fn endpoint_label(&self, port: PortId) -> String {
        match self.port(port) {
            Some(p) => format!("{}->{}", self.path_of(p.comp), p.name),
            None => format!("<invalid port {}>", port),
        }
    }

    /// Check that the tree and every binding endpoint are consistent.
    pub fn validate(&self) -> GraphResult<()> {
        validate::validate_structure(self)
    }
}
