//! cw-graph: component graph model for chipweave.
//!
//! Provides:
//! - Detached component descriptions (`Component`)
//! - The ownership tree plus port binding graph (`ComponentGraph`)
//! - Structural validation
//! - Rendering to the simulator's nested JSON layout
//!
//! # Example
//!
//! ```
//! use cw_graph::{Component, ComponentGraph};
//!
//! let mut graph = ComponentGraph::new(Component::new("chip"));
//! let root = graph.root();
//! let clock = graph
//!     .add_component(root, Component::new("soc_clock").with_property("frequency", 50_000_000))
//!     .unwrap();
//! let pmu = graph.add_component(root, Component::new("pmu")).unwrap();
//! graph.connect(clock, "out", pmu, "clock").unwrap();
//!
//! let config = graph.render();
//! assert_eq!(config["chip"]["vp_bindings"][0][0], "soc_clock->out");
//! ```

pub mod component;
pub mod error;
pub mod graph;
pub mod render;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use component::{Component, PropertyMap};
pub use error::{GraphError, GraphResult};
pub use graph::{Binding, ComponentGraph, Node, NodeKind, Port, PortOrigin};
