//! Peer composers for the "soc" and "cluster" subsystems.
//!
//! The chip composer only sees the sub-graphs they return; it addresses
//! ports on them by name and never looks inside.

use cw_core::CompId;
use cw_graph::{Component, ComponentGraph, PropertyMap};
use cw_template::Template;
use serde_json::{Map, Value};

use crate::error::{ComposeError, ComposeResult};

/// Builds a self-contained sub-graph from the shared template.
pub trait SubsystemComposer {
    /// `index` is the instance number for repeated subsystems.
    fn compose(&self, template: &Template, index: Option<usize>) -> ComposeResult<ComponentGraph>;
}

impl<F> SubsystemComposer for F
where
    F: Fn(&Template, Option<usize>) -> ComposeResult<ComponentGraph>,
{
    fn compose(&self, template: &Template, index: Option<usize>) -> ComposeResult<ComponentGraph> {
        self(template, index)
    }
}

/// Name of cluster `cid`: `cluster` for the first, `cluster_<cid>` after.
pub fn cluster_name(cid: usize) -> String {
    if cid == 0 {
        "cluster".to_string()
    } else {
        format!("cluster_{cid}")
    }
}

/// Key listing include references inside a subsystem subtree.
const INCLUDES_KEY: &str = "includes";

/// Composes the `soc` subtree into a component tree: scalar and list
/// entries become properties, nested maps become child components.
#[derive(Debug, Clone, Default)]
pub struct SocComposer;

impl SubsystemComposer for SocComposer {
    fn compose(&self, template: &Template, _index: Option<usize>) -> ComposeResult<ComponentGraph> {
        let body = match template.get("soc") {
            Some(soc) => soc.get_dict()?,
            None => Map::new(),
        };
        subtree_graph("soc", "pulp/soc", body, PropertyMap::new())
    }
}

/// Composes one cluster instance from the shared `cluster` subtree, with
/// `cluster/instances/<index>` layered on top when present.
#[derive(Debug, Clone, Default)]
pub struct ClusterComposer;

impl SubsystemComposer for ClusterComposer {
    fn compose(&self, template: &Template, index: Option<usize>) -> ComposeResult<ComponentGraph> {
        let cid = index.unwrap_or(0);
        let mut body = template.require("cluster")?.get_dict()?;
        body.remove("nb_cluster");
        if let Some(mut overrides) = instance_override(body.remove("instances"), cid)? {
            body.append(&mut overrides);
        }

        let mut extra = PropertyMap::new();
        extra.insert("cluster_id".to_string(), Value::from(cid));
        subtree_graph(&cluster_name(cid), "pulp/cluster", body, extra)
    }
}

/// The `cluster/instances/<cid>` map, if any. Anything but a map there is
/// malformed.
fn instance_override(
    instances: Option<Value>,
    cid: usize,
) -> ComposeResult<Option<Map<String, Value>>> {
    let mut all = match instances {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Object(all)) => all,
        Some(_) => {
            return Err(ComposeError::InvalidTemplate {
                path: "cluster/instances".to_string(),
                reason: "expected a map of per-cluster overrides".to_string(),
            });
        }
    };
    match all.remove(cid.to_string().as_str()) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(overrides)) => Ok(Some(overrides)),
        Some(_) => Err(ComposeError::InvalidTemplate {
            path: format!("cluster/instances/{cid}"),
            reason: "per-cluster override must be a map".to_string(),
        }),
    }
}

fn subtree_graph(
    name: &str,
    default_class: &str,
    body: Map<String, Value>,
    extra: PropertyMap,
) -> ComposeResult<ComponentGraph> {
    let mut root = Component::new(name).with_property("vp_class", default_class);
    let children = fill_component(&mut root, name, body)?;
    root = root.with_properties(extra);

    let mut graph = ComponentGraph::new(root);
    let root_id = graph.root();
    add_children(&mut graph, root_id, children)?;
    Ok(graph)
}

/// Move scalar entries of `body` onto `comp`; return nested maps.
fn fill_component(
    comp: &mut Component,
    path: &str,
    body: Map<String, Value>,
) -> ComposeResult<Vec<(String, Map<String, Value>)>> {
    let mut children = Vec::new();
    for (key, value) in body {
        match value {
            Value::Object(map) => children.push((key, map)),
            Value::Array(items) if key == INCLUDES_KEY => {
                for item in items {
                    match item {
                        Value::String(include) => comp.includes.push(include),
                        _ => {
                            return Err(ComposeError::InvalidTemplate {
                                path: format!("{path}/{INCLUDES_KEY}"),
                                reason: "includes must be strings".to_string(),
                            });
                        }
                    }
                }
            }
            Value::Null => {}
            other => {
                comp.properties.insert(key, other);
            }
        }
    }
    Ok(children)
}

fn add_children(
    graph: &mut ComponentGraph,
    parent: CompId,
    children: Vec<(String, Map<String, Value>)>,
) -> ComposeResult<()> {
    for (name, body) in children {
        let path = format!("{}/{}", graph.path_of(parent), name);
        let mut comp = Component::new(name);
        let grandchildren = fill_component(&mut comp, &path, body)?;
        let id = graph.add_component(parent, comp)?;
        add_children(graph, id, grandchildren)?;
    }
    Ok(())
}
