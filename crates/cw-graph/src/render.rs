//! Rendering of a component graph into the simulator's JSON layout.
//!
//! Every component renders as an object holding, in order:
//! its properties, `includes`, `vp_comps` (child names), `vp_ports`,
//! `vp_bindings` and finally one entry per child. A binding is rendered on
//! the lowest common ancestor of its two endpoints, each endpoint written as
//! `<relative/path>-><port>` or `self-><port>` when it sits on that ancestor.
//! Config wrappers are spliced in place: the wrapped sub-graph's root body
//! takes the wrapper's slot, with the wrapper's own ports merged in.

use std::collections::BTreeMap;

use cw_core::{CompId, PortId};
use serde_json::{Map, Value};

use crate::graph::{Binding, ComponentGraph, NodeKind};

const INCLUDES: &str = "includes";
const VP_COMPS: &str = "vp_comps";
const VP_PORTS: &str = "vp_ports";
const VP_BINDINGS: &str = "vp_bindings";

impl ComponentGraph {
    /// Render the whole tree as `{ <root name>: <root body> }`.
    #[doc(alias = "get_js_config")]
    pub fn render(&self) -> Value {
        let mut out = Map::new();
        out.insert(self.root_name().to_string(), self.render_body());
        Value::Object(out)
    }

    /// Render the root component's body without the enclosing name key.
    pub fn render_body(&self) -> Value {
        let scoped = self.bindings_by_scope();
        Value::Object(self.render_node(self.root(), &scoped))
    }

    fn bindings_by_scope(&self) -> BTreeMap<CompId, Vec<&Binding>> {
        let mut scoped: BTreeMap<CompId, Vec<&Binding>> = BTreeMap::new();
        for binding in &self.bindings {
            let (Some(from), Some(to)) = (self.port(binding.from), self.port(binding.to)) else {
                continue;
            };
            let scope = self.common_ancestor(from.comp, to.comp);
            scoped.entry(scope).or_default().push(binding);
        }
        scoped
    }

    fn render_node(
        &self,
        id: CompId,
        scoped: &BTreeMap<CompId, Vec<&Binding>>,
    ) -> Map<String, Value> {
        let node = &self.nodes[id.slot()];

        let mut obj = match &node.kind {
            NodeKind::Component {
                properties,
                includes,
            } => {
                let mut obj = properties.clone();
                if !includes.is_empty() {
                    obj.insert(
                        INCLUDES.to_string(),
                        Value::from(includes.iter().map(String::as_str).collect::<Vec<_>>()),
                    );
                }
                obj
            }
            NodeKind::Config(sub) => match sub.render_body() {
                Value::Object(body) => body,
                other => {
                    let mut obj = Map::new();
                    obj.insert("config".to_string(), other);
                    obj
                }
            },
        };

        let children: Vec<Value> = node
            .children
            .iter()
            .map(|c| Value::from(self.nodes[c.slot()].name.as_str()))
            .collect();
        merge_list(&mut obj, VP_COMPS, children);

        let ports: Vec<Value> = node
            .ports
            .iter()
            .map(|p| Value::from(self.ports[p.slot()].name.as_str()))
            .collect();
        merge_list(&mut obj, VP_PORTS, ports);

        if let Some(bindings) = scoped.get(&id) {
            let rendered: Vec<Value> = bindings
                .iter()
                .map(|b| {
                    Value::from(vec![
                        self.relative_label(id, b.from),
                        self.relative_label(id, b.to),
                    ])
                })
                .collect();
            merge_list(&mut obj, VP_BINDINGS, rendered);
        }

        for &child in &node.children {
            let name = self.nodes[child.slot()].name.clone();
            obj.insert(name, Value::Object(self.render_node(child, scoped)));
        }

        obj
    }

    /// Label of `port` as seen from `scope`.
    fn relative_label(&self, scope: CompId, port: PortId) -> String {
        let port = &self.ports[port.slot()];
        if port.comp == scope {
            return format!("self->{}", port.name);
        }
        let mut names: Vec<&str> = self
            .ancestors(port.comp)
            .into_iter()
            .take_while(|&c| c != scope)
            .map(|c| self.nodes[c.slot()].name.as_str())
            .collect();
        names.reverse();
        format!("{}->{}", names.join("/"), port.name)
    }
}

/// Append `items` to the array at `key`, skipping entries already present.
fn merge_list(obj: &mut Map<String, Value>, key: &str, items: Vec<Value>) {
    if items.is_empty() {
        return;
    }
    let entry = obj
        .entry(key.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    match entry {
        Value::Array(existing) => {
            for item in items {
                if !existing.contains(&item) {
                    existing.push(item);
                }
            }
        }
        other => *other = Value::Array(items),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use serde_json::json;

    #[test]
    fn render_nests_children_in_order() {
        let mut g = ComponentGraph::new(Component::new("chip").with_property("vp_class", "pulp/chip"));
        let root = g.root();
        g.add_component(root, Component::new("soc_clock").with_property("frequency", 50_000_000))
            .unwrap();
        g.add_component(root, Component::new("pmu").with_include("ips/pmu/pmu_v3.json"))
            .unwrap();

        let rendered = g.render();
        assert_eq!(
            rendered,
            json!({
                "chip": {
                    "vp_class": "pulp/chip",
                    "vp_comps": ["soc_clock", "pmu"],
                    "soc_clock": { "frequency": 50_000_000 },
                    "pmu": { "includes": ["ips/pmu/pmu_v3.json"] }
                }
            })
        );
        let keys: Vec<&String> = rendered["chip"].as_object().unwrap().keys().collect();
        assert_eq!(keys, ["vp_class", "vp_comps", "soc_clock", "pmu"]);
    }

    #[test]
    fn binding_renders_at_common_ancestor() {
        let mut g = ComponentGraph::new(Component::new("chip"));
        let root = g.root();
        let clk = g.add_component(root, Component::new("soc_clock")).unwrap();
        let pad = g.add_component(root, Component::new("padframe")).unwrap();
        g.connect(clk, "out", pad, "clock").unwrap();
        g.connect(root, "ref_clock", pad, "ref_clock_pad").unwrap();

        let body = g.render_body();
        assert_eq!(
            body["vp_bindings"],
            json!([
                ["soc_clock->out", "padframe->clock"],
                ["self->ref_clock", "padframe->ref_clock_pad"]
            ])
        );
        assert_eq!(body["vp_ports"], json!(["ref_clock"]));
        assert_eq!(body["padframe"]["vp_ports"], json!(["clock", "ref_clock_pad"]));
        assert!(body["padframe"].get("vp_bindings").is_none());
    }

    #[test]
    fn deep_endpoints_use_relative_paths() {
        let mut g = ComponentGraph::new(Component::new("chip"));
        let root = g.root();
        let soc = g.add_component(root, Component::new("soc")).unwrap();
        let fc = g.add_component(soc, Component::new("fc")).unwrap();
        let pad = g.add_component(root, Component::new("padframe")).unwrap();
        g.connect(fc, "irq", pad, "irq").unwrap();

        let body = g.render_body();
        assert_eq!(body["vp_bindings"], json!([["soc/fc->irq", "padframe->irq"]]));
    }

    #[test]
    fn config_is_spliced_in_place() {
        let mut sub = ComponentGraph::new(Component::new("soc").with_property("vp_class", "pulp/soc"));
        let sub_root = sub.root();
        sub.reference_port(sub_root, "clock").unwrap();

        let mut g = ComponentGraph::new(Component::new("chip"));
        let root = g.root();
        let soc = g.add_config(root, "soc", sub).unwrap();
        g.connect(soc, "dma_irq", root, "irq").unwrap();

        let body = g.render_body();
        assert_eq!(
            body["soc"],
            json!({ "vp_class": "pulp/soc", "vp_ports": ["clock", "dma_irq"] })
        );
    }

    #[test]
    fn render_is_deterministic() {
        let mut g = ComponentGraph::new(Component::new("chip"));
        let root = g.root();
        for name in ["z", "a", "m"] {
            let c = g.add_component(root, Component::new(name)).unwrap();
            g.connect(root, "clk", c, "clock").unwrap();
        }
        let first = serde_json::to_string(&g.render()).unwrap();
        let second = serde_json::to_string(&g.render()).unwrap();
        assert_eq!(first, second);
        assert!(first.find("\"z\"").unwrap() < first.find("\"a\"").unwrap());
    }
}
