//! Detached component descriptions, inserted into a graph with
//! [`ComponentGraph::add_component`](crate::ComponentGraph::add_component).

use serde_json::{Map, Value};

/// Ordered property bag. Insertion order is kept so rendering is reproducible.
pub type PropertyMap = Map<String, Value>;

/// A hardware block description before it is placed in a graph.
///
/// Holds scalar properties and include references only; ports and children
/// live in the graph once the component is inserted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Component {
    pub name: String,
    pub properties: PropertyMap,
    pub includes: Vec<String>,
}

impl Component {
    /// Create a component with no properties and no includes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: PropertyMap::new(),
            includes: Vec::new(),
        }
    }

    /// Create a component from all three parts at once.
    pub fn create(
        name: impl Into<String>,
        properties: PropertyMap,
        includes: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            name: name.into(),
            properties,
            includes: includes.into_iter().collect(),
        }
    }

    /// Set a property. A later write to the same key replaces the earlier one.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Merge a whole property map, later keys replacing earlier ones.
    pub fn with_properties(mut self, properties: PropertyMap) -> Self {
        for (key, value) in properties {
            self.properties.insert(key, value);
        }
        self
    }

    /// Append an include reference.
    pub fn with_include(mut self, include: impl Into<String>) -> Self {
        self.includes.push(include.into());
        self
    }

    /// Look up a property.
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_keeps_insertion_order() {
        let comp = Component::new("chip")
            .with_property("vp_class", "pulp/chip")
            .with_property("boot_from_rom", false)
            .with_property("pulp_chip_version", 0);

        let keys: Vec<&str> = comp.properties.keys().map(String::as_str).collect();
        assert_eq!(keys, ["vp_class", "boot_from_rom", "pulp_chip_version"]);
    }

    #[test]
    fn later_property_write_wins() {
        let comp = Component::new("clk")
            .with_property("frequency", 50_000_000)
            .with_property("frequency", 10_000_000);
        assert_eq!(comp.property("frequency"), Some(&json!(10_000_000)));
        assert_eq!(comp.properties.len(), 1);
    }

    #[test]
    fn create_collects_includes() {
        let mut props = PropertyMap::new();
        props.insert("version".into(), json!(3));
        let comp = Component::create("pmu", props, vec!["ips/pmu/pmu_v3.json".to_string()]);
        assert_eq!(comp.includes, ["ips/pmu/pmu_v3.json"]);
        assert_eq!(comp.property("version"), Some(&json!(3)));
    }
}
