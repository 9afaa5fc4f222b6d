//! Pad-frame signal groups and their expansion into bindings.
//!
//! A group joins a SoC interface to the pad-frame and the pad-frame to the
//! chip's external pins. With `nb_cs` set, the pin side is repeated per
//! chip-select with one data line (`<group>_cs<N>_data`) and one control
//! line (`<group>_cs<N>`) each.

use cw_core::CompId;
use cw_graph::{ComponentGraph, GraphResult};
use cw_template::Template;

use crate::error::{ComposeError, ComposeResult};

/// Suffix of pad-facing port names on the pad-frame.
pub const PAD_SUFFIX: &str = "_pad";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PadGroup {
    pub name: String,
    /// SoC drives the group.
    pub is_master: bool,
    /// SoC is driven by the group.
    pub is_slave: bool,
    pub nb_cs: Option<usize>,
}

impl PadGroup {
    pub fn from_template(name: &str, group: &Template) -> ComposeResult<Self> {
        let nb_cs = match group.get_child_int("nb_cs")? {
            Some(raw) => Some(usize::try_from(raw).map_err(|_| ComposeError::InvalidTemplate {
                path: format!("{}/nb_cs", group.path()),
                reason: format!("chip-select count must not be negative, got {raw}"),
            })?),
            None => None,
        };
        Ok(Self {
            name: name.to_string(),
            is_master: group.get_child_bool("is_master")?.unwrap_or(false),
            is_slave: group.get_child_bool("is_slave")?.unwrap_or(false),
            nb_cs,
        })
    }

    /// Chip-facing pin names: `(data, control)` per chip-select, or the
    /// group name alone without chip-select expansion.
    pub fn pins(&self) -> Vec<String> {
        match self.nb_cs {
            None => vec![self.name.clone()],
            Some(nb_cs) => (0..nb_cs)
                .flat_map(|cs| {
                    let cs_name = format!("{}_cs{}", self.name, cs);
                    [format!("{cs_name}_data"), cs_name]
                })
                .collect(),
        }
    }
}

/// Read every group of a pad-frame description, in document order.
pub fn read_groups(conf: &Template) -> ComposeResult<Vec<PadGroup>> {
    let Some(groups) = conf.get("groups") else {
        return Ok(Vec::new());
    };
    groups
        .get_items()?
        .iter()
        .map(|(name, group)| PadGroup::from_template(name, group))
        .collect()
}

/// Wire one group between `soc`, `padframe` and the chip's own pins.
pub fn wire_group(
    graph: &mut ComponentGraph,
    chip: CompId,
    soc: CompId,
    padframe: CompId,
    group: &PadGroup,
) -> GraphResult<()> {
    let name = group.name.as_str();

    if group.is_master {
        let pad_side = graph.reference_port(padframe, name)?;
        graph.bind(soc, name, pad_side)?;
    }
    if group.is_slave {
        let soc_side = graph.reference_port(soc, name)?;
        graph.bind(padframe, name, soc_side)?;
    }

    for pin in group.pins() {
        let pad = format!("{pin}{PAD_SUFFIX}");
        if group.is_master {
            // Pins of overlapping groups share the chip port.
            let chip_pin = graph.reference_port(chip, &pin)?;
            graph.bind(padframe, &pad, chip_pin)?;
        }
        if group.is_slave {
            let pad_pin = graph.reference_port(padframe, &pad)?;
            graph.bind(chip, &pin, pad_pin)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cw_graph::Component;
    use serde_json::json;

    fn frame() -> (ComponentGraph, CompId, CompId, CompId) {
        let mut g = ComponentGraph::new(Component::new("chip"));
        let chip = g.root();
        let soc = g.add_component(chip, Component::new("soc")).unwrap();
        let pad = g.add_component(chip, Component::new("padframe")).unwrap();
        (g, chip, soc, pad)
    }

    #[test]
    fn pins_without_chip_select() {
        let group = PadGroup {
            name: "uart0".into(),
            is_master: true,
            is_slave: false,
            nb_cs: None,
        };
        assert_eq!(group.pins(), ["uart0"]);
    }

    #[test]
    fn pins_with_chip_select() {
        let group = PadGroup {
            name: "spim0".into(),
            is_master: true,
            is_slave: false,
            nb_cs: Some(2),
        };
        assert_eq!(
            group.pins(),
            ["spim0_cs0_data", "spim0_cs0", "spim0_cs1_data", "spim0_cs1"]
        );
    }

    #[test]
    fn master_group_directions() {
        let (mut g, chip, soc, pad) = frame();
        let group = PadGroup {
            name: "uart0".into(),
            is_master: true,
            is_slave: false,
            nb_cs: None,
        };
        wire_group(&mut g, chip, soc, pad, &group).unwrap();
        assert_eq!(g.targets_of(soc, "uart0"), ["chip/padframe->uart0"]);
        assert_eq!(g.targets_of(pad, "uart0_pad"), ["chip->uart0"]);
        assert_eq!(g.bindings().len(), 2);
    }

    #[test]
    fn bidirectional_group_shares_ports() {
        let (mut g, chip, soc, pad) = frame();
        let group = PadGroup {
            name: "i2s0".into(),
            is_master: true,
            is_slave: true,
            nb_cs: None,
        };
        wire_group(&mut g, chip, soc, pad, &group).unwrap();
        assert_eq!(g.targets_of(pad, "i2s0"), ["chip/soc->i2s0"]);
        assert_eq!(g.targets_of(chip, "i2s0"), ["chip/padframe->i2s0_pad"]);
        assert_eq!(g.bindings().len(), 4);
        assert_eq!(g.node(chip).unwrap().ports().len(), 1);
    }

    #[test]
    fn overlapping_pin_names_share_chip_port() {
        let (mut g, chip, soc, pad) = frame();
        let expanded = PadGroup {
            name: "a".into(),
            is_master: true,
            is_slave: false,
            nb_cs: Some(1),
        };
        let plain = PadGroup {
            name: "a_cs0".into(),
            is_master: true,
            is_slave: false,
            nb_cs: None,
        };
        wire_group(&mut g, chip, soc, pad, &expanded).unwrap();
        wire_group(&mut g, chip, soc, pad, &plain).unwrap();

        let pins: Vec<&str> = g
            .node(chip)
            .unwrap()
            .ports()
            .iter()
            .map(|&p| g.port(p).unwrap().name.as_str())
            .collect();
        assert_eq!(pins, ["a_cs0_data", "a_cs0"]);
        assert_eq!(g.targets_of(pad, "a_cs0_pad"), ["chip->a_cs0", "chip->a_cs0"]);
        assert!(g.validate().is_ok());
    }

    #[test]
    fn read_groups_in_order() {
        let conf = Template::new(json!({
            "groups": {
                "spim0": { "is_master": true, "nb_cs": 2 },
                "i2c0": { "is_master": true, "is_slave": true }
            }
        }));
        let groups = read_groups(&conf).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].nb_cs, Some(2));
        assert!(!groups[0].is_slave);
        assert_eq!(groups[1].name, "i2c0");
        assert!(groups[1].is_slave);
    }

    #[test]
    fn negative_chip_select_count() {
        let conf = Template::new(json!({ "groups": { "spim0": { "nb_cs": -2 } } }));
        assert!(matches!(
            read_groups(&conf),
            Err(ComposeError::InvalidTemplate { .. })
        ));
    }

    #[test]
    fn no_groups_section() {
        assert!(read_groups(&Template::new(json!({}))).unwrap().is_empty());
    }
}
