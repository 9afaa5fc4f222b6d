//! Ordered wiring steps of chip assembly.
//!
//! Each step is guarded by a predicate over [`ChipFeatures`] evaluated before
//! it runs. Steps execute in the order of [`default_steps`]; later steps
//! bind ports on components that earlier steps created.

use cw_core::CompId;
use cw_graph::{Component, ComponentGraph};
use cw_template::{Template, TemplateLoader};
use tracing::{info, warn};

use crate::error::ComposeResult;
use crate::features::ChipFeatures;
use crate::options::ComposeOptions;
use crate::padframe;
use crate::subsystem::{SubsystemComposer, cluster_name};

/// Chip-level port every cluster, the RTC or the pad-frame may drive.
/// Rebinding it keeps only the latest writer.
pub const REF_CLOCK: &str = "ref_clock";

/// Everything a step can read, plus the graph under construction.
pub struct ChipContext<'a> {
    pub template: &'a Template,
    pub features: &'a ChipFeatures,
    pub options: &'a ComposeOptions,
    pub loader: &'a TemplateLoader,
    pub soc_composer: &'a dyn SubsystemComposer,
    pub cluster_composer: &'a dyn SubsystemComposer,
    pub graph: ComponentGraph,
}

impl ChipContext<'_> {
    pub fn chip(&self) -> CompId {
        self.graph.root()
    }

    /// Resolve a component created by an earlier step.
    pub fn component(&self, path: &str) -> ComposeResult<CompId> {
        Ok(self.graph.lookup(path)?)
    }

    fn clock_domain(&self, name: impl Into<String>) -> Component {
        Component::new(name)
            .with_property("vp_class", "vp/clock_domain")
            .with_property("frequency", self.options.clock_frequency)
    }
}

type Guard = fn(&ChipFeatures) -> bool;
type Apply = fn(&mut ChipContext<'_>) -> ComposeResult<()>;

/// A named, independently runnable block of wiring.
#[derive(Clone, Copy)]
pub struct WiringStep {
    pub name: &'static str,
    pub guard: Guard,
    pub apply: Apply,
}

impl WiringStep {
    pub fn enabled(&self, features: &ChipFeatures) -> bool {
        (self.guard)(features)
    }
}

impl std::fmt::Debug for WiringStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WiringStep").field("name", &self.name).finish()
    }
}

/// Chip assembly order.
pub fn default_steps() -> Vec<WiringStep> {
    vec![
        WiringStep {
            name: "chip",
            guard: |_| true,
            apply: wire_chip,
        },
        WiringStep {
            name: "clusters",
            guard: |f| f.has_cluster,
            apply: wire_clusters,
        },
        WiringStep {
            name: "rtc",
            guard: |f| f.has_rtc,
            apply: wire_rtc,
        },
        WiringStep {
            name: "pmu",
            guard: |f| f.has_pmu,
            apply: wire_pmu,
        },
        WiringStep {
            name: "padframe",
            guard: |f| f.has_padframe,
            apply: wire_padframe,
        },
        WiringStep {
            name: "clocking",
            guard: |_| true,
            apply: wire_clocking,
        },
    ]
}

/// The chip root's fixed properties.
pub fn chip_component(features: &ChipFeatures) -> Component {
    let family = features.chip_family.as_str();
    Component::new(features.chip_name.as_str())
        .with_property("pulp_chip_family", family)
        .with_property("pulp_chip_version", 0)
        .with_property("boot_from_rom", false)
        .with_property("vp_class", "pulp/chip")
        .with_property(
            "hal_files",
            vec![format!("hal/chips/{}/pulp.h", family.replace('-', "_"))],
        )
        .with_property(
            "archi_files",
            vec![
                format!("archi/chips/{family}/pulp.h"),
                format!("archi/chips/{family}/memory_map.h"),
                format!("archi/chips/{family}/properties.h"),
                format!("archi/chips/{family}/apb_soc.h"),
            ],
        )
}

/// Pad-frame, SoC clock domain and the SoC itself.
pub fn wire_chip(ctx: &mut ChipContext<'_>) -> ComposeResult<()> {
    let chip = ctx.chip();

    if ctx.features.has_padframe {
        let padframe = ctx.template.require("padframe")?;
        let include = match padframe.get_child_str("content")? {
            Some(content) => Some(content),
            None => padframe.as_str().map(str::to_string),
        };
        let mut comp = Component::new("padframe");
        if let Some(include) = include {
            comp = comp.with_include(include);
        }
        let padframe = ctx.graph.add_component(chip, comp)?;
        ctx.graph
            .reconnect(chip, REF_CLOCK, padframe, "ref_clock_pad")?;
    }

    let soc_clock = ctx.clock_domain("soc_clock");
    ctx.graph.add_component(chip, soc_clock)?;

    let soc = ctx.soc_composer.compose(ctx.template, None)?;
    ctx.graph.add_config(chip, "soc", soc)?;
    Ok(())
}

/// One sub-graph and one clock domain per cluster, wired to the SoC.
pub fn wire_clusters(ctx: &mut ChipContext<'_>) -> ComposeResult<()> {
    let chip = ctx.chip();
    let soc = ctx.component("soc")?;

    for cid in 0..ctx.features.nb_cluster {
        let name = cluster_name(cid);
        let sub = ctx.cluster_composer.compose(ctx.template, Some(cid))?;
        let cluster = ctx.graph.add_config(chip, name.as_str(), sub)?;
        let clock_comp = ctx.clock_domain(format!("{name}_clock"));
        let clock = ctx.graph.add_component(chip, clock_comp)?;

        let g = &mut ctx.graph;
        g.connect(clock, "out", cluster, "clock")?;
        if ctx.features.has_pmu_bypass {
            g.connect(soc, "cluster_reset", cluster, "reset")?;
        }
        if ctx.features.has_fll {
            g.connect(soc, &format!("{name}_fll"), clock, "clock_in")?;
        }
        g.connect(soc, &format!("{name}_input"), cluster, "input")?;
        if ctx.features.has_fc {
            g.connect(cluster, "dma_irq", soc, "dma_irq")?;
        }
        g.connect(cluster, "soc", soc, "soc_input")?;

        // A single external reference clock: the highest-index cluster wins.
        g.reconnect(chip, REF_CLOCK, cluster, REF_CLOCK)?;
    }
    Ok(())
}

pub fn wire_rtc(ctx: &mut ChipContext<'_>) -> ComposeResult<()> {
    let chip = ctx.chip();
    let soc = ctx.component("soc")?;
    let soc_clock = ctx.component("soc_clock")?;

    let config = ctx.template.require("soc/peripherals/rtc/config")?.get_dict()?;
    let comp = Component::new("rtc")
        .with_include(ctx.options.rtc_include.as_str())
        .with_properties(config);
    let rtc = ctx.graph.add_component(chip, comp)?;

    let g = &mut ctx.graph;
    g.connect(rtc, "irq", soc, "wakeup_rtc")?;
    g.connect(rtc, "event", soc, "rtc_event_in")?;
    if ctx.features.has_fc {
        g.reconnect(chip, REF_CLOCK, rtc, REF_CLOCK)?;
    }
    g.connect(soc, "rtc_input", rtc, "input")?;
    g.connect(soc_clock, "out", rtc, "clock")?;
    Ok(())
}

pub fn wire_pmu(ctx: &mut ChipContext<'_>) -> ComposeResult<()> {
    let chip = ctx.chip();
    let soc = ctx.component("soc")?;
    let soc_clock = ctx.component("soc_clock")?;

    let include = match ctx.template.get_child_str("soc/peripherals/pmu/content")? {
        Some(content) => content,
        None => {
            let version = ctx.template.require_int("soc/peripherals/pmu/version")?;
            ctx.options.pmu_include_for(version)
        }
    };
    let pmu = ctx
        .graph
        .add_component(chip, Component::new("pmu").with_include(include))?;

    let g = &mut ctx.graph;
    g.connect(soc, "pmu_input", pmu, "input")?;
    g.connect(pmu, "icu0_reset", soc, "reset")?;
    g.connect(soc_clock, "out", pmu, "clock")?;
    g.connect(soc, "wakeup_out", pmu, "wakeup")?;
    g.connect(soc, "wakeup_seq", pmu, "wakeup_seq")?;
    g.reconnect(chip, "ref_clock_engine", pmu, REF_CLOCK)?;
    Ok(())
}

/// Pad-frame clocks, then every signal group of its description.
pub fn wire_padframe(ctx: &mut ChipContext<'_>) -> ComposeResult<()> {
    let chip = ctx.chip();
    let soc = ctx.component("soc")?;
    let soc_clock = ctx.component("soc_clock")?;
    let padframe = ctx.component("padframe")?;

    ctx.graph.connect(soc_clock, "out", padframe, "clock")?;
    if ctx.features.has_fc {
        ctx.graph.connect(padframe, REF_CLOCK, soc, REF_CLOCK)?;
    }

    let description = ctx.template.require("padframe")?;
    let conf = match description.get_child_str("content")? {
        Some(content) => ctx.loader.import(&content, ctx.options.padframe_tolerant)?,
        None if description.value().is_object() => Some(description),
        None => None,
    };
    let Some(conf) = conf else {
        warn!("pad-frame description unavailable, no pad groups wired");
        return Ok(());
    };

    let groups = padframe::read_groups(&conf)?;
    info!(count = groups.len(), "wiring pad groups");
    for group in &groups {
        padframe::wire_group(&mut ctx.graph, chip, soc, padframe, group)?;
    }
    Ok(())
}

/// SoC clock, FLL feedback and DDR.
pub fn wire_clocking(ctx: &mut ChipContext<'_>) -> ComposeResult<()> {
    let chip = ctx.chip();
    let soc = ctx.component("soc")?;
    let soc_clock = ctx.component("soc_clock")?;

    let g = &mut ctx.graph;
    g.connect(soc_clock, "out", soc, "clock")?;
    if ctx.features.has_fll {
        g.connect(soc, "fll_soc_clock", soc_clock, "clock_in")?;
    }
    if ctx.features.has_ddr {
        g.connect(soc, "ddr", chip, "ddr")?;
    }
    Ok(())
}
