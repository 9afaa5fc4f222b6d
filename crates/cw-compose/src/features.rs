//! Presence flags read once from the template before any wiring happens.

use cw_template::Template;

use crate::error::{ComposeError, ComposeResult};

/// Which optional blocks the chip has. Each flag gates one wiring block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipFeatures {
    pub chip_name: String,
    /// Falls back to the chip name when the template has no `chip_family`.
    pub chip_family: String,
    pub has_pmu: bool,
    pub has_rtc: bool,
    pub has_udma: bool,
    pub has_cluster: bool,
    pub nb_cluster: usize,
    pub has_fc: bool,
    pub has_fll: bool,
    pub has_ddr: bool,
    pub has_padframe: bool,
    pub has_pmu_bypass: bool,
}

impl ChipFeatures {
    pub fn from_template(tp: &Template) -> ComposeResult<Self> {
        let chip_name = tp.require_str("chip")?;
        let chip_family = tp
            .get_child_str("chip_family")?
            .unwrap_or_else(|| chip_name.clone());

        let has_cluster = tp.has("cluster");
        let nb_cluster = if has_cluster {
            let raw = tp.require_int("cluster/nb_cluster")?;
            usize::try_from(raw).map_err(|_| ComposeError::InvalidTemplate {
                path: "cluster/nb_cluster".to_string(),
                reason: format!("cluster count must not be negative, got {raw}"),
            })?
        } else {
            0
        };

        Ok(Self {
            chip_name,
            chip_family,
            has_pmu: tp.has("soc/peripherals/pmu"),
            has_rtc: tp.has("soc/peripherals/rtc"),
            has_udma: tp.has("soc/peripherals/udma"),
            has_cluster,
            nb_cluster,
            has_fc: tp.has("soc/fc"),
            has_fll: tp.has("soc/peripherals/fll") || tp.has("soc/peripherals/flls"),
            has_ddr: tp.has("ddr"),
            has_padframe: tp.has("padframe"),
            has_pmu_bypass: tp
                .get_child_bool("**/apb_soc_ctrl/has_pmu_bypass")?
                .unwrap_or(false),
        })
    }

    /// Enabled flags by name, in a fixed order.
    pub fn enabled(&self) -> Vec<&'static str> {
        [
            ("pmu", self.has_pmu),
            ("rtc", self.has_rtc),
            ("udma", self.has_udma),
            ("cluster", self.has_cluster),
            ("fc", self.has_fc),
            ("fll", self.has_fll),
            ("ddr", self.has_ddr),
            ("padframe", self.has_padframe),
            ("pmu_bypass", self.has_pmu_bypass),
        ]
        .into_iter()
        .filter_map(|(name, on)| on.then_some(name))
        .collect()
    }
}
