//! Composer tunables, overridable from the template's `composer` section.

use cw_template::Template;
use serde::Deserialize;

use crate::error::ComposeResult;

/// Key under which a template may override [`ComposeOptions`].
pub const OPTIONS_KEY: &str = "composer";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ComposeOptions {
    /// Frequency of every clock domain the chip composer creates, in Hz.
    pub clock_frequency: u64,
    /// Fixed description of the real-time clock block.
    pub rtc_include: String,
    /// PMU description used when no explicit content is given.
    /// `{version}` is replaced by `soc/peripherals/pmu/version`.
    pub pmu_include: String,
    /// Skip pad groups instead of failing when the pad-frame file is missing.
    pub padframe_tolerant: bool,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            clock_frequency: 50_000_000,
            rtc_include: "ips/vendors/dolphin/rtc.json".to_string(),
            pmu_include: "ips/pmu/pmu_v{version}.json".to_string(),
            padframe_tolerant: true,
        }
    }
}

impl ComposeOptions {
    /// Defaults, overlaid with the template's `composer` section if present.
    pub fn from_template(tp: &Template) -> ComposeResult<Self> {
        match tp.get(OPTIONS_KEY) {
            Some(section) => Ok(section.parse()?),
            None => Ok(Self::default()),
        }
    }

    pub fn pmu_include_for(&self, version: i64) -> String {
        self.pmu_include.replace("{version}", &version.to_string())
    }
}
