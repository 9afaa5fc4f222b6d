//! cw-compose: assembles a wired chip graph from a template tree.
//!
//! The chip composer reads presence flags once, then runs a fixed list of
//! guarded wiring steps (chip root, clusters, RTC, PMU, pad-frame, clocking).
//! The "soc" and "cluster" subsystems are built by peer composers behind
//! [`SubsystemComposer`] and spliced in as opaque config nodes.

pub mod chip;
pub mod digest;
pub mod error;
pub mod features;
pub mod options;
pub mod padframe;
pub mod steps;
pub mod subsystem;

pub use chip::{ChipComposer, get_config};
pub use digest::{config_digest, to_json_string};
pub use error::{ComposeError, ComposeResult};
pub use features::ChipFeatures;
pub use options::ComposeOptions;
pub use padframe::PadGroup;
pub use steps::{ChipContext, REF_CLOCK, WiringStep, default_steps};
pub use subsystem::{ClusterComposer, SocComposer, SubsystemComposer, cluster_name};
