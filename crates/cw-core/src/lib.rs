//! cw-core: arena ids shared by the chipweave crates.

pub mod ids;

pub use ids::*;
