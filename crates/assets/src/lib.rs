//! Assets domain module: equipment and facilities, counted per condition.

pub mod asset;

pub use asset::{Asset, AssetState, AssetStatus, duplicate_statuses};
