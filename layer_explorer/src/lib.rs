//! GRC layer explorer: exploded 3D view of a composite panel's four layers.
//!
//! Library root: layer model, scene, picking, host surface and SDK builder.

pub mod camera;
pub mod config;
pub mod host;
pub mod layers;
pub mod lifecycle;
pub mod picking;
pub mod scene;
mod ui;

pub mod prelude;
pub mod sdk;

pub use host::{selection_channel, ExplodeAmount, LayerSelected, SelectionListener};
pub use layers::{LayerCatalog, LayerId, LayerInfo};
pub use sdk::{explorer_plugin, ExplorerSet, LayerExplorerBuilder};
