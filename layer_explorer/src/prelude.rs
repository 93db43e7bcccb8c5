//! Minimal prelude for SDK consumers.

pub use crate::config::{explorer_config, ExplorerConfig};
pub use crate::host::{
    selection_channel, ExplodeAmount, LayerSelected, MountTarget, SelectionListener,
};
pub use crate::layers::{CatalogError, LayerCatalog, LayerId, LayerInfo};
pub use crate::lifecycle::UnmountExplorer;
pub use crate::sdk::{explorer_plugin, LayerExplorerBuilder};
