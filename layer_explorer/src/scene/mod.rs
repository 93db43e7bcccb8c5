pub mod appearance;
pub mod labels;
pub mod setup;
pub mod surface;

pub use appearance::{appearance, appearance_system, Appearance};
pub use labels::{leader_line_plugin, project_labels_system, LabelPlacements, LayerLabel};
pub use setup::{
    explode_system, mount_explorer_system, resize_system, ExplorerSurface, LayerGroup,
    LayerMaterials, LayerMesh, SceneSettings, SharedSurface, BACKGROUND_HEX,
};
pub use surface::SurfaceGeometry;
