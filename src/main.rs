//! GRC layer explorer host. Mounts the explorer in a window and logs selections.

use bevy::prelude::*;
use layer_explorer::prelude::*;

fn main() {
    let _ = dotenvy::dotenv();
    let config = explorer_config();

    LayerExplorerBuilder::new()
        .config(config)
        .on_layer_selected(|selection: Option<LayerId>| {
            let name = LayerSelected(selection).wire_name();
            info!("host: layer selected {name:?}");
        })
        .build()
        .run();
}
