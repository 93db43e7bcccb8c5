mod panel;

pub use panel::info_panel_plugin;
