pub mod forge_plugin;
pub mod render_plugin;
pub mod ui_plugin;
