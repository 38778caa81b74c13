pub mod control_panel;
pub mod instructions;
pub mod main_panel;
pub mod mapping;
pub mod monitors;
pub mod status_bar;

pub use main_panel::render_main_panel;
pub use status_bar::{render_bottom_status_bar, render_status_bar};
