use eframe::egui;
use log::info;

use crate::app::app_core::TeleopApp;
use crate::app::panels::Panel;
use crate::control::input::read_keyboard;
use crate::control::DirectionFlags;

pub struct InputHandler;

impl InputHandler {
    /// Merges keyboard and on-screen buttons and hands them to the control loop.
    pub fn handle_input(app: &mut TeleopApp, ctx: &egui::Context) {
        let (keyboard, stop_pressed) = read_keyboard(ctx);
        app.state.keyboard = keyboard;

        for panel in app.state.layout.panels_mut() {
            if let Panel::ControlPanel(state) = panel {
                if stop_pressed || state.stop_clicked {
                    info!("Stop requested");
                    state.control.stop_robot();
                    state.stop_clicked = false;
                    state.buttons = DirectionFlags::NONE;
                    continue;
                }
                state.control.set_directions(keyboard.union(state.buttons));
            }
        }
    }
}
