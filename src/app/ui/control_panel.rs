use eframe::egui;

use crate::app::panels::ControlPanelState;
use crate::control::DirectionFlags;
use crate::utils::format_value;

const BUTTON_SIZE: egui::Vec2 = egui::vec2(48.0, 48.0);

/// Adds a direction button. Returns true while the pointer is held on it.
fn direction_button(ui: &mut egui::Ui, label: &str, lit: bool) -> bool {
    let button = egui::Button::new(egui::RichText::new(label).size(20.0))
        .min_size(BUTTON_SIZE)
        .selected(lit);
    ui.add(button).is_pointer_button_down_on()
}

pub fn render(state: &mut ControlPanelState, ui: &mut egui::Ui) {
    ui.heading("Control Panel");
    ui.add_space(5.0);

    let lit = state.control.held();
    let mut buttons = DirectionFlags::NONE;

    ui.vertical_centered(|ui| {
        buttons.forward = direction_button(ui, "▲", lit.forward);
        ui.horizontal(|ui| {
            // center the middle row under the ▲ button
            let row_width = BUTTON_SIZE.x * 3.0 + ui.spacing().item_spacing.x * 2.0;
            ui.add_space(((ui.available_width() - row_width) / 2.0).max(0.0));
            buttons.left = direction_button(ui, "◀", lit.left);
            let stop = egui::Button::new(egui::RichText::new("■").size(20.0).color(egui::Color32::from_rgb(200, 0, 0)))
                .min_size(BUTTON_SIZE);
            if ui.add(stop).on_hover_text("Stop (space)").clicked() {
                state.stop_clicked = true;
            }
            buttons.right = direction_button(ui, "▶", lit.right);
        });
        buttons.backward = direction_button(ui, "▼", lit.backward);
    });
    state.buttons = buttons;

    ui.add_space(10.0);
    egui::Grid::new("control_panel_sent").num_columns(2).show(ui, |ui| {
        ui.label("Linear:");
        ui.monospace(format!("{} m/s", format_value(state.last_sent.linear)));
        ui.end_row();
        ui.label("Angular:");
        ui.monospace(format!("{} rad/s", format_value(state.last_sent.angular)));
        ui.end_row();
    });
}
