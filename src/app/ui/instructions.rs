use eframe::egui;

use crate::control::input::KEY_BINDINGS;

pub fn render(ui: &mut egui::Ui) {
    ui.heading("Instructions");
    ui.add_space(5.0);
    egui::Grid::new(ui.next_auto_id()).num_columns(2).striped(true).show(ui, |ui| {
        for (keys, action) in KEY_BINDINGS {
            ui.colored_label(egui::Color32::from_rgb(0, 150, 0), keys);
            ui.label(action);
            ui.end_row();
        }
    });
    ui.add_space(5.0);
    ui.weak("Hold a direction to accelerate, release it to slow down.");
}
