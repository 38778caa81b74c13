use eframe::egui;

use crate::app::panels::MappingState;

pub fn render(state: &mut MappingState, ui: &mut egui::Ui, slot: usize) {
    ui.horizontal(|ui| {
        ui.heading("Mapping");
        ui.separator();
        ui.label(format!("{} points", state.track.len()));
        ui.weak(format!("({} rejected)", state.rejected));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Clear").clicked() {
                state.track.clear();
                state.rejected = 0;
            }
        });
    });

    if state.show_error {
        ui.colored_label(egui::Color32::from_rgb(200, 0, 0), "ERROR: Failed to fetch mapping data");
    }

    state.plot.rebind(&state.track);
    if state.plot.geometry().is_empty() && !state.show_error {
        ui.weak("Waiting for odometry...");
    }
    state.plot.ui(ui, &format!("mapping_plot_{}", slot));
}
