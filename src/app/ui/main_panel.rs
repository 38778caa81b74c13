use eframe::egui;

use crate::app::app_core::TeleopApp;
use crate::app::panels::Panel;
use crate::types::PanelKind;
use crate::app::state::UiAction;

/// Rows and columns for `slots` content areas: one row up to two, then two rows.
pub fn grid_shape(slots: usize) -> (usize, usize) {
    let rows = if slots > 2 { 2 } else { 1 };
    let columns = slots.div_ceil(rows).max(1);
    (rows, columns)
}

pub fn render_main_panel(app: &mut TeleopApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let slot_count = app.state.layout.slot_count();
        let (rows, columns) = grid_shape(slot_count);
        let spacing = ui.spacing().item_spacing;
        let available = ui.available_size();
        let cell = egui::vec2(
            (available.x - spacing.x * (columns - 1) as f32) / columns as f32,
            (available.y - spacing.y * (rows - 1) as f32) / rows as f32,
        )
        .max(egui::Vec2::ZERO);

        for row in 0..rows {
            ui.horizontal(|ui| {
                for column in 0..columns {
                    let slot = row * columns + column;
                    if slot >= slot_count {
                        break;
                    }
                    ui.allocate_ui(cell, |ui| {
                        ui.set_min_size(cell);
                        egui::Frame::group(ui.style()).show(ui, |ui| {
                            ui.set_min_size((cell - egui::vec2(16.0, 16.0)).max(egui::Vec2::ZERO));
                            render_slot(app, ui, slot);
                        });
                    });
                }
            });
        }
    });
}

fn render_slot(app: &mut TeleopApp, ui: &mut egui::Ui, slot: usize) {
    let current = app.state.layout.kind_at(slot);

    ui.horizontal(|ui| {
        let selected_text = current.map(|k| k.label()).unwrap_or("Select a component");
        egui::ComboBox::from_id_salt(("slot_picker", slot))
            .selected_text(selected_text)
            .show_ui(ui, |ui| {
                if ui.selectable_label(current.is_none(), "None").clicked() {
                    app.state.pending.push(UiAction::SetPanel { slot, kind: None });
                }
                for kind in PanelKind::ALL {
                    let allowed = app.state.can_place(slot, kind);
                    let response = ui.add_enabled(
                        allowed,
                        egui::Button::new(kind.label()).selected(current == Some(kind)),
                    );
                    if response.clicked() {
                        app.state.pending.push(UiAction::SetPanel {
                            slot,
                            kind: Some(kind),
                        });
                    }
                }
            });
    });
    ui.separator();

    let Some(panel) = app.state.layout.slots_mut().get_mut(slot).and_then(Option::as_mut) else {
        ui.centered_and_justified(|ui| {
            ui.weak("Empty area");
        });
        return;
    };

    match panel {
        Panel::ControlPanel(state) => super::control_panel::render(state, ui),
        Panel::Instructions => super::instructions::render(ui),
        Panel::SpeedMonitor(state) => super::monitors::render_speed(state, ui),
        Panel::CurrentMonitor(state) => super::monitors::render_current(state, ui),
        Panel::PositionMonitor(state) => super::monitors::render_position(state, ui),
        Panel::Mapping(state) => super::mapping::render(state, ui, slot),
    }
}
