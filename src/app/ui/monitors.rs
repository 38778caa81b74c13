use eframe::egui;

use crate::app::panels::{CurrentMonitorState, PositionMonitorState, SpeedMonitorState};
use crate::types::{PoseSample, Vector3};
use crate::utils::{format_last_update, format_value};

fn vector_rows(ui: &mut egui::Ui, name: &str, v: Option<Vector3>) {
    ui.label(name);
    for value in [v.map(|v| v.x), v.map(|v| v.y), v.map(|v| v.z)] {
        ui.monospace(value.map(format_value).unwrap_or_else(|| "-".to_string()));
    }
    ui.end_row();
}

fn pose_row(ui: &mut egui::Ui, name: &str, pose: Option<PoseSample>) {
    ui.label(name);
    ui.monospace(pose.map(|p| format_value(p.x)).unwrap_or_else(|| "-".to_string()));
    ui.monospace(pose.map(|p| format_value(p.y)).unwrap_or_else(|| "-".to_string()));
    ui.end_row();
}

pub fn render_speed(state: &SpeedMonitorState, ui: &mut egui::Ui) {
    ui.heading("Speed Monitor");
    ui.add_space(5.0);
    egui::Grid::new("speed_monitor").num_columns(4).striped(true).show(ui, |ui| {
        ui.label("");
        ui.strong("x");
        ui.strong("y");
        ui.strong("z");
        ui.end_row();
        vector_rows(ui, "Linear", state.twist.map(|t| t.linear));
        vector_rows(ui, "Angular", state.twist.map(|t| t.angular));
    });
    ui.add_space(5.0);
    ui.weak(format_last_update(state.feed.updated.as_ref()));
}

pub fn render_current(state: &CurrentMonitorState, ui: &mut egui::Ui) {
    ui.heading("Current Monitor");
    ui.add_space(5.0);
    let text = state
        .current
        .map(|c| format!("{} A", format_value(c)))
        .unwrap_or_else(|| "-".to_string());
    ui.label(egui::RichText::new(text).monospace().size(24.0));
    ui.add_space(5.0);
    ui.weak(format_last_update(state.feed.updated.as_ref()));
}

pub fn render_position(state: &PositionMonitorState, ui: &mut egui::Ui) {
    ui.heading("Position Monitor");
    ui.add_space(5.0);
    egui::Grid::new("position_monitor").num_columns(3).striped(true).show(ui, |ui| {
        ui.label("");
        ui.strong("x");
        ui.strong("y");
        ui.end_row();
        pose_row(ui, "Odometry", state.odometry);
        pose_row(ui, "Fusion", state.fusion);
    });
    ui.add_space(5.0);
    ui.weak(format_last_update(state.feed.updated.as_ref()));
}
