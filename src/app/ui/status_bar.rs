use eframe::egui;

use crate::app::app_core::TeleopApp;
use crate::app::state::{UiAction, MAX_SLOTS};

pub fn render_status_bar(app: &mut TeleopApp, ctx: &egui::Context) {
    egui::TopBottomPanel::top("status_bar")
        .min_height(40.0)
        .show(ctx, |ui| {
            ui.add_space(5.0);
            ui.horizontal(|ui| {
                ui.heading("Robot Dashboard");
                ui.separator();

                ui.label("Layout:");
                let current = app.state.layout.slot_count();
                for count in 1..=MAX_SLOTS {
                    let button = egui::Button::new(count.to_string()).selected(count == current);
                    if ui.add(button).on_hover_text(format!("{} content areas", count)).clicked() {
                        app.state.pending.push(UiAction::SetSlotCount(count));
                    }
                }

                ui.separator();
                if ui.button("💾 Save Layout").on_hover_text("Open this layout on next start").clicked() {
                    app.save_layout();
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(app.state.client.base_url());
                    ui.label("Server:");
                });
            });
            ui.add_space(5.0);
        });
}

pub fn render_bottom_status_bar(app: &mut TeleopApp, ctx: &egui::Context) {
    egui::TopBottomPanel::bottom("bottom_status_bar")
        .min_height(25.0)
        .show(ctx, |ui| {
            ui.add_space(3.0);
            ui.horizontal(|ui| {
                if !app.state.status_message.is_empty() {
                    ui.colored_label(egui::Color32::from_rgb(0, 100, 200), &app.state.status_message);
                    ui.separator();
                }

                // 当前按下的方向键
                let keyboard = app.state.keyboard;
                if keyboard.any() {
                    let mut held = Vec::new();
                    if keyboard.forward {
                        held.push("forward");
                    }
                    if keyboard.left {
                        held.push("left");
                    }
                    if keyboard.right {
                        held.push("right");
                    }
                    if keyboard.backward {
                        held.push("backward");
                    }
                    ui.label(format!("Keys: {}", held.join(" + ")));
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("{} panel(s) open", app.state.layout.panels().count()));
                });
            });
            ui.add_space(3.0);
        });
}
