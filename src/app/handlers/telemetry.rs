use crate::app::app_core::TeleopApp;

pub struct TelemetryHandler;

impl TelemetryHandler {
    /// Pulls worker results into every open panel.
    pub fn handle_telemetry(app: &mut TeleopApp) {
        for panel in app.state.layout.panels_mut() {
            panel.poll();
        }
    }
}
