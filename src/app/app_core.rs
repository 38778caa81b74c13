use std::time::Duration;
use eframe::{egui, Frame};
use log::{error, info};

use crate::config::ConfigManager;
use crate::http::RobotClient;
use super::handlers::{InputHandler, TelemetryHandler};
use super::state::AppState;

pub struct TeleopApp {
    // 统一的状态管理
    pub state: AppState,

    // 配置管理
    pub config: ConfigManager,
}

impl TeleopApp {
    pub fn new(client: RobotClient, config: ConfigManager) -> Self {
        let mut state = AppState::new(client, config.get_config().clone());
        state.open_initial_panels();

        info!(
            "Dashboard started with {} slots against {}",
            state.layout.slot_count(),
            state.client.base_url()
        );

        TeleopApp { state, config }
    }

    /// 将当前布局保存为启动布局
    pub fn save_layout(&mut self) {
        let (slots, panels) = self.state.layout_snapshot();
        self.config.set_startup_layout(slots, panels);

        match self.config.save() {
            Ok(path) => {
                info!("Layout saved to {}", path.display());
                self.state.status_message = format!("Layout saved to {}", path.display());
            }
            Err(e) => {
                error!("Failed to save layout: {}", e);
                self.state.status_message = format!("Failed to save layout: {}", e);
            }
        }
    }

    fn repaint_interval(&self) -> Duration {
        Duration::from_millis(self.config.get_config().window.repaint_interval_ms)
    }
}

impl eframe::App for TeleopApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        // 设置明亮模式主题
        ctx.set_visuals(egui::Visuals::light());

        // 先拉取后台数据，再渲染
        TelemetryHandler::handle_telemetry(self);

        crate::app::ui::render_status_bar(self, ctx);
        crate::app::ui::render_bottom_status_bar(self, ctx);
        crate::app::ui::render_main_panel(self, ctx);

        // 合并键盘和按钮输入
        InputHandler::handle_input(self, ctx);

        // 布局变更在帧结束后统一处理
        self.state.apply_pending();

        ctx.request_repaint_after(self.repaint_interval());
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Window closing, shutting down panels");
        self.state.shutdown();
    }
}
