mod app;
mod config;
mod control;
mod http;
mod logger;
mod plotter;
mod track;
mod types;
mod utils;

use std::env;

use dotenv::dotenv;
use eframe::egui;
use log::{error, info};

use app::TeleopApp;
use config::{ConfigManager, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
use http::RobotClient;

fn main() {
    dotenv().ok(); // 加载 .env 文件
    logger::init_logger();
    info!("Application starting");

    let config_path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    let config = match ConfigManager::load_or_default(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration from {}: {}", config_path, e);
            std::process::exit(1);
        }
    };
    match config.config_path() {
        Some(path) => info!("Configuration loaded from {}", path.display()),
        None => info!("No configuration file at {}, using defaults", config_path),
    }

    let client = match RobotClient::new(&config.get_config().server) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let window = config.get_config().window.clone();
    let options = eframe::NativeOptions {
        vsync: window.vsync,
        hardware_acceleration: if window.hardware_acceleration {
            eframe::HardwareAcceleration::Preferred // 硬件加速优先模式
        } else {
            eframe::HardwareAcceleration::Off
        },
        renderer: eframe::Renderer::Glow,
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([window.width, window.height])
            .with_resizable(window.resizable)
            .with_title(&window.title),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        &window.title,
        options,
        Box::new(|_cc| Ok(Box::new(TeleopApp::new(client, config)))),
    ) {
        error!("GUI failed: {}", e);
        std::process::exit(1);
    }

    info!("GUI closed");
}
