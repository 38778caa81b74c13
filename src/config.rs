use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::types::PanelKind;

/// 应用配置管理模块
/// 集中管理所有配置项，提供默认值和配置验证

/// 配置文件路径的环境变量
pub const CONFIG_PATH_ENV: &str = "TELEOP_CONFIG";
/// 覆盖 server.base_url 的环境变量
pub const SERVER_URL_ENV: &str = "TELEOP_SERVER_URL";
pub const DEFAULT_CONFIG_PATH: &str = "teleop.toml";

/// 主配置结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub server: ServerConfig,
    pub control: ControlConfig,
    pub polling: PollingConfig,
    pub track: TrackConfig,
    pub panels: PanelConfig,
}

/// 窗口配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    pub title: String,
    pub resizable: bool,
    pub vsync: bool,
    pub hardware_acceleration: bool,
    /// 最长重绘间隔，无输入时也能刷新轮询数据
    pub repaint_interval_ms: u64,
}

/// 服务端（ROS bridge）配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    pub endpoints: Endpoints,
}

/// bridge 接口路径，旧版 bridge 使用 `/twist` 和 `/pose`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub cmd_vel: String,
    pub twist: String,
    pub current: String,
    pub pose: String,
    pub pose_fusion: String,
    pub check_processes: String,
    pub check_processes_pos: String,
    pub kill_mapping_scripts: String,
    pub kill_pos_scripts: String,
    pub launch_ros_command: String,
}

/// 速度斜坡配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub tick_ms: u64,
    pub linear_step: f64,
    pub angular_step: f64,
    pub max_linear: f64,
    pub max_angular: f64,
}

/// 轮询间隔配置（毫秒）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub twist_ms: u64,
    pub current_ms: u64,
    pub position_ms: u64,
    pub mapping_ms: u64,
    pub channel_capacity: usize,
}

/// 里程计轨迹配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// 相邻采样点的最小距离
    pub epsilon: f64,
    /// 绘图时跳过第一个采样点
    pub skip_first: bool,
    pub point_radius: f32,
    pub line_width: f32,
    pub colors: TrackColors,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackColors {
    pub path: [u8; 3],
    pub latest: [u8; 3],
}

/// 组件配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// 电流显示偏移量
    pub current_offset: f64,
    /// 添加建图组件时在 bridge 上启动的命令
    pub mapping_launch_command: Option<String>,
    /// 添加定位组件时在 bridge 上启动的命令
    pub position_launch_command: Option<String>,
    /// 启动时的区域数量（1 到 4）
    pub initial_slots: usize,
    /// 启动时按顺序打开的组件
    pub initial_panels: Vec<PanelKind>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            title: "TeleopHub - Robot Teleoperation".to_string(),
            resizable: true,
            vsync: true,
            hardware_acceleration: true,
            repaint_interval_ms: 100,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:1880".to_string(),
            request_timeout_ms: 2000,
            connect_timeout_ms: 1000,
            endpoints: Endpoints::default(),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            cmd_vel: "/cmd_vel".to_string(),
            twist: "/get_cmd_vel".to_string(),
            current: "/get_current".to_string(),
            pose: "/get_pose".to_string(),
            pose_fusion: "/get_pose_fusion".to_string(),
            check_processes: "/check_processes".to_string(),
            check_processes_pos: "/check_processes_pos".to_string(),
            kill_mapping_scripts: "/kill_mapping_scripts".to_string(),
            kill_pos_scripts: "/kill_pos_scripts".to_string(),
            launch_ros_command: "/launch_ros_command".to_string(),
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            tick_ms: 50, // 20Hz
            linear_step: 0.01,
            angular_step: 0.1,
            max_linear: 0.22,
            max_angular: 2.84,
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            twist_ms: 1000,
            current_ms: 1000,
            position_ms: 100,
            mapping_ms: 100,
            channel_capacity: 64,
        }
    }
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.01,
            skip_first: true,
            point_radius: 5.0,
            line_width: 2.0,
            colors: TrackColors::default(),
        }
    }
}

impl Default for TrackColors {
    fn default() -> Self {
        Self {
            path: [0, 153, 255], // 蓝色
            latest: [255, 0, 0], // 红色
        }
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            current_offset: 80.0,
            mapping_launch_command: Some("ros2 launch walter_robot odometry_launch.py".to_string()),
            position_launch_command: None,
            initial_slots: 4,
            initial_panels: vec![
                PanelKind::ControlPanel,
                PanelKind::Instructions,
                PanelKind::SpeedMonitor,
                PanelKind::CurrentMonitor,
            ],
        }
    }
}

impl ControlConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl AppConfig {
    /// 从文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::IoError)?;

        let config: AppConfig = toml::from_str(&content).map_err(ConfigError::ParseError)?;

        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::SerializeError)?;

        std::fs::write(path, content).map_err(ConfigError::IoError)?;

        Ok(())
    }

    /// 应用环境变量覆盖
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(SERVER_URL_ENV) {
            if !url.trim().is_empty() {
                self.server.base_url = url.trim().to_string();
            }
        }
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            return Err(ConfigError::ValidationError(
                "Window dimensions must be positive".to_string(),
            ));
        }

        let url = self.server.base_url.as_str();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "Server URL must start with http:// or https://, got '{}'",
                url
            )));
        }

        let control = &self.control;
        if control.tick_ms == 0 {
            return Err(ConfigError::ValidationError("Control tick must be positive".to_string()));
        }
        if control.max_linear <= 0.0 || control.max_angular <= 0.0 {
            return Err(ConfigError::ValidationError(
                "Maximum velocities must be positive".to_string(),
            ));
        }
        if control.linear_step <= 0.0 || control.angular_step <= 0.0 {
            return Err(ConfigError::ValidationError("Ramp steps must be positive".to_string()));
        }
        if control.linear_step > control.max_linear || control.angular_step > control.max_angular {
            return Err(ConfigError::ValidationError(
                "Ramp step must not exceed its maximum velocity".to_string(),
            ));
        }

        let polling = &self.polling;
        if [polling.twist_ms, polling.current_ms, polling.position_ms, polling.mapping_ms].contains(&0) {
            return Err(ConfigError::ValidationError("Poll intervals must be positive".to_string()));
        }
        if polling.channel_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "Poll channel capacity must be positive".to_string(),
            ));
        }

        if !(self.track.epsilon > 0.0) {
            return Err(ConfigError::ValidationError("Track epsilon must be positive".to_string()));
        }

        if !(1..=4).contains(&self.panels.initial_slots) {
            return Err(ConfigError::ValidationError(
                "Initial slot count must be between 1 and 4".to_string(),
            ));
        }

        if self.panels.initial_panels.len() > self.panels.initial_slots {
            return Err(ConfigError::ValidationError(format!(
                "{} initial panels do not fit in {} slots",
                self.panels.initial_panels.len(),
                self.panels.initial_slots
            )));
        }

        Ok(())
    }
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(toml::de::Error),
    #[error("Serialize error: {0}")]
    SerializeError(toml::ser::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// 配置管理器
/// `stored` 是文件中的配置，`config` 是叠加环境变量后的运行时配置，保存时只写 `stored`
pub struct ConfigManager {
    config: AppConfig,
    stored: AppConfig,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// 创建配置管理器
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            stored: AppConfig::default(),
            config_path: None,
        }
    }

    /// 从文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = AppConfig::load_from_file(&path)?;
        Ok(Self {
            stored: config.clone(),
            config,
            config_path: Some(path.as_ref().to_path_buf()),
        })
    }

    /// 文件存在则加载，否则使用默认值；两种情况都叠加环境变量并校验
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut manager = if path.as_ref().exists() {
            Self::load_from_file(path)?
        } else {
            Self::new()
        };
        manager.config.apply_env_overrides();
        manager.config.validate()?;
        Ok(manager)
    }

    /// 获取当前（运行时）配置
    pub fn get_config(&self) -> &AppConfig {
        &self.config
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// 更新启动布局，运行时配置和文件配置同时修改
    pub fn set_startup_layout(&mut self, slots: usize, panels: Vec<PanelKind>) {
        for config in [&mut self.config, &mut self.stored] {
            config.panels.initial_slots = slots;
            config.panels.initial_panels = panels.clone();
        }
    }

    /// 保存配置，没有来源文件时写入默认路径
    pub fn save(&mut self) -> Result<PathBuf, ConfigError> {
        let path = self
            .config_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        self.save_to_file(&path)?;
        self.config_path = Some(path.clone());
        Ok(path)
    }

    /// 保存配置到指定文件，不包含环境变量覆盖
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        self.stored.save_to_file(path)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.control.tick_ms, 50);
        assert_eq!(config.polling.mapping_ms, 100);
        assert_eq!(config.polling.twist_ms, 1000);
    }

    #[test]
    fn test_step_larger_than_max_rejected() {
        let mut config = AppConfig::default();
        config.control.linear_step = 0.5;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let mut config = AppConfig::default();
        config.polling.current_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_url_rejected() {
        let mut config = AppConfig::default();
        config.server.base_url = "localhost:1880".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_slot_count_bounds() {
        let mut config = AppConfig::default();
        config.panels.initial_slots = 0;
        assert!(config.validate().is_err());
        config.panels.initial_slots = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_initial_panels_must_fit() {
        let mut config = AppConfig::default();
        config.panels.initial_slots = 2;
        assert!(config.validate().is_err());
        config.panels.initial_panels.truncate(2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_initial_panels_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("teleop.toml");
        std::fs::write(
            &path,
            "[panels]\ninitial_slots = 2\ninitial_panels = [\"Mapping\", \"ControlPanel\"]\n",
        )
        .unwrap();

        let loaded = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.panels.initial_panels, vec![PanelKind::Mapping, PanelKind::ControlPanel]);
        assert!(loaded.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("teleop.toml");

        let mut config = AppConfig::default();
        config.server.base_url = "http://robot.local:5000".to_string();
        config.server.endpoints.pose = "/pose".to_string();
        config.panels.position_launch_command = Some("ros2 launch walter_robot sensors_fusion_launch.py".to_string());
        config.save_to_file(&path).unwrap();

        let loaded = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("teleop.toml");
        std::fs::write(&path, "[control]\nmax_linear = 0.5\n").unwrap();

        let loaded = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.control.max_linear, 0.5);
        assert_eq!(loaded.control.linear_step, 0.01);
        assert_eq!(loaded.server, ServerConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("teleop.toml");
        std::fs::write(&path, "[control\n").unwrap();

        assert!(matches!(AppConfig::load_from_file(&path), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_manager_save_remembers_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("teleop.toml");
        std::fs::write(&path, "[panels]\ninitial_slots = 4\n").unwrap();

        let mut manager = ConfigManager::load_from_file(&path).unwrap();
        manager.set_startup_layout(1, vec![PanelKind::Mapping]);
        assert_eq!(manager.save().unwrap(), path);
        assert_eq!(manager.get_config().panels.initial_panels, vec![PanelKind::Mapping]);

        let reloaded = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(reloaded.panels.initial_slots, 1);
        assert_eq!(reloaded.panels.initial_panels, vec![PanelKind::Mapping]);
    }

    #[test]
    fn test_save_keeps_env_override_out_of_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("teleop.toml");
        std::fs::write(&path, "[server]\nbase_url = \"http://robot.local:1880\"\n").unwrap();

        let mut manager = ConfigManager::load_from_file(&path).unwrap();
        // what TELEOP_SERVER_URL does to the runtime copy
        manager.config.server.base_url = "http://10.0.0.5:1880".to_string();
        manager.set_startup_layout(2, vec![PanelKind::ControlPanel]);
        manager.save().unwrap();

        assert_eq!(manager.get_config().server.base_url, "http://10.0.0.5:1880");
        let reloaded = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(reloaded.server.base_url, "http://robot.local:1880");
        assert_eq!(reloaded.panels.initial_slots, 2);
        assert_eq!(reloaded.panels.initial_panels, vec![PanelKind::ControlPanel]);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert!(manager.config_path().is_none());
        assert_eq!(manager.get_config().control, ControlConfig::default());
    }
}
