use chrono::{DateTime, Local};
use crossbeam_channel::{bounded, Receiver};
use log::{debug, info, trace};

use crate::config::AppConfig;
use crate::control::{ControlLoop, DirectionFlags, RampLimits};
use crate::http::{spawn_poller, PollerHandle, RobotClient};
use crate::plotter::TrackPlot;
use crate::track::{PointTrack, Rejection};
use crate::types::{
    MappingUpdate, PanelKind, PoseSample, PositionUpdate, Telemetry, TwistState, VelocityCommand,
};

#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    #[error("failed to start {0} worker: {1}")]
    Spawn(&'static str, std::io::Error),
}

/// A poller plus the channel it feeds.
#[derive(Debug)]
pub struct Feed {
    poller: PollerHandle,
    receiver: Receiver<Telemetry>,
    pub updated: Option<DateTime<Local>>,
}

impl Feed {
    fn start<F>(
        name: &'static str,
        interval_ms: u64,
        capacity: usize,
        fetch: F,
    ) -> Result<Self, PanelError>
    where
        F: FnMut() -> Result<Telemetry, crate::http::ClientError> + Send + 'static,
    {
        let (sender, receiver) = bounded(capacity);
        let poller = spawn_poller(name, std::time::Duration::from_millis(interval_ms), sender, fetch)
            .map_err(|e| PanelError::Spawn(name, e))?;
        Ok(Self {
            poller,
            receiver,
            updated: None,
        })
    }

    /// Drains everything delivered since the last frame.
    fn drain(&mut self) -> Vec<Telemetry> {
        let items: Vec<Telemetry> = self.receiver.try_iter().collect();
        if !items.is_empty() {
            self.updated = Some(Local::now());
        }
        items
    }

    fn stop(self, wait: bool) {
        if wait {
            self.poller.join();
        } else {
            self.poller.stop();
        }
    }
}

#[derive(Debug)]
pub struct ControlPanelState {
    pub control: ControlLoop,
    /// Directions held through the on-screen buttons this frame.
    pub buttons: DirectionFlags,
    pub stop_clicked: bool,
    pub last_sent: VelocityCommand,
}

#[derive(Debug)]
pub struct SpeedMonitorState {
    pub feed: Feed,
    pub twist: Option<TwistState>,
}

#[derive(Debug)]
pub struct CurrentMonitorState {
    pub feed: Feed,
    pub offset: f64,
    /// Reading with the offset applied.
    pub current: Option<f64>,
}

#[derive(Debug)]
pub struct PositionMonitorState {
    pub feed: Feed,
    pub odometry: Option<PoseSample>,
    pub fusion: Option<PoseSample>,
}

#[derive(Debug)]
pub struct MappingState {
    pub feed: Feed,
    pub track: PointTrack,
    pub plot: TrackPlot,
    pub show_error: bool,
    pub rejected: usize,
}

/// An open component together with the workers it owns.
#[derive(Debug)]
pub enum Panel {
    ControlPanel(ControlPanelState),
    Instructions,
    SpeedMonitor(SpeedMonitorState),
    CurrentMonitor(CurrentMonitorState),
    PositionMonitor(PositionMonitorState),
    Mapping(MappingState),
}

fn log_failure<T, E: std::fmt::Display>(what: &str, result: Result<T, E>) -> Option<T> {
    result.map_err(|e| debug!("{} failed: {}", what, e)).ok()
}

impl Panel {
    /// Opens a panel: starts its workers and triggers its bridge-side launch, if any.
    pub fn open(kind: PanelKind, client: &RobotClient, config: &AppConfig) -> Result<Self, PanelError> {
        let capacity = config.polling.channel_capacity;
        let panel = match kind {
            PanelKind::ControlPanel => {
                let control = ControlLoop::spawn(
                    client.clone(),
                    RampLimits::from(&config.control),
                    config.control.tick(),
                )
                .map_err(|e| PanelError::Spawn("control", e))?;
                Panel::ControlPanel(ControlPanelState {
                    control,
                    buttons: DirectionFlags::NONE,
                    stop_clicked: false,
                    last_sent: VelocityCommand::ZERO,
                })
            }
            PanelKind::Instructions => Panel::Instructions,
            PanelKind::SpeedMonitor => {
                let client = client.clone();
                let feed = Feed::start("twist", config.polling.twist_ms, capacity, move || {
                    client.twist().map(Telemetry::Twist)
                })?;
                Panel::SpeedMonitor(SpeedMonitorState { feed, twist: None })
            }
            PanelKind::CurrentMonitor => {
                let client = client.clone();
                let feed = Feed::start("current", config.polling.current_ms, capacity, move || {
                    client.current().map(Telemetry::Current)
                })?;
                Panel::CurrentMonitor(CurrentMonitorState {
                    feed,
                    offset: config.panels.current_offset,
                    current: None,
                })
            }
            PanelKind::PositionMonitor => {
                let client = client.clone();
                let feed = Feed::start("position", config.polling.position_ms, capacity, move || {
                    let status = client.check_processes_pos()?;
                    if !status.odometry_running() {
                        return Ok(Telemetry::Position(PositionUpdate::default()));
                    }
                    let odometry = log_failure("get_pose", client.pose()).and_then(|r| r.sample());
                    let fusion = log_failure("get_pose_fusion", client.pose_fusion()).and_then(|r| r.sample());
                    Ok(Telemetry::Position(PositionUpdate { odometry, fusion }))
                })?;
                Panel::PositionMonitor(PositionMonitorState {
                    feed,
                    odometry: None,
                    fusion: None,
                })
            }
            PanelKind::Mapping => {
                let client = client.clone();
                let feed = Feed::start("mapping", config.polling.mapping_ms, capacity, move || {
                    let update = match client.check_processes() {
                        Ok(status) if status.odometry_running() => match client.pose() {
                            Ok(reply) => MappingUpdate::Pose(reply.sample()),
                            Err(e) => {
                                debug!("Mapping pose fetch failed: {}", e);
                                MappingUpdate::Unavailable
                            }
                        },
                        Ok(_) => MappingUpdate::Unavailable,
                        Err(e) => {
                            debug!("Mapping process check failed: {}", e);
                            MappingUpdate::Unavailable
                        }
                    };
                    Ok(Telemetry::Mapping(update))
                })?;
                Panel::Mapping(MappingState {
                    feed,
                    track: PointTrack::new(config.track.epsilon),
                    plot: TrackPlot::new(&config.track),
                    show_error: false,
                    rejected: 0,
                })
            }
        };

        let launch = match kind {
            PanelKind::Mapping => config.panels.mapping_launch_command.clone(),
            PanelKind::PositionMonitor => config.panels.position_launch_command.clone(),
            _ => None,
        };
        if let Some(command) = launch {
            info!("Launching on bridge: {}", command);
            client.fire_and_forget("launch_ros_command", move |c| c.launch_ros_command(&command));
        }

        info!("Opened {}", kind.label());
        Ok(panel)
    }

    pub fn kind(&self) -> PanelKind {
        match self {
            Panel::ControlPanel(_) => PanelKind::ControlPanel,
            Panel::Instructions => PanelKind::Instructions,
            Panel::SpeedMonitor(_) => PanelKind::SpeedMonitor,
            Panel::CurrentMonitor(_) => PanelKind::CurrentMonitor,
            Panel::PositionMonitor(_) => PanelKind::PositionMonitor,
            Panel::Mapping(_) => PanelKind::Mapping,
        }
    }

    /// Applies whatever the workers delivered since the last frame.
    pub fn poll(&mut self) {
        match self {
            Panel::ControlPanel(state) => state.last_sent = state.control.last_sent(),
            Panel::Instructions => {}
            Panel::SpeedMonitor(state) => {
                for item in state.feed.drain() {
                    if let Telemetry::Twist(twist) = item {
                        state.twist = Some(twist);
                    }
                }
            }
            Panel::CurrentMonitor(state) => {
                for item in state.feed.drain() {
                    if let Telemetry::Current(reading) = item {
                        state.current = Some(reading.current + state.offset);
                    }
                }
            }
            Panel::PositionMonitor(state) => {
                for item in state.feed.drain() {
                    if let Telemetry::Position(update) = item {
                        // a skipped poll keeps the previous values
                        if update.odometry.is_some() {
                            state.odometry = update.odometry;
                        }
                        if update.fusion.is_some() {
                            state.fusion = update.fusion;
                        }
                    }
                }
            }
            Panel::Mapping(state) => {
                for item in state.feed.drain() {
                    if let Telemetry::Mapping(update) = item {
                        state.apply(update);
                    }
                }
                state.plot.rebind(&state.track);
            }
        }
    }

    /// Tears the panel down. Pollers are signalled (and joined when `wait`),
    /// the control loop is closed, and bridge-side scripts are killed.
    pub fn close(self, client: &RobotClient, wait: bool) {
        let kind = self.kind();
        match self {
            Panel::ControlPanel(state) => {
                if wait {
                    state.control.shutdown();
                }
            }
            Panel::Instructions => {}
            Panel::SpeedMonitor(state) => state.feed.stop(wait),
            Panel::CurrentMonitor(state) => state.feed.stop(wait),
            Panel::PositionMonitor(state) => {
                state.feed.stop(wait);
                if wait {
                    log_failure("kill_pos_scripts", client.kill_pos_scripts());
                } else {
                    client.fire_and_forget("kill_pos_scripts", |c| c.kill_pos_scripts());
                }
            }
            Panel::Mapping(state) => {
                state.feed.stop(wait);
                if wait {
                    log_failure("kill_mapping_scripts", client.kill_mapping_scripts());
                } else {
                    client.fire_and_forget("kill_mapping_scripts", |c| c.kill_mapping_scripts());
                }
            }
        }
        info!("Closed {}", kind.label());
    }
}

impl MappingState {
    fn apply(&mut self, update: MappingUpdate) {
        match update {
            MappingUpdate::Unavailable => self.show_error = true,
            MappingUpdate::Pose(sample) => {
                self.show_error = false;
                let result = match sample {
                    Some(sample) => self.track.offer_sample(sample),
                    None => Err(Rejection::Undefined),
                };
                if let Err(reason) = result {
                    trace!("Pose sample rejected: {:?}", reason);
                    self.rejected += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;

    fn offline_client() -> RobotClient {
        // nothing listens on port 9 of loopback
        let config = ServerConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            request_timeout_ms: 200,
            connect_timeout_ms: 100,
            ..ServerConfig::default()
        };
        RobotClient::new(&config).unwrap()
    }

    fn mapping_state() -> MappingState {
        let config = AppConfig::default();
        let (_, receiver) = bounded(1);
        let (sender, _) = bounded(1);
        let poller = spawn_poller("test", std::time::Duration::from_secs(60), sender, || {
            Ok(Telemetry::Mapping(MappingUpdate::Unavailable))
        })
        .unwrap();
        MappingState {
            feed: Feed {
                poller,
                receiver,
                updated: None,
            },
            track: PointTrack::new(config.track.epsilon),
            plot: TrackPlot::new(&config.track),
            show_error: false,
            rejected: 0,
        }
    }

    #[test]
    fn test_mapping_error_banner_toggles() {
        let mut state = mapping_state();
        state.apply(MappingUpdate::Unavailable);
        assert!(state.show_error);
        state.apply(MappingUpdate::Pose(Some(PoseSample::new(1.0, 2.0))));
        assert!(!state.show_error);
        assert_eq!(state.track.len(), 1);
    }

    #[test]
    fn test_mapping_counts_rejections() {
        let mut state = mapping_state();
        state.apply(MappingUpdate::Pose(None));
        state.apply(MappingUpdate::Pose(Some(PoseSample::new(0.0, 0.0))));
        state.apply(MappingUpdate::Pose(Some(PoseSample::new(1.0, 1.0))));
        state.apply(MappingUpdate::Pose(Some(PoseSample::new(1.001, 1.0))));
        assert_eq!(state.track.len(), 1);
        assert_eq!(state.rejected, 3);
    }

    #[test]
    fn test_current_monitor_applies_offset() {
        let client = offline_client();
        let mut config = AppConfig::default();
        config.panels.current_offset = 80.0;
        let mut panel = Panel::open(PanelKind::CurrentMonitor, &client, &config).unwrap();
        if let Panel::CurrentMonitor(state) = &mut panel {
            let (sender, receiver) = bounded(4);
            state.feed.receiver = receiver;
            sender
                .send(Telemetry::Current(crate::types::CurrentReading { current: -79.25 }))
                .unwrap();
        }
        panel.poll();
        match &panel {
            Panel::CurrentMonitor(state) => {
                assert_eq!(state.current, Some(0.75));
                assert!(state.feed.updated.is_some());
            }
            other => panic!("unexpected panel {:?}", other.kind()),
        }
        panel.close(&client, true);
    }

    #[test]
    fn test_open_and_close_instructions() {
        let client = offline_client();
        let panel = Panel::open(PanelKind::Instructions, &client, &AppConfig::default()).unwrap();
        assert_eq!(panel.kind(), PanelKind::Instructions);
        panel.close(&client, true);
    }
}
