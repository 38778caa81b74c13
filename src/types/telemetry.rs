use serde::Deserialize;

use super::{PoseSample, TwistState};

/// Reply of `GET /get_current`.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq)]
#[serde(default)]
pub struct CurrentReading {
    pub current: f64,
}

/// Reply of `/check_processes` and `/check_processes_pos`.
/// The bridge answers `{"status":"error",...}` when `pgrep` fails, which
/// deserializes to all-false.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq)]
#[serde(default)]
pub struct ProcessStatus {
    pub rpm_processor: bool,
    pub odometry: bool,
    pub fusion: Option<bool>,
}

impl ProcessStatus {
    /// Odometry is only published while both scripts are alive.
    pub fn odometry_running(&self) -> bool {
        self.rpm_processor && self.odometry
    }
}

/// Reply of the POST endpoints.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ServerReply {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl ServerReply {
    /// The bridge reports failures in-band with HTTP 200.
    pub fn is_error(&self) -> bool {
        self.status == "error"
    }
}

/// Result of one position poll: odometry and fused pose, each optional.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PositionUpdate {
    pub odometry: Option<PoseSample>,
    pub fusion: Option<PoseSample>,
}

/// Result of one mapping poll.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MappingUpdate {
    /// Odometry scripts are down or the liveness check failed.
    Unavailable,
    /// Scripts are up; carries the sample if the pose had one.
    Pose(Option<PoseSample>),
}

/// Everything the pollers deliver to the panels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Telemetry {
    Twist(TwistState),
    Current(CurrentReading),
    Position(PositionUpdate),
    Mapping(MappingUpdate),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_status_full() {
        let status: ProcessStatus =
            serde_json::from_str(r#"{"rpm_processor":true,"odometry":true,"fusion":false}"#).unwrap();
        assert!(status.odometry_running());
        assert_eq!(status.fusion, Some(false));
    }

    #[test]
    fn test_process_status_error_reply_is_not_running() {
        let status: ProcessStatus =
            serde_json::from_str(r#"{"status":"error","message":"pgrep missing"}"#).unwrap();
        assert!(!status.odometry_running());
    }

    #[test]
    fn test_process_status_needs_both() {
        let status: ProcessStatus = serde_json::from_str(r#"{"rpm_processor":true,"odometry":false}"#).unwrap();
        assert!(!status.odometry_running());
    }

    #[test]
    fn test_server_reply() {
        let ok: ServerReply = serde_json::from_str(r#"{"status":"success"}"#).unwrap();
        assert!(!ok.is_error());
        let err: ServerReply = serde_json::from_str(r#"{"status":"error","message":"boom"}"#).unwrap();
        assert!(err.is_error());
        assert_eq!(err.message.as_deref(), Some("boom"));
    }

    #[test]
    fn test_current_reading() {
        let reading: CurrentReading = serde_json::from_str(r#"{"current":-79.5}"#).unwrap();
        assert_eq!(reading.current, -79.5);
    }
}
