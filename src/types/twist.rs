use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Twist as reported by the bridge (`/get_cmd_vel`, legacy `/twist`).
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
#[serde(default)]
pub struct TwistState {
    pub linear: Vector3,
    pub angular: Vector3,
}

/// Velocity command sent to the robot every control tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VelocityCommand {
    pub linear: f64,
    pub angular: f64,
}

/// Body of `POST /cmd_vel`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct CmdVelRequest {
    pub linear_x: f64,
    pub angular_z: f64,
}

impl VelocityCommand {
    pub const ZERO: VelocityCommand = VelocityCommand { linear: 0.0, angular: 0.0 };

    pub fn new(linear: f64, angular: f64) -> Self {
        Self { linear, angular }
    }

    pub fn is_zero(&self) -> bool {
        self.linear == 0.0 && self.angular == 0.0
    }
}

impl From<VelocityCommand> for CmdVelRequest {
    fn from(cmd: VelocityCommand) -> Self {
        Self {
            linear_x: cmd.linear,
            angular_z: cmd.angular,
        }
    }
}
