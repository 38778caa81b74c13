pub mod panel;
pub mod pose;
pub mod telemetry;
pub mod twist;

pub use panel::PanelKind;
pub use pose::{PoseReply, PoseSample};
pub use telemetry::{
    CurrentReading, MappingUpdate, PositionUpdate, ProcessStatus, ServerReply, Telemetry,
};
pub use twist::{CmdVelRequest, TwistState, Vector3, VelocityCommand};
