pub mod input;
pub mod ramp;
pub mod sender;

pub use ramp::{DirectionFlags, RampLimits, VelocityRamp};
pub use sender::{CommandSink, ControlLoop};
