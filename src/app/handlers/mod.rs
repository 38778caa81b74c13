pub mod input;
pub mod telemetry;

pub use input::InputHandler;
pub use telemetry::TelemetryHandler;
