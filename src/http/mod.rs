pub mod client;
pub mod poller;

pub use client::{ClientError, RobotClient};
pub use poller::{spawn_poller, PollerHandle};
