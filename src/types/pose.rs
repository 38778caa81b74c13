use serde::Deserialize;

/// A single odometry sample in map coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoseSample {
    pub x: f64,
    pub y: f64,
}

impl PoseSample {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &PoseSample) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_origin(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

/// Reply of the pose endpoints. The bridge may omit `position` entirely
/// before the first odometry message arrives.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct PoseReply {
    pub position: Option<Position>,
}

impl PoseReply {
    /// Returns the sample when both coordinates are present.
    pub fn sample(&self) -> Option<PoseSample> {
        let position = self.position?;
        Some(PoseSample::new(position.x?, position.y?))
    }
}
