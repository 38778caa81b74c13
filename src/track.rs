//! Odometry track: acceptance policy for pose samples and the plot geometry
//! derived from them.

use crate::types::PoseSample;

/// Why a sample was not appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// A coordinate was missing or not finite.
    Undefined,
    /// Exactly (0, 0): what odometry reports before it has a fix.
    Origin,
    /// Closer than epsilon to the last accepted sample.
    TooClose,
}

/// Append-only sequence of accepted pose samples.
#[derive(Debug, Clone)]
pub struct PointTrack {
    samples: Vec<PoseSample>,
    epsilon: f64,
    revision: u64,
}

impl PointTrack {
    pub fn new(epsilon: f64) -> Self {
        Self {
            samples: Vec::new(),
            epsilon,
            revision: 0,
        }
    }

    /// Offers raw coordinates as they came off the wire.
    pub fn offer(&mut self, x: Option<f64>, y: Option<f64>) -> Result<(), Rejection> {
        match (x, y) {
            (Some(x), Some(y)) => self.offer_sample(PoseSample::new(x, y)),
            _ => Err(Rejection::Undefined),
        }
    }

    pub fn offer_sample(&mut self, sample: PoseSample) -> Result<(), Rejection> {
        if !sample.x.is_finite() || !sample.y.is_finite() {
            return Err(Rejection::Undefined);
        }
        if sample.is_origin() {
            return Err(Rejection::Origin);
        }
        if let Some(last) = self.samples.last() {
            if sample.distance_to(last) < self.epsilon {
                return Err(Rejection::TooClose);
            }
        }
        self.samples.push(sample);
        self.revision += 1;
        Ok(())
    }

    pub fn samples(&self) -> &[PoseSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Bumped on every accepted sample and on clear.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.revision += 1;
    }
}

/// Shared x/y domain so the map keeps a 1:1 aspect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
}

/// Everything the plot draws, computed from the samples alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackGeometry {
    /// All plotted points except the newest, in order. Drawn as dots joined by a line.
    pub path: Vec<[f64; 2]>,
    /// The newest plotted point.
    pub latest: Option<[f64; 2]>,
    /// Segment from the last path point to `latest`.
    pub latest_segment: Option<[[f64; 2]; 2]>,
    pub domain: Option<Domain>,
}

impl TrackGeometry {
    pub fn build(samples: &[PoseSample], skip_first: bool) -> Self {
        let plotted = if skip_first {
            samples.get(1..).unwrap_or(&[])
        } else {
            samples
        };

        let Some((newest, rest)) = plotted.split_last() else {
            return Self::default();
        };

        let path: Vec<[f64; 2]> = rest.iter().map(|s| [s.x, s.y]).collect();
        let latest = [newest.x, newest.y];
        let latest_segment = path.last().map(|&prev| [prev, latest]);

        let (min, max) = plotted.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), s| {
            (min.min(s.x).min(s.y), max.max(s.x).max(s.y))
        });

        Self {
            path,
            latest: Some(latest),
            latest_segment,
            domain: Some(Domain { min, max }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_none()
    }
}
