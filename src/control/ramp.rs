use crate::config::ControlConfig;
use crate::types::VelocityCommand;

/// Directions currently held by the operator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirectionFlags {
    pub forward: bool,
    pub left: bool,
    pub right: bool,
    pub backward: bool,
}

impl DirectionFlags {
    pub const NONE: DirectionFlags = DirectionFlags {
        forward: false,
        left: false,
        right: false,
        backward: false,
    };

    pub fn any(&self) -> bool {
        self.forward || self.left || self.right || self.backward
    }

    pub fn union(self, other: DirectionFlags) -> DirectionFlags {
        DirectionFlags {
            forward: self.forward || other.forward,
            left: self.left || other.left,
            right: self.right || other.right,
            backward: self.backward || other.backward,
        }
    }
}

/// Step sizes and bounds for the ramp.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RampLimits {
    pub linear_step: f64,
    pub angular_step: f64,
    pub max_linear: f64,
    pub max_angular: f64,
}

impl Default for RampLimits {
    fn default() -> Self {
        RampLimits::from(&ControlConfig::default())
    }
}

impl From<&ControlConfig> for RampLimits {
    fn from(config: &ControlConfig) -> Self {
        Self {
            linear_step: config.linear_step,
            angular_step: config.angular_step,
            max_linear: config.max_linear,
            max_angular: config.max_angular,
        }
    }
}

impl RampLimits {
    /// Target command for the held directions. Opposite directions cancel.
    pub fn target(&self, flags: DirectionFlags) -> VelocityCommand {
        let linear = match (flags.forward, flags.backward) {
            (true, false) => self.max_linear,
            (false, true) => -self.max_linear,
            _ => 0.0,
        };
        let angular = match (flags.left, flags.right) {
            (true, false) => self.max_angular,
            (false, true) => -self.max_angular,
            _ => 0.0,
        };
        VelocityCommand::new(linear, angular)
    }
}

/// Moves `current` one `step` toward `target`, snapping once within a step.
fn approach(current: f64, target: f64, step: f64) -> f64 {
    let delta = target - current;
    if delta.abs() > step {
        current + step.copysign(delta)
    } else {
        target
    }
}

/// First-order acceleration limiter between operator input and the robot.
#[derive(Clone, Debug)]
pub struct VelocityRamp {
    limits: RampLimits,
    current: VelocityCommand,
}

impl VelocityRamp {
    pub fn new(limits: RampLimits) -> Self {
        Self {
            limits,
            current: VelocityCommand::ZERO,
        }
    }

    pub fn current(&self) -> VelocityCommand {
        self.current
    }

    /// Advances one tick toward the target for `flags` and returns the new command.
    pub fn step(&mut self, flags: DirectionFlags) -> VelocityCommand {
        let target = self.limits.target(flags);
        self.current = VelocityCommand::new(
            approach(self.current.linear, target.linear, self.limits.linear_step),
            approach(self.current.angular, target.angular, self.limits.angular_step),
        );
        self.current
    }

    /// Emergency stop: drops straight to zero.
    pub fn reset(&mut self) {
        self.current = VelocityCommand::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const FORWARD: DirectionFlags = DirectionFlags { forward: true, ..DirectionFlags::NONE };
    const LEFT: DirectionFlags = DirectionFlags { left: true, ..DirectionFlags::NONE };

    fn all_flags() -> Vec<DirectionFlags> {
        (0u8..16)
            .map(|bits| DirectionFlags {
                forward: bits & 1 != 0,
                left: bits & 2 != 0,
                right: bits & 4 != 0,
                backward: bits & 8 != 0,
            })
            .collect()
    }

    #[test]
    fn test_first_tick_moves_one_step() {
        let mut ramp = VelocityRamp::new(RampLimits::default());
        let cmd = ramp.step(FORWARD.union(LEFT));
        assert_abs_diff_eq!(cmd.linear, 0.01, epsilon = 1e-12);
        assert_abs_diff_eq!(cmd.angular, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_reaches_max_exactly() {
        let mut ramp = VelocityRamp::new(RampLimits::default());
        // 0.22 / 0.01 = 22 ticks, plus slack for float accumulation
        for _ in 0..25 {
            ramp.step(FORWARD);
        }
        assert_eq!(ramp.current().linear, 0.22);
        assert_eq!(ramp.current().angular, 0.0);
    }

    #[test]
    fn test_release_decays_to_exact_zero() {
        let mut ramp = VelocityRamp::new(RampLimits::default());
        for _ in 0..40 {
            ramp.step(LEFT);
        }
        assert_eq!(ramp.current().angular, 2.84);
        for _ in 0..40 {
            ramp.step(DirectionFlags::NONE);
        }
        assert_eq!(ramp.current(), VelocityCommand::ZERO);
    }

    #[test]
    fn test_opposite_directions_cancel() {
        let limits = RampLimits::default();
        let flags = DirectionFlags {
            forward: true,
            backward: true,
            left: true,
            right: true,
        };
        assert_eq!(limits.target(flags), VelocityCommand::ZERO);
    }

    #[test]
    fn test_reset_zeroes_immediately() {
        let mut ramp = VelocityRamp::new(RampLimits::default());
        for _ in 0..10 {
            ramp.step(FORWARD);
        }
        ramp.reset();
        assert_eq!(ramp.current(), VelocityCommand::ZERO);
    }

    #[test]
    fn test_never_exceeds_max_and_converges() {
        let limits = RampLimits::default();
        let flags = all_flags();
        // deterministic pseudo-random walk over flag combinations
        let mut seed: u32 = 0x2545_f491;
        let mut ramp = VelocityRamp::new(limits);
        for _ in 0..5000 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            let held = flags[(seed % 16) as usize];
            let hold_ticks = 1 + (seed >> 8) % 40;
            let before = ramp.current();
            for _ in 0..hold_ticks {
                let prev = ramp.current();
                let cmd = ramp.step(held);
                assert!(cmd.linear.abs() <= limits.max_linear + 1e-12);
                assert!(cmd.angular.abs() <= limits.max_angular + 1e-12);
                assert!((cmd.linear - prev.linear).abs() <= limits.linear_step + 1e-12);
                assert!((cmd.angular - prev.angular).abs() <= limits.angular_step + 1e-12);
            }
            let target = limits.target(held);
            let needed_linear = ((target.linear - before.linear).abs() / limits.linear_step).ceil() as u32;
            let needed_angular = ((target.angular - before.angular).abs() / limits.angular_step).ceil() as u32;
            // one tick of slack for float accumulation near the snap threshold
            if hold_ticks > needed_linear.max(needed_angular) + 1 {
                assert_eq!(ramp.current(), target);
            }
        }
    }

    #[test]
    fn test_custom_limits() {
        let limits = RampLimits {
            linear_step: 0.5,
            angular_step: 1.0,
            max_linear: 1.0,
            max_angular: 1.5,
        };
        let mut ramp = VelocityRamp::new(limits);
        let right_back = DirectionFlags {
            right: true,
            backward: true,
            ..DirectionFlags::NONE
        };
        assert_eq!(ramp.step(right_back), VelocityCommand::new(-0.5, -1.0));
        assert_eq!(ramp.step(right_back), VelocityCommand::new(-1.0, -1.5));
        assert_eq!(ramp.step(right_back), VelocityCommand::new(-1.0, -1.5));
    }
}
