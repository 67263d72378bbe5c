use std::f32::consts::TAU;

use cgmath::{Matrix4, Rad};

/// Spin of the primitive, in radians, advanced by the render loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    angle: f32,
    angular_velocity: f32,
}

impl RotationState {
    /// `angular_velocity` is in radians per second and stays fixed.
    pub fn new(angular_velocity: f32) -> Self {
        Self {
            angle: 0.0,
            angular_velocity,
        }
    }

    /// Advances the angle by `delta_time * angular_velocity`, kept in `[0, 2π)`.
    ///
    /// Time only moves forward: zero, negative and non-finite deltas are ignored.
    pub fn advance(&mut self, delta_time: f32) {
        let step = delta_time * self.angular_velocity;
        if delta_time.is_nan() || delta_time <= 0.0 || !step.is_finite() {
            return;
        }
        // rem_euclid keeps the angle positive for negative velocities too
        self.angle = (self.angle + step).rem_euclid(TAU);
        // rem_euclid can round up to exactly TAU
        if self.angle >= TAU {
            self.angle = 0.0;
        }
    }

    pub fn current_angle(&self) -> f32 {
        self.angle
    }

    /// Rotation about the view-normal (Z) axis for the current angle.
    pub fn transform(&self) -> Matrix4<f32> {
        Matrix4::from_angle_z(Rad(self.angle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_zero_delta_is_idempotent() {
        let mut rotation = RotationState::new(1.7);
        rotation.advance(0.3);
        let before = rotation.current_angle();

        rotation.advance(0.0);
        assert_eq!(rotation.current_angle(), before);
    }

    #[test]
    fn test_two_half_turns_wrap_to_zero() {
        let mut rotation = RotationState::new(PI);
        rotation.advance(1.0);
        assert!((rotation.current_angle() - PI).abs() < 1e-5);

        rotation.advance(1.0);
        let angle = rotation.current_angle();
        // 0 mod 2π, allowing for rounding just below TAU
        assert!(angle < 1e-5 || (TAU - angle) < 1e-5, "angle = {angle}");
    }

    #[test]
    fn test_quarter_turn() {
        let mut rotation = RotationState::new(FRAC_PI_2);
        rotation.advance(1.0);
        assert!((rotation.current_angle() - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_long_session_stays_bounded() {
        let mut rotation = RotationState::new(60f32.to_radians());
        for _ in 0..100_000 {
            rotation.advance(1.0 / 60.0);
        }
        assert!(rotation.current_angle() >= 0.0 && rotation.current_angle() < TAU);
    }

    #[test]
    fn test_negative_velocity_wraps_positive() {
        let mut rotation = RotationState::new(-1.0);
        rotation.advance(0.5);
        assert!((rotation.current_angle() - (TAU - 0.5)).abs() < 1e-5);
    }

    #[test]
    fn test_bad_deltas_are_ignored() {
        let mut rotation = RotationState::new(1.0);
        rotation.advance(1.0);

        rotation.advance(f32::INFINITY);
        rotation.advance(f32::NAN);
        rotation.advance(-0.5);
        assert_eq!(rotation.current_angle(), 1.0);

        rotation.advance(0.25);
        assert!((rotation.current_angle() - 1.25).abs() < 1e-6);
    }

    #[test]
    fn test_overflowing_step_is_ignored() {
        let mut rotation = RotationState::new(f32::MAX);
        rotation.advance(2.0);
        assert_eq!(rotation.current_angle(), 0.0);
    }
}
