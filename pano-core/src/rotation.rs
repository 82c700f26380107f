use nalgebra::{Matrix3, Rotation3};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Denominator offset used when recovering yaw from a rotation matrix.
const YAW_EPSILON: f32 = 1e-6;

/// A camera orientation as yaw, pitch and roll angles in radians.
///
/// The rotation matrix is composed as `R = Rz(yaw) * Ry(pitch) * Rx(roll)`.
/// Every forward and inverse conversion in this workspace relies on exactly this
/// order, so it must not be changed independently anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Ypr {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl Ypr {
    pub const IDENTITY: Self = Self {
        yaw: 0.0,
        pitch: 0.0,
        roll: 0.0,
    };

    pub fn new(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self { yaw, pitch, roll }
    }

    /// Only yaw, with zero pitch and roll.
    pub fn yaw(yaw: f32) -> Self {
        Self::new(yaw, 0.0, 0.0)
    }

    /// `true` if all three angles are exactly zero.
    pub fn is_identity(self) -> bool {
        self == Self::IDENTITY
    }

    /// Builds `Rz(yaw) * Ry(pitch) * Rx(roll)`.
    pub fn rotation(self) -> Rotation3<f32> {
        // nalgebra composes euler angles as `Rz(yaw) * Ry(pitch) * Rx(roll)`.
        Rotation3::from_euler_angles(self.roll, self.pitch, self.yaw)
    }

    /// Recovers the angles of a rotation built by [`Ypr::rotation`].
    ///
    /// Pitch is recovered in `[-pi/2, pi/2]`, so the angles may differ from the
    /// ones the matrix was built from while describing the same rotation.
    pub fn from_rotation(rotation: &Rotation3<f32>) -> Self {
        let m: &Matrix3<f32> = rotation.matrix();
        let yaw = m[(1, 0)].atan2(m[(0, 0)] + YAW_EPSILON);
        let pitch = (-m[(2, 0)]).clamp(-1.0, 1.0).asin();
        let roll = m[(2, 1)].atan2(m[(2, 2)]);
        Self { yaw, pitch, roll }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.yaw, self.pitch, self.roll]
    }
}

impl From<[f32; 3]> for Ypr {
    fn from([yaw, pitch, roll]: [f32; 3]) -> Self {
        Self { yaw, pitch, roll }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn composition_order_is_z_y_x() {
        let ypr = Ypr::new(0.3, -0.7, 1.1);
        let rz = Rotation3::from_axis_angle(&Vector3::z_axis(), ypr.yaw);
        let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), ypr.pitch);
        let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), ypr.roll);
        assert_relative_eq!(ypr.rotation(), rz * ry * rx, epsilon = 1e-6);
    }

    #[test]
    fn angles_round_trip() {
        let ypr = Ypr::new(2.0, 0.4, -1.3);
        let recovered = Ypr::from_rotation(&ypr.rotation());
        assert_relative_eq!(recovered.yaw, ypr.yaw, epsilon = 1e-4);
        assert_relative_eq!(recovered.pitch, ypr.pitch, epsilon = 1e-4);
        assert_relative_eq!(recovered.roll, ypr.roll, epsilon = 1e-4);
    }

    #[test]
    fn identity_is_detected() {
        assert!(Ypr::IDENTITY.is_identity());
        assert!(Ypr::from([0.0, 0.0, 0.0]).is_identity());
        assert!(!Ypr::yaw(0.1).is_identity());
    }
}
