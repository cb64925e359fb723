//! Rigid 3D transforms

use nalgebra::{Isometry3, Matrix4, Point3, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// A unit quaternion describing an orientation
pub type Quaternionf = UnitQuaternion<f32>;

/// Position and orientation of a node, mapping node space into its parent's space.
///
/// Cameras follow the usual right-handed convention: they look down their local -Z
/// with +Y up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform {
    pub translation: Vector3f,
    pub rotation: Quaternionf,
}

impl RigidTransform {
    /// Create an identity transformation
    pub fn identity() -> Self {
        Self {
            translation: Vector3f::zeros(),
            rotation: Quaternionf::identity(),
        }
    }

    /// Create a pure translation
    pub fn translation(translation: Vector3f) -> Self {
        Self {
            translation,
            rotation: Quaternionf::identity(),
        }
    }

    /// Create a pure rotation
    pub fn rotation(rotation: Quaternionf) -> Self {
        Self {
            translation: Vector3f::zeros(),
            rotation,
        }
    }

    /// Create a transformation from translation and rotation
    pub fn from_translation_rotation(translation: Vector3f, rotation: Quaternionf) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Create a transformation from a translation and XYZ Euler angles in degrees
    pub fn from_euler_degrees(translation: Vector3f, rx: f32, ry: f32, rz: f32) -> Self {
        let rotation = Quaternionf::from_euler_angles(rx.to_radians(), ry.to_radians(), rz.to_radians());
        Self {
            translation,
            rotation,
        }
    }

    /// Place a viewer at `eye` looking at `target`.
    ///
    /// When `up` is parallel to the viewing direction another axis is substituted,
    /// so a straight-down view still yields a valid orientation.
    pub fn look_at(eye: &Point3f, target: &Point3f, up: &Vector3f) -> Self {
        let direction = target - eye;
        let up = [*up, Vector3f::z(), Vector3f::x()]
            .into_iter()
            .find(|candidate| direction.cross(candidate).norm() > 1e-6)
            .unwrap_or_else(Vector3f::y);
        let view = Isometry3::look_at_rh(eye, target, &up);
        Self::from(view.inverse())
    }

    /// Position of the origin of this transform
    pub fn position(&self) -> Point3f {
        Point3f::from(self.translation)
    }

    /// Direction the local -Z axis points to
    pub fn forward(&self) -> Vector3f {
        self.rotation * -Vector3f::z()
    }

    /// Convert to an nalgebra isometry
    pub fn to_isometry(&self) -> Isometry3<f32> {
        Isometry3::from_parts(Translation3::from(self.translation), self.rotation)
    }

    /// Homogeneous 4x4 matrix of this transform
    pub fn to_homogeneous(&self) -> Matrix4<f32> {
        self.to_isometry().to_homogeneous()
    }

    /// Apply the transformation to a point
    pub fn transform_point(&self, point: &Point3f) -> Point3f {
        self.rotation * point + self.translation
    }

    /// Apply the rotation part to a vector
    pub fn transform_vector(&self, vector: &Vector3f) -> Vector3f {
        self.rotation * vector
    }

    /// Compose this transformation with another (`other` applied first)
    pub fn compose(self, other: Self) -> Self {
        Self::from(self.to_isometry() * other.to_isometry())
    }

    /// Get the inverse transformation
    pub fn inverse(self) -> Self {
        Self::from(self.to_isometry().inverse())
    }

    /// Interpolate towards `other`: linear for translation, spherical for rotation.
    ///
    /// Rotations too close together to define a slerp arc snap to the nearer endpoint.
    pub fn interpolate(&self, other: &Self, t: f32) -> Self {
        let translation = self.translation.lerp(&other.translation, t);
        let rotation = self
            .rotation
            .try_slerp(&other.rotation, t, 1.0e-6)
            .unwrap_or(if t < 0.5 { self.rotation } else { other.rotation });
        Self {
            translation,
            rotation,
        }
    }

    /// True when both translation and rotation agree within `epsilon`
    /// (distance units and radians respectively)
    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.translation - other.translation).norm() <= epsilon
            && self.rotation.angle_to(&other.rotation) <= epsilon
    }

    /// Check if this is approximately the identity transformation
    pub fn is_identity(&self, epsilon: f32) -> bool {
        self.approx_eq(&Self::identity(), epsilon)
    }

    /// All components are finite numbers
    pub fn is_finite(&self) -> bool {
        self.translation.iter().all(|v| v.is_finite())
            && self.rotation.coords.iter().all(|v| v.is_finite())
    }
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for RigidTransform {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.compose(rhs)
    }
}

impl From<Isometry3<f32>> for RigidTransform {
    fn from(isometry: Isometry3<f32>) -> Self {
        Self {
            translation: isometry.translation.vector,
            rotation: isometry.rotation,
        }
    }
}
