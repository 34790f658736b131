//! View Frustum Culling
//!
//! Six planes extracted from the combined view-projection matrix
//! (Gribb/Hartmann), using wgpu's [0, 1] clip depth. Plane normals point
//! into the frustum, so a point is inside a plane when its signed distance
//! is non-negative.
//!
//! Boxes are culled only when all eight corners lie outside one single
//! plane. That test is conservative: boxes near frustum corners can survive
//! it while being invisible, but a visible box is never rejected.

use glam::{Mat4, Vec3, Vec4};

use crate::terrain::BoundingBox;

/// Plane `normal · p + distance = 0`, normal unit length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub distance: f32,
}

impl Plane {
    /// Plane from raw `(a, b, c, d)` coefficients, normalized.
    pub fn from_coefficients(v: Vec4) -> Self {
        let normal = v.truncate();
        let len = normal.length();
        if len > 0.0 {
            Self {
                normal: normal / len,
                distance: v.w / len,
            }
        } else {
            Self {
                normal,
                distance: v.w,
            }
        }
    }

    /// Signed distance, positive on the inside.
    #[inline]
    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }

    #[inline]
    pub fn point_inside(&self, point: Vec3) -> bool {
        self.distance_to(point) >= 0.0
    }
}

impl Default for Plane {
    fn default() -> Self {
        Self {
            normal: Vec3::Y,
            distance: 0.0,
        }
    }
}

/// Index of each plane in [`Frustum::planes`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrustumPlane {
    Left = 0,
    Right = 1,
    Bottom = 2,
    Top = 3,
    Near = 4,
    Far = 5,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    pub fn from_matrices(view: Mat4, proj: Mat4) -> Self {
        Self::from_view_projection(proj * view)
    }

    pub fn from_view_projection(view_proj: Mat4) -> Self {
        let r0 = view_proj.row(0);
        let r1 = view_proj.row(1);
        let r2 = view_proj.row(2);
        let r3 = view_proj.row(3);

        Self {
            planes: [
                Plane::from_coefficients(r3 + r0),
                Plane::from_coefficients(r3 - r0),
                Plane::from_coefficients(r3 + r1),
                Plane::from_coefficients(r3 - r1),
                Plane::from_coefficients(r2),
                Plane::from_coefficients(r3 - r2),
            ],
        }
    }

    /// Recompute the planes for a new camera. Must run before any
    /// visibility test of the frame.
    pub fn update(&mut self, view: Mat4, proj: Mat4) {
        *self = Self::from_matrices(view, proj);
    }

    pub fn plane(&self, which: FrustumPlane) -> &Plane {
        &self.planes[which as usize]
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|p| p.point_inside(point))
    }

    /// False only when all eight corners lie outside the same plane.
    /// Boxes with non-finite coordinates are reported visible.
    pub fn is_visible(&self, bounds: &BoundingBox) -> bool {
        if !bounds.is_finite() {
            return true;
        }
        let corners = bounds.corners();
        !self
            .planes
            .iter()
            .any(|plane| corners.iter().all(|&c| !plane.point_inside(c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn looking_down_neg_z() -> Frustum {
        let view = Mat4::look_at_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
        let proj = Mat4::perspective_rh(90.0_f32.to_radians(), 1.0, 1.0, 100.0);
        Frustum::from_matrices(view, proj)
    }

    #[test]
    fn test_planes_are_normalized() {
        for plane in looking_down_neg_z().planes {
            assert!((plane.normal.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_near_and_far_distances() {
        let f = looking_down_neg_z();
        let near = f.plane(FrustumPlane::Near);
        let far = f.plane(FrustumPlane::Far);
        assert!((near.distance_to(Vec3::new(0.0, 0.0, -1.0))).abs() < 1e-4);
        assert!((far.distance_to(Vec3::new(0.0, 0.0, -100.0))).abs() < 1e-3);
        assert!(near.normal.z < 0.0);
        assert!(far.normal.z > 0.0);
    }

    #[test]
    fn test_contains_point() {
        let f = looking_down_neg_z();
        assert!(f.contains_point(Vec3::new(0.0, 0.0, -10.0)));
        assert!(!f.contains_point(Vec3::new(0.0, 0.0, 10.0)));
        assert!(!f.contains_point(Vec3::new(0.0, 0.0, -0.5)));
        assert!(!f.contains_point(Vec3::new(0.0, 0.0, -150.0)));
        assert!(!f.contains_point(Vec3::new(20.0, 0.0, -10.0)));
    }

    #[test]
    fn test_box_visibility() {
        let f = looking_down_neg_z();
        let inside = BoundingBox::new(Vec3::new(-1.0, -1.0, -11.0), Vec3::new(1.0, 1.0, -9.0));
        let behind = BoundingBox::new(Vec3::new(-1.0, -1.0, 5.0), Vec3::new(1.0, 1.0, 7.0));
        let straddling = BoundingBox::new(Vec3::new(5.0, -1.0, -11.0), Vec3::new(30.0, 1.0, -9.0));
        assert!(f.is_visible(&inside));
        assert!(!f.is_visible(&behind));
        assert!(f.is_visible(&straddling));
    }

    #[test]
    fn test_non_finite_box_is_visible() {
        let f = looking_down_neg_z();
        let bad = BoundingBox::new(Vec3::new(f32::NAN, 0.0, 50.0), Vec3::new(1.0, 1.0, 60.0));
        assert!(f.is_visible(&bad));
    }
}
