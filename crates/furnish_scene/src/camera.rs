//! Camera view used to turn screen points into picking rays and back.

use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};

use crate::geometry::Ray;

/// Vertical field of view of the default viewer camera, in degrees
pub const DEFAULT_FOV_Y_DEGREES: f32 = 70.0;
/// Near clip plane of the default viewer camera
pub const DEFAULT_NEAR: f32 = 0.01;
/// Far clip plane of the default viewer camera
pub const DEFAULT_FAR: f32 = 20.0;

/// View and projection of the camera for one frame, plus the viewport in pixels.
///
/// Screen coordinates have their origin at the top-left corner with Y down,
/// matching touch input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraView {
    /// World to camera space
    pub view: Mat4,
    /// Camera to clip space (OpenGL depth range)
    pub projection: Mat4,
    /// Viewport size in pixels
    pub viewport: Vec2,
}

impl CameraView {
    pub fn new(view: Mat4, projection: Mat4, viewport: Vec2) -> Self {
        Self {
            view,
            projection,
            viewport,
        }
    }

    /// Perspective camera at `eye` looking at `target`
    pub fn look_at(eye: Vec3, target: Vec3, viewport: Vec2) -> Self {
        let aspect = if viewport.y > 0.0 { viewport.x / viewport.y } else { 1.0 };
        Self {
            view: Mat4::look_at_rh(eye, target, Vec3::Y),
            projection: Mat4::perspective_rh_gl(
                DEFAULT_FOV_Y_DEGREES.to_radians(),
                aspect,
                DEFAULT_NEAR,
                DEFAULT_FAR,
            ),
            viewport,
        }
    }

    /// Viewport centre in pixels
    pub fn center(&self) -> Vec2 {
        self.viewport * 0.5
    }

    /// Convert a screen point to normalized device coordinates
    pub fn screen_to_ndc(&self, point: Vec2) -> Vec2 {
        if self.viewport.x <= 0.0 || self.viewport.y <= 0.0 {
            return Vec2::ZERO;
        }
        Vec2::new(
            (point.x / self.viewport.x) * 2.0 - 1.0,
            -(point.y / self.viewport.y) * 2.0 + 1.0,
        )
    }

    /// World-space picking ray through a screen point
    pub fn screen_ray(&self, point: Vec2) -> Ray {
        let ndc = self.screen_to_ndc(point);
        let inverse = (self.projection * self.view).inverse();

        let near = inverse.project_point3(Vec3::new(ndc.x, ndc.y, -1.0));
        let far = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        Ray::from_points(near, far)
    }

    /// Project a world position to screen coordinates.
    ///
    /// Returns None for points behind the camera.
    pub fn project_to_screen(&self, world: Vec3) -> Option<Vec2> {
        let clip = self.projection * self.view * world.extend(1.0);
        if clip.w <= 1e-6 {
            return None;
        }

        let ndc = clip.xyz() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.viewport.x,
            (1.0 - ndc.y) * 0.5 * self.viewport.y,
        ))
    }
}

impl Default for CameraView {
    fn default() -> Self {
        Self::look_at(Vec3::ZERO, Vec3::NEG_Z, Vec2::new(1080.0, 1920.0))
    }
}
