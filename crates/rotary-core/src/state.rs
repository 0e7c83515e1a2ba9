//! Camera and draw-list types shared with the native frontend.
//!
//! These types avoid referencing platform-specific APIs. The frontend reads
//! them to build the view-projection matrix and to upload sprite instances.

use glam::{Mat4, Vec2, Vec3};

/// Orthographic camera looking down -Z, described the way a 2D scene sees it.
#[derive(Clone, Debug)]
pub struct OrthoCamera {
    pub position: Vec3,
    /// Half of the visible world height.
    pub ortho_size: f32,
    pub screen_width: u32,
    pub screen_height: u32,
    pub znear: f32,
    pub zfar: f32,
}

impl OrthoCamera {
    pub fn new(position: Vec3, ortho_size: f32, screen_width: u32, screen_height: u32) -> Self {
        Self {
            position,
            ortho_size,
            screen_width,
            screen_height,
            znear: 0.1,
            zfar: 100.0,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.screen_width as f32 / self.screen_height.max(1) as f32
    }

    /// Half of the visible world width.
    pub fn half_width(&self) -> f32 {
        self.ortho_size * self.aspect()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.screen_width = width;
        self.screen_height = height;
    }

    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        let hw = self.half_width();
        Mat4::orthographic_rh(
            -hw,
            hw,
            -self.ortho_size,
            self.ortho_size,
            self.znear,
            self.zfar,
        )
    }

    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        let eye = self.position;
        Mat4::look_at_rh(eye, eye - Vec3::Z, Vec3::Y)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Map a window pixel (origin top-left) to a world point on the camera's
    /// X/Y plane.
    pub fn screen_to_world(&self, sx: f32, sy: f32) -> Vec2 {
        let w = self.screen_width.max(1) as f32;
        let h = self.screen_height.max(1) as f32;
        let u = sx / w - 0.5;
        let v = 0.5 - sy / h;
        Vec2::new(
            self.position.x + u * 2.0 * self.half_width(),
            self.position.y + v * 2.0 * self.ortho_size,
        )
    }

    /// Map a world point to viewport space: (0,0) bottom-left, (1,1)
    /// top-right, `z` the distance in front of the camera.
    pub fn world_to_viewport(&self, world: Vec3) -> Vec3 {
        let hw = self.half_width().max(f32::EPSILON);
        let hh = self.ortho_size.max(f32::EPSILON);
        let rel = world - self.position;
        Vec3::new(
            0.5 + rel.x / (2.0 * hw),
            0.5 + rel.y / (2.0 * hh),
            -rel.z,
        )
    }
}

impl Default for OrthoCamera {
    fn default() -> Self {
        Self::new(
            Vec3::new(0.0, 0.0, 10.0),
            crate::DEFAULT_ORTHO_SIZE,
            crate::DEFAULT_SCREEN_SIZE[0],
            crate::DEFAULT_SCREEN_SIZE[1],
        )
    }
}

/// Axis-aligned world-space rectangle, e.g. the bounds of a reference sprite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn top_right(&self) -> Vec2 {
        self.max
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// One quad of the draw list. Layout matches the instance buffer in
/// `scene.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpriteInstance {
    pub pos: [f32; 3],
    pub rotation: f32,
    pub size: [f32; 2],
    pub glow: f32,
    pub _pad: f32,
    pub color: [f32; 4],
}

impl SpriteInstance {
    pub fn new(center: Vec3, size: Vec2, color: [f32; 4]) -> Self {
        Self {
            pos: center.to_array(),
            rotation: 0.0,
            size: size.to_array(),
            glow: 0.0,
            _pad: 0.0,
            color,
        }
    }

    pub fn with_rotation(mut self, radians: f32) -> Self {
        self.rotation = radians;
        self
    }

    pub fn with_glow(mut self, glow: f32) -> Self {
        self.glow = glow;
        self
    }

    pub fn alpha(&self) -> f32 {
        self.color[3]
    }
}
