use crate::config::CameraConfig;
use bevy_ecs::prelude::Resource;
use glam::{Mat4, Vec2, Vec3};

const DEFAULT_UP: Vec3 = Vec3::Y;

/// Scroll-driven dolly: `z = base_z - p * travel`, always looking at a fixed point.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub base_z: f32,
    pub travel: f32,
    pub look_at: Vec3,
    pub fov_y_radians: f32,
}

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

impl Default for CameraPose {
    fn default() -> Self {
        CameraRig::from_config(&CameraConfig::default()).pose(0.0)
    }
}

impl CameraRig {
    pub fn new(base_z: f32, travel: f32, look_at: Vec3) -> Self {
        Self { base_z, travel, look_at, fov_y_radians: 50f32.to_radians() }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        let mut rig = Self::new(config.base_z, config.travel, Vec3::from_array(config.look_at));
        rig.fov_y_radians = config.fov_y_degrees.clamp(1.0, 179.0).to_radians();
        rig
    }

    pub fn z_at(&self, progress: f32) -> f32 {
        self.base_z - progress.clamp(0.0, 1.0) * self.travel
    }

    pub fn pose(&self, progress: f32) -> CameraPose {
        CameraPose { position: Vec3::new(0.0, 0.0, self.z_at(progress)), target: self.look_at }
    }

    pub fn camera(&self, pose: &CameraPose) -> Camera3D {
        Camera3D::from_pose(pose, self.fov_y_radians)
    }
}

/// Perspective camera built from a pose, used by render surfaces to project the scene.
#[derive(Debug, Clone)]
pub struct Camera3D {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera3D {
    pub fn new(position: Vec3, target: Vec3, fov_y_radians: f32, near: f32, far: f32) -> Self {
        Self { position, target, up: DEFAULT_UP, fov_y_radians, near, far }
    }

    pub fn from_pose(pose: &CameraPose, fov_y_radians: f32) -> Self {
        Self::new(pose.position, pose.target, fov_y_radians, 0.1, 1000.0)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y_radians, aspect.max(0.0001), self.near, self.far)
    }

    pub fn view_projection(&self, viewport: Vec2) -> Mat4 {
        let aspect = if viewport.y > 0.0 { viewport.x / viewport.y } else { 1.0 };
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dolly_is_affine_in_progress() {
        let rig = CameraRig::new(10.0, 2.0, Vec3::ZERO);
        assert_eq!(rig.z_at(0.0), 10.0);
        assert_eq!(rig.z_at(1.0), 8.0);
        assert!((rig.z_at(0.5) - 9.0).abs() < 1e-6);
        assert_eq!(rig.pose(0.3).target, Vec3::ZERO);
    }

    #[test]
    fn look_at_point_lands_on_the_clip_center() {
        let rig = CameraRig::from_config(&CameraConfig::default());
        let camera = rig.camera(&rig.pose(0.5));
        let vp = camera.view_projection(Vec2::new(1280.0, 720.0));
        assert!(!vp.to_cols_array().iter().any(|v| v.is_nan() || v.is_infinite()));
        let clip = vp * Vec3::ZERO.extend(1.0);
        assert!(clip.w > 0.0, "origin is in front of the camera");
        assert!((clip.x / clip.w).abs() < 1e-5 && (clip.y / clip.w).abs() < 1e-5);
    }

    #[test]
    fn dolly_in_grows_projected_size() {
        let rig = CameraRig::new(10.0, 2.0, Vec3::ZERO);
        let viewport = Vec2::new(800.0, 600.0);
        let ndc_x = |p: f32| {
            let clip = rig.camera(&rig.pose(p)).view_projection(viewport) * Vec3::X.extend(1.0);
            clip.x / clip.w
        };
        assert!(ndc_x(1.0) > ndc_x(0.0));
    }
}
