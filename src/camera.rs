//! Camera, projection and the user-driven orbit controls.
//!
//! The camera is a plain position/look-at pair. Two writers move it: the
//! [`OrbitController`] (mouse orbit, pan and zoom) and the camera director
//! (scripted transitions). The controller re-derives its spherical offset
//! from the live camera on every update, so both compose.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Point3, Rad, Vector3, Zero};
use wgpu::util::DeviceExt;
use winit::event::MouseButton;

use crate::{
    config::{CameraConfig, OrbitConfig},
    pick::Ray,
};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Smallest polar angle the orbit may reach; keeps the view off the pole.
const MIN_POLAR: f32 = 1e-3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>, T: Into<Point3<f32>>>(position: P, target: T) -> Self {
        Self {
            position: position.into(),
            target: target.into(),
            up: Vector3::unit_y(),
        }
    }

    pub fn calc_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::look_at_rh(self.position, self.target, self.safe_up())
    }

    /// `up`, or -z while looking straight along it.
    fn safe_up(&self) -> Vector3<f32> {
        if self.forward().cross(self.up).magnitude2() < 1e-8 {
            -Vector3::unit_z()
        } else {
            self.up
        }
    }

    /// Unit view direction, or -z when position and target coincide.
    pub fn forward(&self) -> Vector3<f32> {
        let dir = self.target - self.position;
        if dir.magnitude2() > f32::EPSILON {
            dir.normalize()
        } else {
            -Vector3::unit_z()
        }
    }

    /// Ray from the eye through the pixel at `cursor` on a `size` sized surface.
    pub fn cast_ray_from_mouse(
        &self,
        cursor: (f64, f64),
        size: (u32, u32),
        projection: &Projection,
    ) -> Ray {
        let (w, h) = (size.0.max(1) as f32, size.1.max(1) as f32);
        let ndc_x = 2.0 * cursor.0 as f32 / w - 1.0;
        let ndc_y = 1.0 - 2.0 * cursor.1 as f32 / h;
        self.cast_ray_ndc(ndc_x, ndc_y, projection)
    }

    /// Ray through normalized device coordinates (`-1..1`, y up).
    pub fn cast_ray_ndc(&self, ndc_x: f32, ndc_y: f32, projection: &Projection) -> Ray {
        let forward = self.forward();
        let right = forward.cross(self.safe_up()).normalize();
        let up = right.cross(forward);
        let half_height = (projection.fovy.0 * 0.5).tan();
        let half_width = half_height * projection.aspect;
        let direction = forward + right * (ndc_x * half_width) + up * (ndc_y * half_height);
        Ray::new(self.position, direction.normalize())
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Projection {
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width.max(1) as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn from_config(width: u32, height: u32, config: &CameraConfig) -> Self {
        Self::new(
            width,
            height,
            cgmath::Deg(config.fovy_deg),
            config.znear,
            config.zfar,
        )
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn calc_matrix(&self) -> cgmath::Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_position: [f32; 4],
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: cgmath::Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.position.to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// GPU side of the camera: the uniform and its bind group.
#[derive(Debug)]
pub struct CameraResources {
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    pub fn new(device: &wgpu::Device, camera: &Camera, projection: &Projection) -> Self {
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(camera, projection);

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("camera_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn write(&mut self, queue: &wgpu::Queue, camera: &Camera, projection: &Projection) {
        self.uniform.update_view_proj(camera, projection);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

/// Damped orbit/pan/zoom around a look-at target.
///
/// Input only accumulates deltas; [`OrbitController::update`] applies a
/// `damping` fraction of them per frame and decays the rest.
#[derive(Debug, Clone)]
pub struct OrbitController {
    pub target: Point3<f32>,
    config: OrbitConfig,
    theta_delta: f32,
    phi_delta: f32,
    pan_offset: Vector3<f32>,
    scale: f32,
    rotating: bool,
    panning: bool,
    last_cursor: Option<(f64, f64)>,
    viewport_height: f32,
    fovy: Rad<f32>,
}

impl OrbitController {
    pub fn new(target: Point3<f32>, config: OrbitConfig) -> Self {
        Self {
            target,
            config,
            theta_delta: 0.0,
            phi_delta: 0.0,
            pan_offset: Vector3::zero(),
            scale: 1.0,
            rotating: false,
            panning: false,
            last_cursor: None,
            viewport_height: 600.0,
            fovy: cgmath::Deg(75.0).into(),
        }
    }

    pub fn config(&self) -> &OrbitConfig {
        &self.config
    }

    /// Keeps pixel to angle conversion in step with the surface.
    pub fn resize(&mut self, height: u32, projection: &Projection) {
        self.viewport_height = height.max(1) as f32;
        self.fovy = projection.fovy;
    }

    pub fn is_dragging(&self) -> bool {
        self.rotating || self.panning
    }

    /// Drops any drag in progress, e.g. when the cursor leaves the window.
    pub fn release(&mut self) {
        self.rotating = false;
        self.panning = false;
        self.last_cursor = None;
    }

    pub fn button(&mut self, button: MouseButton, pressed: bool) {
        match button {
            MouseButton::Left => self.rotating = pressed,
            MouseButton::Right | MouseButton::Middle => self.panning = pressed,
            _ => {}
        }
    }

    pub fn cursor_moved(&mut self, cursor: (f64, f64), camera: &Camera) {
        let last = self.last_cursor.replace(cursor);
        let Some(last) = last else {
            return;
        };
        let dx = (cursor.0 - last.0) as f32;
        let dy = (cursor.1 - last.1) as f32;
        if self.rotating {
            self.rotate(dx, dy);
        } else if self.panning {
            self.pan(dx, dy, camera);
        }
    }

    /// Pixel deltas to orbit angles; a full viewport height is one turn.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        let per_pixel = 2.0 * PI / self.viewport_height * self.config.rotate_speed;
        self.theta_delta -= dx * per_pixel;
        self.phi_delta -= dy * per_pixel;
    }

    /// Moves the target in the view plane so the ground follows the cursor.
    pub fn pan(&mut self, dx: f32, dy: f32, camera: &Camera) {
        let distance = (camera.position - self.target).magnitude();
        let world_per_pixel = 2.0 * distance * (self.fovy.0 * 0.5).tan() / self.viewport_height;
        let forward = camera.forward();
        let right = forward.cross(camera.safe_up()).normalize();
        let up = right.cross(forward);
        self.pan_offset += (-right * dx + up * dy) * world_per_pixel * self.config.pan_speed;
    }

    /// Positive `lines` zooms in.
    pub fn scroll(&mut self, lines: f32) {
        let step = 0.95f32.powf(self.config.zoom_speed);
        self.scale *= step.powf(lines);
    }

    /// Applies pending input to `camera` and makes it look at [`Self::target`].
    pub fn update(&mut self, camera: &mut Camera) {
        let damping = self.config.damping.clamp(0.0, 1.0);
        let offset = camera.position - self.target;
        let radius = offset.magnitude();

        let (mut theta, mut phi) = if radius > f32::EPSILON {
            (offset.x.atan2(offset.z), (offset.y / radius).clamp(-1.0, 1.0).acos())
        } else {
            (0.0, PI * 0.5)
        };
        theta += self.theta_delta * damping;
        phi += self.phi_delta * damping;
        phi = phi.clamp(MIN_POLAR, self.config.max_polar_angle.max(MIN_POLAR));

        let radius = (radius.max(f32::EPSILON) * self.scale)
            .clamp(self.config.min_distance, self.config.max_distance);
        self.target += self.pan_offset * damping;

        let offset = Vector3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );
        camera.position = self.target + offset;
        camera.target = self.target;

        let decay = 1.0 - damping;
        self.theta_delta *= decay;
        self.phi_delta *= decay;
        self.pan_offset *= decay;
        self.scale = 1.0;
    }
}
