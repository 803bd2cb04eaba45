use wgpu::util::DeviceExt;

use crate::data_structures::scene_graph::Lighting;

#[derive(Debug)]
pub struct LightResources {
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

/// GPU image of [`Lighting`]. Every field is a vec4 to satisfy uniform alignment;
/// intensities are premultiplied into the colours.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub ambient: [f32; 4],
    pub sky: [f32; 4],
    pub ground: [f32; 4],
    pub sun_direction: [f32; 4],
    pub sun_colour: [f32; 4],
    /// `w` holds the range.
    pub point_position: [f32; 4],
    pub point_colour: [f32; 4],
}

fn scaled([r, g, b]: [f32; 3], intensity: f32) -> [f32; 4] {
    [r * intensity, g * intensity, b * intensity, 1.0]
}

impl From<&Lighting> for LightUniform {
    fn from(lighting: &Lighting) -> Self {
        use cgmath::InnerSpace;
        let sun = if lighting.sun_direction.magnitude2() > f32::EPSILON {
            lighting.sun_direction.normalize()
        } else {
            -cgmath::Vector3::unit_y()
        };
        Self {
            ambient: scaled(lighting.ambient_colour, lighting.ambient_intensity),
            sky: scaled(lighting.sky_colour, 1.0),
            ground: scaled(lighting.ground_colour, 1.0),
            sun_direction: [sun.x, sun.y, sun.z, 0.0],
            sun_colour: scaled(lighting.sun_colour, lighting.sun_intensity),
            point_position: [
                lighting.point_position.x,
                lighting.point_position.y,
                lighting.point_position.z,
                lighting.point_range,
            ],
            point_colour: scaled(lighting.point_colour, lighting.point_intensity),
        }
    }
}

pub fn mk_buffer(device: &wgpu::Device, light_uniform: LightUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Light Uniform Buffer"),
        contents: bytemuck::cast_slice(&[light_uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
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
        label: Some("light_bind_group_layout"),
    })
}

pub fn mk_bind_group(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    light_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: light_buffer.as_entire_binding(),
        }],
        label: Some("light_bind_group"),
    })
}

impl LightResources {
    pub fn new(device: &wgpu::Device, lighting: &Lighting) -> Self {
        let uniform = LightUniform::from(lighting);
        let buffer = mk_buffer(device, uniform);
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = mk_bind_group(device, &bind_group_layout, &buffer);
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    /// Uploads `lighting` if it changed since the last write.
    pub fn write(&mut self, queue: &wgpu::Queue, lighting: &Lighting) {
        let uniform = LightUniform::from(lighting);
        if uniform != self.uniform {
            self.uniform = uniform;
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
        }
    }
}
