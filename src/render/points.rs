//! Instanced point-splat renderers.
//!
//! Every particle becomes a camera-facing quad expanded in the vertex
//! stage from a corner id, drawn with additive blending. The fragment is a
//! soft circular core wrapped in an exponential glow; texels outside the
//! unit radius are discarded. Perspective projection provides the distance
//! attenuation, the quads live in world units.

use crate::galaxy::{ParticleKind, ParticleStore};
use crate::gpu::GpuGalaxy;
use crate::math::{Matrix4, Vector3};
use wgpu::util::DeviceExt;

/// World-space half size of a star splat before the user multiplier.
const STAR_BASE_SIZE: f32 = 0.3;
/// World-space half size of an ambient splat.
const AMBIENT_BASE_SIZE: f32 = 0.06;
/// World-space half size of the nucleus splat.
const CENTER_BASE_SIZE: f32 = 0.8;

/// Runtime display tunables. Not persisted in snapshots.
#[derive(Debug, Clone)]
pub struct PointSettings {
    /// Global splat opacity.
    pub opacity: f32,
    /// Star size multiplier.
    pub star_size: f32,
    /// Ambient size multiplier.
    pub ambient_size: f32,
    /// Nucleus size multiplier.
    pub center_size: f32,
    /// Whether stars are drawn.
    pub show_stars: bool,
    /// Whether ambient particles are drawn.
    pub show_ambient: bool,
    /// Whether the nucleus is drawn.
    pub show_center: bool,
}

impl Default for PointSettings {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            star_size: 1.0,
            ambient_size: 1.0,
            center_size: 1.0,
            show_stars: true,
            show_ambient: true,
            show_center: true,
        }
    }
}

impl PointSettings {
    /// Set the global opacity, clamped to [0, 1].
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    /// Set the size multiplier for one kind, clamped to [0.1, 3].
    pub fn set_size(&mut self, kind: ParticleKind, multiplier: f32) {
        let m = multiplier.clamp(0.1, 3.0);
        match kind {
            ParticleKind::Star => self.star_size = m,
            ParticleKind::Ambient => self.ambient_size = m,
            ParticleKind::Center => self.center_size = m,
        }
    }

    /// Toggle visibility for one kind.
    pub fn set_visible(&mut self, kind: ParticleKind, visible: bool) {
        match kind {
            ParticleKind::Star => self.show_stars = visible,
            ParticleKind::Ambient => self.show_ambient = visible,
            ParticleKind::Center => self.show_center = visible,
        }
    }

    /// World half-size for a kind, zero when the kind is hidden.
    fn size_for(&self, kind: ParticleKind) -> f32 {
        match kind {
            ParticleKind::Star if self.show_stars => STAR_BASE_SIZE * self.star_size,
            ParticleKind::Ambient if self.show_ambient => AMBIENT_BASE_SIZE * self.ambient_size,
            ParticleKind::Center if self.show_center => CENTER_BASE_SIZE * self.center_size,
            _ => 0.0,
        }
    }
}

/// A simple perspective camera for the point pipelines.
#[derive(Debug, Clone)]
pub struct PointCamera {
    /// Camera position.
    pub eye: Vector3,
    /// Look-at target.
    pub target: Vector3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Near plane.
    pub near: f32,
    /// Far plane.
    pub far: f32,
}

impl Default for PointCamera {
    fn default() -> Self {
        Self {
            eye: Vector3::new(0.0, 10.0, 18.0),
            target: Vector3::ZERO,
            fov_y: std::f32::consts::FRAC_PI_4,
            near: 0.1,
            far: 200.0,
        }
    }
}

impl PointCamera {
    /// Billboard basis: camera right and up in world space. Undefined when
    /// the view direction is vertical.
    fn basis(&self) -> (Vector3, Vector3) {
        let forward = (self.target - self.eye).normalized();
        let right = forward.cross(&Vector3::UP).normalized();
        let up = right.cross(&forward);
        (right, up)
    }

    fn view_proj(&self, aspect: f32) -> Matrix4 {
        let projection = Matrix4::perspective(self.fov_y, aspect, self.near, self.far);
        let view = Matrix4::look_at(self.eye, self.target, Vector3::UP);
        projection.multiply(&view)
    }
}

/// Point pipeline uniform data.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct PointUniform {
    view_proj: [f32; 16],
    /// Camera right (xyz) + state texture dim (w).
    camera_right: [f32; 4],
    /// Camera up (xyz) + opacity (w).
    camera_up: [f32; 4],
    /// Star, ambient, center world half-sizes; zero hides the kind.
    sizes: [f32; 4],
}

fn point_uniform(
    camera: &PointCamera,
    settings: &PointSettings,
    aspect: f32,
    dim: u32,
) -> PointUniform {
    let (right, up) = camera.basis();
    PointUniform {
        view_proj: camera.view_proj(aspect).to_array(),
        camera_right: [right.x, right.y, right.z, dim as f32],
        camera_up: [up.x, up.y, up.z, settings.opacity.clamp(0.0, 1.0)],
        sizes: [
            settings.size_for(ParticleKind::Star),
            settings.size_for(ParticleKind::Ambient),
            settings.size_for(ParticleKind::Center),
            0.0,
        ],
    }
}

/// One splat instance for the host-side path.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct PointInstance {
    /// Position (xyz) + world half-size (w).
    position_size: [f32; 4],
    /// Color (rgb) + unused (w).
    color: [f32; 4],
}

impl PointInstance {
    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x4,
                    offset: 0,
                    shader_location: 0,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x4,
                    offset: 16,
                    shader_location: 1,
                },
            ],
        }
    }
}

/// Build the visible instance list from a host-side store.
fn build_instances(store: &ParticleStore, settings: &PointSettings) -> Vec<PointInstance> {
    store
        .particles()
        .iter()
        .filter_map(|p| {
            let size = settings.size_for(p.kind);
            if size <= 0.0 {
                return None;
            }
            Some(PointInstance {
                position_size: [p.position.x, p.position.y, p.position.z, size],
                color: [p.color.r, p.color.g, p.color.b, 0.0],
            })
        })
        .collect()
}

fn additive_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

fn splat_primitive() -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleStrip,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: None,
        unclipped_depth: false,
        polygon_mode: wgpu::PolygonMode::Fill,
        conservative: false,
    }
}

/// Point renderer fed from a host-side [`ParticleStore`] every frame.
pub struct CpuPointRenderer {
    settings: PointSettings,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    instance_buffer: wgpu::Buffer,
    capacity: usize,
    instance_count: u32,
}

impl CpuPointRenderer {
    /// Build the pipeline for a target of `format`, sized for at most
    /// `capacity` particles.
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, capacity: usize) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Point Uniform Buffer"),
            contents: bytemuck::cast_slice(&[PointUniform {
                view_proj: Matrix4::IDENTITY.to_array(),
                camera_right: [1.0, 0.0, 0.0, 0.0],
                camera_up: [0.0, 1.0, 0.0, 1.0],
                sizes: [0.0; 4],
            }]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Point Instance Buffer"),
            size: (capacity * std::mem::size_of::<PointInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Point Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Point Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Point Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Point Shader"),
            source: wgpu::ShaderSource::Wgsl(CPU_POINT_SHADER.into()),
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Point Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[PointInstance::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(additive_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: splat_primitive(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            settings: PointSettings::default(),
            pipeline,
            uniform_buffer,
            bind_group,
            instance_buffer,
            capacity,
            instance_count: 0,
        }
    }

    /// Current display settings.
    pub fn settings(&self) -> &PointSettings {
        &self.settings
    }

    /// Mutable display settings; picked up on the next render.
    pub fn settings_mut(&mut self) -> &mut PointSettings {
        &mut self.settings
    }

    /// Stream the store and draw one frame into `target`, clearing it.
    pub fn render(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        queue: &wgpu::Queue,
        store: &ParticleStore,
        camera: &PointCamera,
        aspect: f32,
    ) {
        let instances = build_instances(store, &self.settings);
        let count = instances.len().min(self.capacity);
        self.instance_count = count as u32;
        if count > 0 {
            queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&instances[..count]),
            );
        }
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::cast_slice(&[point_uniform(camera, &self.settings, aspect, 0)]),
        );

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Point Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
        pass.draw(0..4, 0..self.instance_count);
    }
}

/// Point renderer fed from the GPU engine's state textures.
pub struct GpuPointRenderer {
    settings: PointSettings,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
}

impl GpuPointRenderer {
    /// Build the pipeline for a target of `format`.
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Point Texture Uniform Buffer"),
            contents: bytemuck::cast_slice(&[PointUniform {
                view_proj: Matrix4::IDENTITY.to_array(),
                camera_right: [1.0, 0.0, 0.0, 1.0],
                camera_up: [0.0, 1.0, 0.0, 1.0],
                sizes: [0.0; 4],
            }]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: false },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Point Texture Bind Group Layout"),
            entries: &[
                texture_entry(0),
                texture_entry(1),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Point Texture Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Point Texture Shader"),
            source: wgpu::ShaderSource::Wgsl(GPU_POINT_SHADER.into()),
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Point Texture Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(additive_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: splat_primitive(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            settings: PointSettings::default(),
            pipeline,
            bind_group_layout,
            uniform_buffer,
        }
    }

    /// Current display settings.
    pub fn settings(&self) -> &PointSettings {
        &self.settings
    }

    /// Mutable display settings; picked up on the next render.
    pub fn settings_mut(&mut self) -> &mut PointSettings {
        &mut self.settings
    }

    /// Draw the engine's latest state into `target`, clearing it. The bind
    /// group is rebuilt each frame since the engine's front position
    /// texture alternates.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        engine: &GpuGalaxy,
        camera: &PointCamera,
        aspect: f32,
    ) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::cast_slice(&[point_uniform(camera, &self.settings, aspect, engine.dim())]),
        );

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Point Texture Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(engine.position_view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(engine.color_view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
            ],
        });

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Point Texture Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.draw(0..4, 0..engine.count() as u32);
    }
}

const CPU_POINT_SHADER: &str = r#"
struct PointParams {
    view_proj: mat4x4<f32>,
    // xyz = camera right, w = state texture dim
    camera_right: vec4<f32>,
    // xyz = camera up, w = opacity
    camera_up: vec4<f32>,
    // star, ambient, center half-sizes
    sizes: vec4<f32>,
}

struct InstanceInput {
    // xyz = position, w = half-size
    @location(0) position_size: vec4<f32>,
    @location(1) color: vec4<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) corner: vec2<f32>,
    @location(1) color: vec3<f32>,
}

@group(0) @binding(0) var<uniform> params: PointParams;

fn corner_offset(vertex_index: u32) -> vec2<f32> {
    return vec2<f32>(
        f32(vertex_index & 1u) * 2.0 - 1.0,
        f32(vertex_index >> 1u) * 2.0 - 1.0,
    );
}

@vertex
fn vs_main(
    in: InstanceInput,
    @builtin(vertex_index) vertex_index: u32,
) -> VertexOutput {
    let corner = corner_offset(vertex_index);
    let world = in.position_size.xyz
        + (params.camera_right.xyz * corner.x + params.camera_up.xyz * corner.y)
            * in.position_size.w;

    var out: VertexOutput;
    out.position = params.view_proj * vec4<f32>(world, 1.0);
    out.corner = corner;
    out.color = in.color.rgb;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let d = length(in.corner);
    if (d > 1.0) {
        discard;
    }
    let core = 1.0 - smoothstep(0.0, 0.5, d);
    let glow = exp(-3.0 * d);
    return vec4<f32>(in.color, (core + 0.5 * glow) * params.camera_up.w);
}
"#;

const GPU_POINT_SHADER: &str = r#"
struct PointParams {
    view_proj: mat4x4<f32>,
    // xyz = camera right, w = state texture dim
    camera_right: vec4<f32>,
    // xyz = camera up, w = opacity
    camera_up: vec4<f32>,
    // star, ambient, center half-sizes
    sizes: vec4<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) corner: vec2<f32>,
    @location(1) color: vec3<f32>,
}

@group(0) @binding(0) var positions: texture_2d<f32>;
@group(0) @binding(1) var colors: texture_2d<f32>;
@group(0) @binding(2) var<uniform> params: PointParams;

fn corner_offset(vertex_index: u32) -> vec2<f32> {
    return vec2<f32>(
        f32(vertex_index & 1u) * 2.0 - 1.0,
        f32(vertex_index >> 1u) * 2.0 - 1.0,
    );
}

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @builtin(instance_index) instance_index: u32,
) -> VertexOutput {
    let dim = u32(params.camera_right.w);
    let texel = vec2<i32>(i32(instance_index % dim), i32(instance_index / dim));
    let p = textureLoad(positions, texel, 0);
    let c = textureLoad(colors, texel, 0);

    // Size by discriminant; hidden kinds and padding collapse the quad.
    var size = 0.0;
    if (p.w >= 0.0) {
        if (p.w < 1.0) {
            size = params.sizes.y;
        } else if ((p.w - 1.0) * 1000.0 >= 1000.0) {
            size = params.sizes.z;
        } else {
            size = params.sizes.x;
        }
    }

    let corner = corner_offset(vertex_index);
    let world = p.xyz
        + (params.camera_right.xyz * corner.x + params.camera_up.xyz * corner.y) * size;

    var out: VertexOutput;
    out.position = params.view_proj * vec4<f32>(world, 1.0);
    out.corner = corner;
    out.color = c.rgb;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let d = length(in.corner);
    if (d > 1.0) {
        discard;
    }
    let core = 1.0 - smoothstep(0.0, 0.5, d);
    let glow = exp(-3.0 * d);
    return vec4<f32>(in.color, (core + 0.5 * glow) * params.camera_up.w);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::GalaxyConfig;

    fn small_store() -> ParticleStore {
        GalaxyConfig {
            num_stars: 5,
            num_particles: 30,
            seed: 2,
            ..Default::default()
        }
        .generate()
        .unwrap()
    }

    #[test]
    fn test_settings_clamp() {
        let mut s = PointSettings::default();
        s.set_opacity(2.0);
        assert_eq!(s.opacity, 1.0);
        s.set_size(ParticleKind::Star, 100.0);
        assert_eq!(s.star_size, 3.0);
        s.set_size(ParticleKind::Ambient, 0.0);
        assert_eq!(s.ambient_size, 0.1);
    }

    #[test]
    fn test_hidden_kinds_are_skipped() {
        let store = small_store();
        let mut s = PointSettings::default();
        assert_eq!(build_instances(&store, &s).len(), store.len());

        s.set_visible(ParticleKind::Ambient, false);
        assert_eq!(build_instances(&store, &s).len(), 1 + 5);

        s.set_visible(ParticleKind::Star, false);
        s.set_visible(ParticleKind::Center, false);
        assert!(build_instances(&store, &s).is_empty());
    }

    #[test]
    fn test_instance_sizes_follow_kind() {
        let store = small_store();
        let s = PointSettings::default();
        let instances = build_instances(&store, &s);

        for (p, inst) in store.particles().iter().zip(&instances) {
            let expected = match p.kind {
                ParticleKind::Star => STAR_BASE_SIZE,
                ParticleKind::Ambient => AMBIENT_BASE_SIZE,
                ParticleKind::Center => CENTER_BASE_SIZE,
            };
            assert_eq!(inst.position_size[3], expected);
        }
    }

    #[test]
    fn test_camera_basis_is_orthonormal() {
        let camera = PointCamera::default();
        let (right, up) = camera.basis();
        let forward = (camera.target - camera.eye).normalized();

        assert!((right.length() - 1.0).abs() < 1e-5);
        assert!((up.length() - 1.0).abs() < 1e-5);
        assert!(right.dot(&up).abs() < 1e-5);
        assert!(right.dot(&forward).abs() < 1e-5);
    }

    #[test]
    fn test_uniform_packs_dim_and_opacity() {
        let camera = PointCamera::default();
        let mut settings = PointSettings::default();
        settings.set_opacity(0.5);
        let u = point_uniform(&camera, &settings, 16.0 / 9.0, 101);

        assert_eq!(u.camera_right[3], 101.0);
        assert_eq!(u.camera_up[3], 0.5);
        assert_eq!(u.sizes[0], STAR_BASE_SIZE);
    }
}
