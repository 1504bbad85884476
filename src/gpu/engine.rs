//! The texture-backed simulation engine.
//!
//! Positions and velocities live in two pairs of square `Rgba32Float`
//! render targets. Each step binds the front pair as inputs and draws one
//! fullscreen pass into the back pair; the fragment shader advances the
//! particle whose texel it covers, then the pairs swap. Stars orbit the
//! nucleus analytically; ambient particles gather star gravity from a
//! static spatial-grid texture built once at upload.

use super::encode::{
    self, build_star_grid, decode_positions, decode_velocities, GRID_DIM, INFLUENCE_RADIUS,
};
use crate::galaxy::{ParticleStore, SnapshotDocument, CENTER_MASS};
use crate::math::Color;
use thiserror::Error;
use wgpu::util::DeviceExt;

/// Errors reported by the GPU engine.
#[derive(Error, Debug)]
pub enum GpuError {
    /// Mapping the readback buffer failed.
    #[error("readback buffer mapping failed: {0}")]
    BufferMap(#[from] wgpu::BufferAsyncError),

    /// The device dropped the readback callback without resolving it.
    #[error("readback channel closed before the map callback ran")]
    ChannelClosed,

    /// The engine was used after [`GpuGalaxy::dispose`].
    #[error("engine already disposed")]
    Disposed,
}

/// Live-tunable simulation parameters for the GPU engine.
#[derive(Debug, Clone)]
pub struct GpuSimConfig {
    /// Gravitational constant applied to star and nucleus pull.
    pub gravity_strength: f32,
    /// Blend rate toward the ideal tangential orbit, per second.
    pub orbital_strength: f32,
    /// Per-frame velocity damping factor, in (0, 1].
    pub damping: f32,
    /// Radial clamp: escaping particles are pulled onto this sphere with
    /// halved velocity.
    pub max_radius: f32,
}

impl Default for GpuSimConfig {
    fn default() -> Self {
        Self {
            gravity_strength: 6.674e-3,
            orbital_strength: 0.35,
            damping: 0.995,
            max_radius: 20.0,
        }
    }
}

impl GpuSimConfig {
    /// Set the gravitational constant, clamped to [0, 2].
    pub fn set_gravity_strength(&mut self, strength: f32) {
        self.gravity_strength = strength.clamp(0.0, 2.0);
    }

    /// Set the orbital-alignment blend rate, clamped to [0, 2].
    pub fn set_orbital_strength(&mut self, strength: f32) {
        self.orbital_strength = strength.clamp(0.0, 2.0);
    }
}

/// Simulation uniform data.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct SimUniform {
    /// gravity strength, orbital strength, damping, dt
    force: [f32; 4],
    /// influence radius, grid half extent, max radius, center mass
    field: [f32; 4],
}

/// Vertex for the fullscreen simulation quad (position + uv).
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct FullscreenVertex {
    position: [f32; 2],
    uv: [f32; 2],
}

impl FullscreenVertex {
    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 0,
                    shader_location: 0,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 8,
                    shader_location: 1,
                },
            ],
        }
    }
}

/// Fullscreen quad vertices (two triangles).
const FULLSCREEN_QUAD_VERTICES: [FullscreenVertex; 6] = [
    FullscreenVertex { position: [-1.0, -1.0], uv: [0.0, 1.0] },
    FullscreenVertex { position: [1.0, -1.0], uv: [1.0, 1.0] },
    FullscreenVertex { position: [1.0, 1.0], uv: [1.0, 0.0] },
    FullscreenVertex { position: [-1.0, -1.0], uv: [0.0, 1.0] },
    FullscreenVertex { position: [1.0, 1.0], uv: [1.0, 0.0] },
    FullscreenVertex { position: [-1.0, 1.0], uv: [0.0, 0.0] },
];

/// One state texture usable as both a render attachment and a shader
/// input.
struct StateTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl StateTarget {
    fn new(device: &wgpu::Device, label: &str, dim: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: dim,
                height: dim,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// One ping-pong half: a position texture and a velocity texture written
/// together by the multi-target simulation pass.
struct StatePair {
    position: StateTarget,
    velocity: StateTarget,
}

/// The texture-backed galaxy engine.
///
/// The particle count is fixed at creation; a new session means a new
/// engine. Drop order of GPU resources is handled by [`Self::dispose`],
/// which must be called before the device goes away.
pub struct GpuGalaxy {
    count: usize,
    dim: u32,
    config: GpuSimConfig,
    /// Display colors kept host-side for snapshot export.
    colors: Vec<Color>,
    state: [StatePair; 2],
    /// Index of the pair holding the latest state.
    front: usize,
    color_texture: StateTarget,
    star_grid: StateTarget,
    pipeline: wgpu::RenderPipeline,
    /// `bind_groups[i]` reads from `state[i]`.
    bind_groups: [wgpu::BindGroup; 2],
    uniform_buffer: wgpu::Buffer,
    quad_buffer: wgpu::Buffer,
    disposed: bool,
}

impl GpuGalaxy {
    /// Upload a generated store and build the simulation pipeline.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        store: &ParticleStore,
        config: GpuSimConfig,
    ) -> Self {
        let count = store.len();
        let dim = encode::texture_dim(count);
        log::debug!("gpu galaxy: {count} particles in a {dim}x{dim} state texture");

        let state = [
            StatePair {
                position: StateTarget::new(device, "Galaxy Position Texture A", dim),
                velocity: StateTarget::new(device, "Galaxy Velocity Texture A", dim),
            },
            StatePair {
                position: StateTarget::new(device, "Galaxy Position Texture B", dim),
                velocity: StateTarget::new(device, "Galaxy Velocity Texture B", dim),
            },
        ];
        let color_texture = StateTarget::new(device, "Galaxy Color Texture", dim);
        let star_grid = StateTarget::new(device, "Galaxy Star Grid Texture", GRID_DIM);

        write_texels(queue, &state[0].position.texture, dim, &encode::encode_positions(store, dim));
        write_texels(queue, &state[0].velocity.texture, dim, &encode::encode_velocities(store, dim));
        write_texels(queue, &color_texture.texture, dim, &encode::encode_colors(store, dim));
        write_texels(queue, &star_grid.texture, GRID_DIM, &build_star_grid(store));

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Galaxy Sim Uniform Buffer"),
            contents: bytemuck::cast_slice(&[sim_uniform(&config, 0.0)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let quad_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Galaxy Sim Quad Buffer"),
            contents: bytemuck::cast_slice(&FULLSCREEN_QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Galaxy Sim Bind Group Layout"),
            entries: &[
                texture_layout_entry(0),
                texture_layout_entry(1),
                texture_layout_entry(2),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let bind_groups = [0usize, 1].map(|i| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Galaxy Sim Bind Group"),
                layout: &bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&state[i].position.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&state[i].velocity.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(&star_grid.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: uniform_buffer.as_entire_binding(),
                    },
                ],
            })
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Galaxy Sim Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Galaxy Sim Shader"),
            source: wgpu::ShaderSource::Wgsl(SIM_SHADER.into()),
        });

        // Rgba32Float attachments are renderable but not blendable.
        let target = Some(wgpu::ColorTargetState {
            format: wgpu::TextureFormat::Rgba32Float,
            blend: None,
            write_mask: wgpu::ColorWrites::ALL,
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Galaxy Sim Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[FullscreenVertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[target.clone(), target],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            count,
            dim,
            config,
            colors: store.particles().iter().map(|p| p.color).collect(),
            state,
            front: 0,
            color_texture,
            star_grid,
            pipeline,
            bind_groups,
            uniform_buffer,
            quad_buffer,
            disposed: false,
        }
    }

    /// Number of particles in the session.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Side length of the square state textures.
    pub fn dim(&self) -> u32 {
        self.dim
    }

    /// Current parameters.
    pub fn config(&self) -> &GpuSimConfig {
        &self.config
    }

    /// Set the gravitational constant, clamped to [0, 2]; takes effect on
    /// the next step.
    pub fn set_gravity_strength(&mut self, strength: f32) {
        self.config.set_gravity_strength(strength);
    }

    /// Set the orbital-alignment blend rate, clamped to [0, 2]; takes
    /// effect on the next step.
    pub fn set_orbital_strength(&mut self, strength: f32) {
        self.config.set_orbital_strength(strength);
    }

    /// View of the texture holding the latest positions, for the renderer.
    pub fn position_view(&self) -> &wgpu::TextureView {
        &self.state[self.front].position.view
    }

    /// View of the static color texture.
    pub fn color_view(&self) -> &wgpu::TextureView {
        &self.color_texture.view
    }

    /// Record one simulation step into `encoder` and swap the state pairs.
    /// `dt` should already be capped by [`crate::core::FrameClock`].
    pub fn step(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        queue: &wgpu::Queue,
        dt: f32,
    ) -> Result<(), GpuError> {
        if self.disposed {
            return Err(GpuError::Disposed);
        }
        if dt <= 0.0 {
            return Ok(());
        }

        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::cast_slice(&[sim_uniform(&self.config, dt)]),
        );

        let back = 1 - self.front;
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Galaxy Sim Pass"),
                color_attachments: &[
                    attachment(&self.state[back].position.view),
                    attachment(&self.state[back].velocity.view),
                ],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_groups[self.front], &[]);
            pass.set_vertex_buffer(0, self.quad_buffer.slice(..));
            pass.draw(0..6, 0..1);
        }

        self.front = back;
        Ok(())
    }

    /// Read the latest state back to the host and build a snapshot
    /// document. Blocks until the copies complete; ambient masses become
    /// the derived density proxy since the engine does not track them.
    pub fn export_snapshot(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<SnapshotDocument, GpuError> {
        if self.disposed {
            return Err(GpuError::Disposed);
        }

        let front = &self.state[self.front];
        let position_texels = self.read_texture(device, queue, &front.position.texture)?;
        let velocity_texels = self.read_texture(device, queue, &front.velocity.texture)?;

        let (positions, star_masses) = decode_positions(&position_texels, self.count);
        let velocities = decode_velocities(&velocity_texels, self.count);

        Ok(SnapshotDocument::from_fields(
            &positions,
            &velocities,
            &self.colors,
            &star_masses,
        ))
    }

    fn read_texture(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture: &wgpu::Texture,
    ) -> Result<Vec<f32>, GpuError> {
        let unpadded = self.dim * 16;
        let bytes_per_row = unpadded.next_multiple_of(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Galaxy Readback Buffer"),
            size: (bytes_per_row * self.dim) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Galaxy Readback Encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(self.dim),
                },
            },
            wgpu::Extent3d {
                width: self.dim,
                height: self.dim,
                depth_or_array_layers: 1,
            },
        );
        queue.submit(Some(encoder.finish()));

        let slice = buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = device.poll(wgpu::Maintain::Wait);
        rx.recv().map_err(|_| GpuError::ChannelClosed)??;

        let data = slice.get_mapped_range();
        let mut texels = Vec::with_capacity((self.dim * self.dim * 4) as usize);
        for row in 0..self.dim {
            let start = (row * bytes_per_row) as usize;
            let row_bytes = &data[start..start + unpadded as usize];
            texels.extend_from_slice(bytemuck::cast_slice::<u8, f32>(row_bytes));
        }
        drop(data);
        buffer.unmap();
        Ok(texels)
    }

    /// Release every GPU resource this engine owns. Further calls to
    /// [`Self::step`] or [`Self::export_snapshot`] return
    /// [`GpuError::Disposed`]. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        for pair in &self.state {
            pair.position.texture.destroy();
            pair.velocity.texture.destroy();
        }
        self.color_texture.texture.destroy();
        self.star_grid.texture.destroy();
        self.uniform_buffer.destroy();
        self.quad_buffer.destroy();
        self.disposed = true;
        log::debug!("gpu galaxy disposed");
    }
}

fn attachment(view: &wgpu::TextureView) -> Option<wgpu::RenderPassColorAttachment<'_>> {
    Some(wgpu::RenderPassColorAttachment {
        view,
        resolve_target: None,
        ops: wgpu::Operations {
            load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
            store: wgpu::StoreOp::Store,
        },
    })
}

fn sim_uniform(config: &GpuSimConfig, dt: f32) -> SimUniform {
    SimUniform {
        force: [
            config.gravity_strength,
            config.orbital_strength,
            config.damping,
            dt,
        ],
        field: [
            INFLUENCE_RADIUS,
            GRID_DIM as f32 * INFLUENCE_RADIUS * 0.5,
            config.max_radius,
            CENTER_MASS,
        ],
    }
}

fn texture_layout_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            // Rgba32Float is read with textureLoad, never sampled.
            sample_type: wgpu::TextureSampleType::Float { filterable: false },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn write_texels(queue: &wgpu::Queue, texture: &wgpu::Texture, dim: u32, texels: &[f32]) {
    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        bytemuck::cast_slice(texels),
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(dim * 16),
            rows_per_image: Some(dim),
        },
        wgpu::Extent3d {
            width: dim,
            height: dim,
            depth_or_array_layers: 1,
        },
    );
}

const SIM_SHADER: &str = r#"
struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) uv: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
}

struct SimParams {
    // gravity strength, orbital strength, damping, dt
    force: vec4<f32>,
    // influence radius, grid half extent, max radius, center mass
    field: vec4<f32>,
}

struct SimOutput {
    @location(0) position: vec4<f32>,
    @location(1) velocity: vec4<f32>,
}

@group(0) @binding(0) var positions: texture_2d<f32>;
@group(0) @binding(1) var velocities: texture_2d<f32>;
@group(0) @binding(2) var star_grid: texture_2d<f32>;
@group(0) @binding(3) var<uniform> params: SimParams;

const MIN_DISTANCE: f32 = 0.1;
const MAX_VELOCITY: f32 = 5.0;
const MAX_CONTRIBUTORS: i32 = 3;
const CENTER_BIAS: f32 = 4.0;
const SETTLING: f32 = 0.999;
const MASS_SCALE: f32 = 1000.0;

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.position = vec4<f32>(in.position, 0.0, 1.0);
    return out;
}

fn orbital_velocity(p: vec3<f32>, g: f32, central_mass: f32) -> vec3<f32> {
    let r = max(length(p.xz), MIN_DISTANCE);
    let speed = sqrt(g * central_mass / r);
    return vec3<f32>(-p.z / r, 0.0, p.x / r) * speed;
}

@fragment
fn fs_main(in: VertexOutput) -> SimOutput {
    let texel = vec2<i32>(floor(in.position.xy));
    let p = textureLoad(positions, texel, 0);
    let v = textureLoad(velocities, texel, 0);

    var out: SimOutput;
    out.position = p;
    out.velocity = v;

    // Padding texel: pass through untouched.
    if (p.w < 0.0) {
        return out;
    }

    let g = params.force.x;
    let dt = params.force.w;
    let center_mass = params.field.w;

    if (p.w >= 1.0) {
        let mass = (p.w - 1.0) * MASS_SCALE;
        // The nucleus stays fixed at the origin.
        if (mass >= center_mass) {
            return out;
        }
        // Stars ride circular orbits and settle toward the plane.
        let r = max(length(p.xz), MIN_DISTANCE);
        let omega = sqrt(g * center_mass / r) / r;
        let theta = atan2(p.z, p.x) + omega * dt;
        let np = vec3<f32>(cos(theta) * r, p.y * SETTLING, sin(theta) * r);
        out.position = vec4<f32>(np, p.w);
        out.velocity = vec4<f32>(orbital_velocity(np, g, center_mass), v.w);
        return out;
    }

    // Ambient particle: gather star pull from the 3x3 grid neighborhood in
    // scan order, capped at MAX_CONTRIBUTORS. Each contributing star adds a
    // falloff-weighted pull and a falloff-weighted ideal orbit around
    // itself; both accumulators become weighted means before use.
    let influence = params.field.x;
    let half_extent = params.field.y;
    let grid_dim = i32(textureDimensions(star_grid).x);
    let cell = vec2<i32>(floor((p.xz + vec2<f32>(half_extent)) / influence));

    var accel = vec3<f32>(0.0);
    var orbital = vec3<f32>(0.0);
    var total_weight = 0.0;
    var contributors = 0;
    for (var dz = -1; dz <= 1; dz++) {
        for (var dx = -1; dx <= 1; dx++) {
            let c = cell + vec2<i32>(dx, dz);
            if (c.x < 0 || c.y < 0 || c.x >= grid_dim || c.y >= grid_dim) {
                continue;
            }
            if (contributors >= MAX_CONTRIBUTORS) {
                continue;
            }
            let star = textureLoad(star_grid, c, 0);
            if (star.w <= 0.0) {
                continue;
            }
            let d = star.xyz - p.xyz;
            let dist = length(d);
            if (dist <= MIN_DISTANCE || dist >= influence) {
                continue;
            }
            let weight = (1.0 - dist / influence) * (1.0 - dist / influence);
            accel += d * (g * star.w / (dist * dist * dist)) * weight;
            // Circular orbit around this star, same rotation sense as the
            // disc.
            let tangent = vec3<f32>(d.z, 0.0, -d.x) / dist;
            orbital += tangent * sqrt(g * star.w / dist) * weight;
            total_weight += weight;
            contributors++;
        }
    }

    var ideal = orbital_velocity(p.xyz, g, center_mass);
    if (total_weight > 0.0) {
        accel /= total_weight;
        ideal = orbital / total_weight;
    }

    // The nucleus pulls analytically, it is not in the grid.
    let rc = max(length(p.xyz), MIN_DISTANCE);
    accel -= p.xyz / rc * (g * center_mass * CENTER_BIAS / (rc * rc));

    let blend = min(params.force.y * dt, 1.0);
    var nv = mix(v.xyz, ideal, blend);
    nv = nv * params.force.z + accel * dt;

    let speed = length(nv);
    if (speed > MAX_VELOCITY) {
        nv *= MAX_VELOCITY / speed;
    }

    var np = p.xyz + nv * dt;
    let rr = length(np);
    if (rr > params.field.z) {
        np *= params.field.z / rr;
        nv *= 0.5;
    }

    out.position = vec4<f32>(np, 0.0);
    out.velocity = vec4<f32>(nv, v.w);
    return out;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vector3;

    /// Host-side mirror of the fragment kernel's ambient star gather:
    /// falloff-weighted pull and per-star ideal orbit, averaged by the
    /// total influence weight.
    fn gather(
        stars: &[(Vector3, f32)],
        p: Vector3,
        g: f32,
        influence: f32,
    ) -> (Vector3, Option<Vector3>) {
        let mut accel = Vector3::ZERO;
        let mut orbital = Vector3::ZERO;
        let mut total_weight = 0.0;
        for &(star, mass) in stars {
            let d = star - p;
            let dist = d.length();
            if dist <= 0.1 || dist >= influence {
                continue;
            }
            let weight = (1.0 - dist / influence) * (1.0 - dist / influence);
            accel += d * (g * mass / (dist * dist * dist)) * weight;
            let tangent = Vector3::new(d.z, 0.0, -d.x) / dist;
            orbital += tangent * (g * mass / dist).sqrt() * weight;
            total_weight += weight;
        }
        if total_weight > 0.0 {
            (accel / total_weight, Some(orbital / total_weight))
        } else {
            (accel, None)
        }
    }

    #[test]
    fn test_star_gather_is_weighted_mean() {
        let g = 6.674e-3;
        let p = Vector3::ZERO;

        // One contributor: the falloff weight cancels and the pull is the
        // plain inverse-square attraction toward the star, with the ideal
        // orbit at circular speed around it.
        let one = [(Vector3::new(1.0, 0.0, 0.0), 150.0)];
        let (accel, ideal) = gather(&one, p, g, INFLUENCE_RADIUS);
        let expected = g * 150.0;
        assert!((accel.length() - expected).abs() < expected * 1e-5);
        assert!(accel.x > 0.0);
        let speed = (g * 150.0).sqrt();
        assert!((ideal.unwrap().length() - speed).abs() < speed * 1e-5);

        // Several contributors: the mean pull never exceeds the strongest
        // individual pull.
        let many = [
            (Vector3::new(1.0, 0.0, 0.0), 150.0),
            (Vector3::new(0.0, 0.0, 2.0), 40.0),
            (Vector3::new(-1.5, 0.0, -1.5), 280.0),
        ];
        let (accel, _) = gather(&many, p, g, INFLUENCE_RADIUS);
        let strongest = many
            .iter()
            .map(|&(s, m)| {
                let dist = (s - p).length();
                g * m / (dist * dist)
            })
            .fold(0.0f32, f32::max);
        assert!(accel.length() <= strongest + 1e-6);
    }

    #[test]
    fn test_star_gather_skips_out_of_range() {
        let far = [(Vector3::new(3.0, 0.0, 0.0), 150.0)];
        let (accel, ideal) = gather(&far, Vector3::ZERO, 6.674e-3, INFLUENCE_RADIUS);
        assert_eq!(accel, Vector3::ZERO);
        assert!(ideal.is_none());
    }

    #[test]
    fn test_uniform_packs_config() {
        let config = GpuSimConfig::default();
        let u = sim_uniform(&config, 0.016);
        assert_eq!(u.force[0], config.gravity_strength);
        assert_eq!(u.force[3], 0.016);
        assert_eq!(u.field[1], GRID_DIM as f32 * INFLUENCE_RADIUS * 0.5);
        assert_eq!(u.field[3], CENTER_MASS);
    }

    #[test]
    fn test_default_config_ranges() {
        let config = GpuSimConfig::default();
        assert!(config.gravity_strength > 0.0);
        assert!(config.damping > 0.0 && config.damping <= 1.0);
        assert!(config.max_radius > 0.0);
    }

    #[test]
    fn test_strength_setters_clamp() {
        let mut config = GpuSimConfig::default();
        config.set_gravity_strength(-1.0);
        assert_eq!(config.gravity_strength, 0.0);
        config.set_gravity_strength(10.0);
        assert_eq!(config.gravity_strength, 2.0);
        config.set_orbital_strength(5.0);
        assert_eq!(config.orbital_strength, 2.0);
        config.set_orbital_strength(0.5);
        assert_eq!(config.orbital_strength, 0.5);
    }

    #[test]
    fn test_state_pairs_never_alias() {
        // The swap discipline used by `step`: read index and write index
        // differ on every frame of any sequence.
        let mut front = 0usize;
        for frame in 0..33 {
            let back = 1 - front;
            assert_ne!(front, back);
            assert_eq!(front, frame % 2);
            front = back;
        }
    }

    #[test]
    fn test_fullscreen_quad_covers_clip_space() {
        let xs: Vec<f32> = FULLSCREEN_QUAD_VERTICES.iter().map(|v| v.position[0]).collect();
        assert!(xs.contains(&-1.0) && xs.contains(&1.0));
        assert_eq!(FULLSCREEN_QUAD_VERTICES.len(), 6);
    }
}
