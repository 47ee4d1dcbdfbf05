//! WebGPU backend
//!
//! Draw lists are tessellated into play-field pixel coordinates on the CPU.
//! A small uniform carries the letterbox transform to the vertex shader, so
//! a resize only rewrites 16 bytes.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use super::Renderer;
use super::draw::DrawList;
use super::shapes;
use super::vertex::Vertex;
use crate::assets::SpriteSheet;
use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Vertices the buffer starts with; it doubles when a frame needs more
const INITIAL_VERTEX_CAPACITY: u64 = 16 * 1024;

/// Maps play-field pixels to clip space: `ndc = pos * scale + offset`
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Viewport {
    pub scale: [f32; 2],
    pub offset: [f32; 2],
}

impl Viewport {
    /// Fit the 4:3 field into a `width` x `height` surface, centered, y flipped
    pub fn fit(width: f32, height: f32) -> Self {
        let s = (width / SCREEN_WIDTH).min(height / SCREEN_HEIGHT);
        let sx = 2.0 * s / width;
        let sy = 2.0 * s / height;
        Self {
            scale: [sx, -sy],
            offset: [-SCREEN_WIDTH / 2.0 * sx, SCREEN_HEIGHT / 2.0 * sy],
        }
    }

    pub fn apply(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x * self.scale[0] + self.offset[0],
            p.y * self.scale[1] + self.offset[1],
        )
    }
}

/// GPU objects for the single flat-color pipeline
pub struct RenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    viewport_buffer: wgpu::Buffer,
    viewport_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    /// Vertices the current buffer holds
    vertex_capacity: u64,
    /// Surface size in pixels
    pub size: (u32, u32),
}

impl RenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Self {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("night-flap-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await
            .expect("Failed to create device");

        // Colors are authored in sRGB and converted to linear on the CPU
        let caps = surface.get_capabilities(adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(wgpu::TextureFormat::is_srgb)
            .unwrap_or(caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let viewport = Viewport::fit(config.width as f32, config.height as f32);
        let viewport_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("viewport"),
            size: std::mem::size_of::<Viewport>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&viewport_buffer, 0, bytemuck::bytes_of(&viewport));

        let viewport_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("viewport_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let viewport_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("viewport_bind_group"),
            layout: &viewport_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("flat_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("flat_layout"),
            bind_group_layouts: &[&viewport_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("flat_pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // Tessellated shapes mix windings
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let vertex_buffer = Self::create_vertex_buffer(&device, INITIAL_VERTEX_CAPACITY);

        Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            viewport_buffer,
            viewport_bind_group,
            vertex_buffer,
            vertex_capacity: INITIAL_VERTEX_CAPACITY,
            size: (width, height),
        }
    }

    fn create_vertex_buffer(device: &wgpu::Device, capacity: u64) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("vertices"),
            size: capacity * std::mem::size_of::<Vertex>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width == 0 || new_height == 0 {
            return;
        }
        self.size = (new_width, new_height);
        self.config.width = new_width;
        self.config.height = new_height;
        self.surface.configure(&self.device, &self.config);

        let viewport = Viewport::fit(new_width as f32, new_height as f32);
        self.queue
            .write_buffer(&self.viewport_buffer, 0, bytemuck::bytes_of(&viewport));
    }

    /// Upload `vertices` (play-field pixels) and draw them in one pass
    pub fn render(&mut self, vertices: &[Vertex]) -> Result<(), wgpu::SurfaceError> {
        let needed = vertices.len() as u64;
        if needed > self.vertex_capacity {
            let capacity = needed.next_power_of_two();
            log::debug!("Growing vertex buffer to {capacity} vertices");
            self.vertex_buffer = Self::create_vertex_buffer(&self.device, capacity);
            self.vertex_capacity = capacity;
        }
        if !vertices.is_empty() {
            self.queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(vertices));
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("frame_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        // Letterbox bars
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if needed > 0 {
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(0, &self.viewport_bind_group, &[]);
                let bytes = needed * std::mem::size_of::<Vertex>() as u64;
                pass.set_vertex_buffer(0, self.vertex_buffer.slice(..bytes));
                pass.draw(0..needed as u32, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

/// GPU-backed renderer: tessellates each draw list and submits it
pub struct GpuRenderer {
    pub state: RenderState,
    sprites: SpriteSheet,
    scratch: Vec<Vertex>,
}

impl GpuRenderer {
    pub fn new(state: RenderState, sprites: SpriteSheet) -> Self {
        Self {
            state,
            sprites,
            scratch: Vec::new(),
        }
    }
}

impl Renderer for GpuRenderer {
    fn present(&mut self, frame: &DrawList) {
        self.scratch.clear();
        shapes::tessellate(frame, &self.sprites, &mut self.scratch);

        match self.state.render(&self.scratch) {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Lost) => {
                let (w, h) = self.state.size;
                self.state.resize(w, h);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of memory!");
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    #[test]
    fn test_field_center_maps_to_origin() {
        let vp = Viewport::fit(1024.0, 768.0);
        assert!(close(vp.apply(Vec2::new(400.0, 300.0)), Vec2::ZERO));
    }

    #[test]
    fn test_matching_aspect_fills_surface() {
        let vp = Viewport::fit(800.0, 600.0);
        assert!(close(vp.apply(Vec2::ZERO), Vec2::new(-1.0, 1.0)));
        assert!(close(vp.apply(Vec2::new(800.0, 600.0)), Vec2::new(1.0, -1.0)));
    }

    #[test]
    fn test_wide_surface_letterboxes_horizontally() {
        // 1600x600: field keeps scale 1 and sits in the middle half
        let vp = Viewport::fit(1600.0, 600.0);
        assert!(close(vp.apply(Vec2::ZERO), Vec2::new(-0.5, 1.0)));
        assert!(close(vp.apply(Vec2::new(800.0, 600.0)), Vec2::new(0.5, -1.0)));
    }

    #[test]
    fn test_uniform_is_sixteen_bytes() {
        assert_eq!(std::mem::size_of::<Viewport>(), 16);
    }
}
