pub mod pipeline;

use std::sync::Arc;

use image::RgbaImage;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::color::PackedColor;
use crate::atlas::GlyphRegion;
use crate::grid::{GlyphBatch, Grid};

use pipeline::{TilePipeline, TileVertex, create_tile_pipeline, orthographic_projection};

// ── QuadBatch ─────────────────────────────────────────────────────────────────

/// Vertex-collecting [`GlyphBatch`] for the wgpu renderer.
///
/// Quads accumulate into two streams: background fills (drawn first, against
/// the white tile texture) and glyph regions (drawn on top, against the atlas
/// texture).  Cells never overlap, so splitting the per-cell interleaving
/// into two passes preserves the background-under-glyph order.
pub struct QuadBatch {
    fill_vertices: Vec<TileVertex>,
    glyph_vertices: Vec<TileVertex>,
    color: [f32; 4],
}

impl QuadBatch {
    pub fn new() -> Self {
        Self {
            fill_vertices: Vec::new(),
            glyph_vertices: Vec::new(),
            color: PackedColor::WHITE.to_array(),
        }
    }

    /// Drop all collected quads, keeping the allocations for the next frame.
    pub fn clear(&mut self) {
        self.fill_vertices.clear();
        self.glyph_vertices.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.fill_vertices.is_empty() && self.glyph_vertices.is_empty()
    }

    pub fn fill_vertices(&self) -> &[TileVertex] {
        &self.fill_vertices
    }

    pub fn glyph_vertices(&self) -> &[TileVertex] {
        &self.glyph_vertices
    }
}

impl Default for QuadBatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Two counter-clockwise triangles (Y-down): TL-BL-TR, TR-BL-BR.
fn push_quad(
    vertices: &mut Vec<TileVertex>,
    uv_tl: [f32; 2],
    uv_br: [f32; 2],
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    color: [f32; 4],
) {
    let tl = TileVertex { position: [x,     y    ], uv: uv_tl,              color };
    let tr = TileVertex { position: [x + w, y    ], uv: [uv_br[0], uv_tl[1]], color };
    let bl = TileVertex { position: [x,     y + h], uv: [uv_tl[0], uv_br[1]], color };
    let br = TileVertex { position: [x + w, y + h], uv: uv_br,              color };
    vertices.extend_from_slice(&[tl, bl, tr, tr, bl, br]);
}

impl GlyphBatch for QuadBatch {
    fn set_color(&mut self, color: PackedColor) {
        self.color = color.to_array();
    }

    fn draw_fill(&mut self, x: f32, y: f32, w: f32, h: f32) {
        push_quad(
            &mut self.fill_vertices,
            [0.0, 0.0],
            [1.0, 1.0],
            x,
            y,
            w,
            h,
            self.color,
        );
    }

    fn draw_region(&mut self, region: GlyphRegion, x: f32, y: f32, w: f32, h: f32) {
        push_quad(
            &mut self.glyph_vertices,
            region.uv_tl,
            region.uv_br,
            x,
            y,
            w,
            h,
            self.color,
        );
    }
}

// ── Renderer ──────────────────────────────────────────────────────────────────

/// wgpu surface renderer for one grid's textures.
///
/// Binds the grid's atlas image and white background tile as textures at
/// creation; per frame it uploads the batch's vertex streams and draws all
/// fills, then all glyphs.
pub struct Renderer {
    pub window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: TilePipeline,
    projection_buffer: wgpu::Buffer,
    projection_bind_group: wgpu::BindGroup,
    /// White background tile (fill pass).
    fill_bind_group: wgpu::BindGroup,
    /// Glyph atlas (glyph pass).
    atlas_bind_group: wgpu::BindGroup,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, grid: &Grid) -> Self {
        let size = window.inner_size();

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(Arc::clone(&window)).unwrap();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                compatible_surface: Some(&surface),
                ..Default::default()
            })
            .await
            .expect("no suitable GPU adapter found");
        log::debug!("using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .expect("failed to create device");

        let caps = surface.get_capabilities(&adapter);
        let format = caps.formats[0];

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let pipeline = create_tile_pipeline(&device, format);

        let proj = orthographic_projection(config.width as f32, config.height as f32);
        let projection_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("projection_buffer"),
            contents: bytemuck::cast_slice(&proj),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let projection_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("projection_bg"),
            layout: &pipeline.projection_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: projection_buffer.as_entire_binding(),
            }],
        });

        let fill_bind_group = texture_bind_group(
            &device,
            &queue,
            &pipeline.texture_bind_group_layout,
            grid.background_tile(),
            "background_tile",
        );
        let atlas_bind_group = texture_bind_group(
            &device,
            &queue,
            &pipeline.texture_bind_group_layout,
            grid.atlas().image(),
            "glyph_atlas",
        );

        Self {
            window,
            surface,
            device,
            queue,
            config,
            pipeline,
            projection_buffer,
            projection_bind_group,
            fill_bind_group,
            atlas_bind_group,
        }
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);

        let proj = orthographic_projection(new_size.width as f32, new_size.height as f32);
        self.queue
            .write_buffer(&self.projection_buffer, 0, bytemuck::cast_slice(&proj));
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Render one frame from the batch's collected quads.
    ///
    /// Draw order within the single render pass: every background fill quad
    /// (white tile texture), then every glyph quad (atlas texture).
    pub fn render(&mut self, batch: &QuadBatch) -> Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: None,
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            pass.set_pipeline(&self.pipeline.render_pipeline);
            pass.set_bind_group(0, &self.projection_bind_group, &[]);

            if !batch.fill_vertices.is_empty() {
                let vbuf = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("fill_vertex_buffer"),
                    contents: bytemuck::cast_slice(&batch.fill_vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                pass.set_bind_group(1, &self.fill_bind_group, &[]);
                pass.set_vertex_buffer(0, vbuf.slice(..));
                pass.draw(0..batch.fill_vertices.len() as u32, 0..1);
            }

            if !batch.glyph_vertices.is_empty() {
                let vbuf = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("glyph_vertex_buffer"),
                    contents: bytemuck::cast_slice(&batch.glyph_vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                pass.set_bind_group(1, &self.atlas_bind_group, &[]);
                pass.set_vertex_buffer(0, vbuf.slice(..));
                pass.draw(0..batch.glyph_vertices.len() as u32, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn texture_bind_group(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    img: &RgbaImage,
    label: &str,
) -> wgpu::BindGroup {
    let (w, h) = img.dimensions();
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d { width: w, height: h, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        img.as_raw(),
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        mag_filter: wgpu::FilterMode::Nearest,
        min_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    });

    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&sampler),
            },
        ],
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn region() -> GlyphRegion {
        GlyphRegion {
            x: 8,
            y: 0,
            width: 8,
            height: 8,
            uv_tl: [0.25, 0.0],
            uv_br: [0.5, 0.25],
        }
    }

    #[test]
    fn fill_quad_emits_six_vertices() {
        let mut batch = QuadBatch::new();
        batch.draw_fill(0.0, 0.0, 16.0, 16.0);
        assert_eq!(batch.fill_vertices().len(), 6);
        assert!(batch.glyph_vertices().is_empty());
    }

    #[test]
    fn region_quad_lands_in_the_glyph_stream() {
        let mut batch = QuadBatch::new();
        batch.draw_region(region(), 0.0, 0.0, 16.0, 16.0);
        assert!(batch.fill_vertices().is_empty());
        assert_eq!(batch.glyph_vertices().len(), 6);
    }

    #[test]
    fn quad_corners_cover_the_rect() {
        let mut batch = QuadBatch::new();
        batch.draw_fill(8.0, 24.0, 16.0, 32.0);
        let xs: Vec<f32> = batch.fill_vertices().iter().map(|v| v.position[0]).collect();
        let ys: Vec<f32> = batch.fill_vertices().iter().map(|v| v.position[1]).collect();
        assert!(xs.contains(&8.0) && xs.contains(&24.0));
        assert!(ys.contains(&24.0) && ys.contains(&56.0));
    }

    #[test]
    fn region_uvs_flow_into_vertices() {
        let mut batch = QuadBatch::new();
        let r = region();
        batch.draw_region(r, 0.0, 0.0, 16.0, 16.0);
        let first = batch.glyph_vertices()[0];
        let last = batch.glyph_vertices()[5];
        assert_eq!(first.uv, r.uv_tl);
        assert_eq!(last.uv, r.uv_br);
    }

    #[test]
    fn tint_applies_to_subsequent_quads_only() {
        let mut batch = QuadBatch::new();
        batch.draw_fill(0.0, 0.0, 1.0, 1.0);
        batch.set_color(Color::RED.pack());
        batch.draw_fill(0.0, 0.0, 1.0, 1.0);
        assert_eq!(batch.fill_vertices()[0].color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(batch.fill_vertices()[6].color, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn clear_keeps_current_tint() {
        let mut batch = QuadBatch::new();
        batch.set_color(Color::GREEN.pack());
        batch.draw_fill(0.0, 0.0, 1.0, 1.0);
        batch.clear();
        assert!(batch.is_empty());
        batch.draw_fill(0.0, 0.0, 1.0, 1.0);
        assert_eq!(batch.fill_vertices()[0].color, [0.0, 1.0, 0.0, 1.0]);
    }
}
