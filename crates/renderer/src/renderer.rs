use anyhow::Result;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::dpi::PhysicalSize;

use crate::compile::{FRAGMENT_SHADER_GLSL, VERTEX_SHADER_GLSL};
use crate::error::GpuError;
use crate::geometry::QuadGeometry;
use crate::gpu::{DepthTarget, GpuContext, QuadProgram};
use crate::state::FrameState;
use crate::texture::{self, QuadTexture};
use crate::types::{ErrorPolicy, RendererOptions};

/// GPU resources built once per successful `initialize` and reused by every
/// frame thereafter.
struct FrameResources {
    geometry: QuadGeometry,
    texture: QuadTexture,
    texture_bind_group: wgpu::BindGroup,
    depth: DepthTarget,
}

/// Pixel rectangle recorded by `initialize` and applied before each draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Viewport {
    width: u32,
    height: u32,
}

/// Renders the textured quad into a host-owned surface.
///
/// The host calls [`QuadRenderer::initialize`] once per surface creation or
/// resize, then [`QuadRenderer::render_frame`] once per presented frame.
/// `render_frame` never panics on degraded input; missing images and
/// reported GPU errors are logged and the frame completes best-effort unless
/// [`ErrorPolicy::Strict`] was configured.
pub struct QuadRenderer {
    ctx: GpuContext,
    options: RendererOptions,
    program: Option<QuadProgram>,
    resources: Option<FrameResources>,
    viewport: Option<Viewport>,
    state: FrameState,
}

impl QuadRenderer {
    /// Builds the rendering context for the host's window. No shader or
    /// frame resources exist until [`QuadRenderer::initialize`] runs.
    pub fn new<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        options: RendererOptions,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let ctx = GpuContext::new(target, initial_size)?;

        Ok(Self {
            ctx,
            options,
            program: None,
            resources: None,
            viewport: None,
            state: FrameState::new(),
        })
    }

    /// One-time surface setup: adapter diagnostics, program link, attribute
    /// resolution, viewport, and the frame resource cache.
    ///
    /// Returns `false` if the program could not be linked or the position
    /// attribute did not resolve; in that case the surface is not
    /// reconfigured and no viewport is recorded. Re-invoking on resize drops
    /// the previous program and resources before building replacements.
    pub fn initialize(&mut self, width: u32, height: u32) -> bool {
        self.ctx.log_diagnostics();
        tracing::info!(width, height, "initializing surface");

        let program = match QuadProgram::link(
            &self.ctx.device,
            self.ctx.surface_format,
            VERTEX_SHADER_GLSL,
            FRAGMENT_SHADER_GLSL,
        ) {
            Ok(program) => program,
            Err(error) => {
                tracing::error!(%error, "could not create program");
                return false;
            }
        };

        let Some(position_location) = program.attribute_location("aPos") else {
            tracing::error!("vertex stage does not declare an aPos input");
            return false;
        };
        tracing::info!(position_location, "resolved position attribute");

        self.program = None;
        self.resources = None;

        self.ctx.resize(PhysicalSize::new(width, height));
        self.viewport = Some(Viewport {
            width: self.ctx.size.width,
            height: self.ctx.size.height,
        });

        let (texture_width, texture_height) = self.options.texture.expected_size;
        let build = self.checked("build frame resources", || {
            let geometry = QuadGeometry::new(&self.ctx.device);
            let quad_texture = QuadTexture::new(&self.ctx.device, texture_width, texture_height);
            let texture_bind_group = self.ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("quad texture bind group"),
                layout: &program.texture_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&quad_texture.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&quad_texture.sampler),
                    },
                ],
            });
            let depth = DepthTarget::new(&self.ctx.device, self.ctx.size);

            FrameResources {
                geometry,
                texture: quad_texture,
                texture_bind_group,
                depth,
            }
        });

        match build {
            Ok(resources) => {
                self.resources = Some(resources);
                self.program = Some(program);
                true
            }
            Err(error) => {
                tracing::error!(%error, "could not build frame resources");
                self.viewport = None;
                false
            }
        }
    }

    /// Renders one frame: advance the background, refresh the texture image,
    /// and issue the indexed draw. Side effects only; failures are logged.
    pub fn render_frame(&mut self) {
        if let Err(error) = self.render_frame_inner() {
            tracing::debug!(op = error.op, "frame aborted under strict error policy");
        }
    }

    fn render_frame_inner(&mut self) -> Result<(), GpuError> {
        let Some(viewport) = self.viewport else {
            tracing::warn!("render_frame called before surface initialization");
            return Ok(());
        };

        let intensity = self.state.advance();

        let (Some(program), Some(resources)) = (self.program.as_ref(), self.resources.as_ref())
        else {
            tracing::warn!("render_frame called before surface initialization");
            return Ok(());
        };

        // The cached texture object is reused; only pixels move per frame.
        match texture::load_image(&self.options.texture) {
            Ok(image) => {
                self.step("write_texture", || {
                    resources.texture.upload(&self.ctx.queue, &image)
                })?;
            }
            Err(error) => {
                tracing::error!(%error, "failed to load texture");
            }
        }

        let frame = match self.ctx.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::warn!("surface lost or outdated; reconfiguring");
                self.ctx.surface.configure(&self.ctx.device, &self.ctx.config);
                return Ok(());
            }
            Err(error) => {
                tracing::error!(%error, "could not acquire surface frame");
                return Ok(());
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("quad pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: intensity as f64,
                            g: intensity as f64,
                            b: intensity as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &resources.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(&program.pipeline);
            pass.set_bind_group(0, &resources.texture_bind_group, &[]);
            pass.set_viewport(
                0.0,
                0.0,
                viewport.width as f32,
                viewport.height as f32,
                0.0,
                1.0,
            );
            pass.set_vertex_buffer(0, resources.geometry.vertex_buffer.slice(..));
            pass.set_index_buffer(
                resources.geometry.index_buffer.slice(..),
                wgpu::IndexFormat::Uint32,
            );
            pass.draw_indexed(0..resources.geometry.index_count, 0, 0..1);
        }

        self.step("draw_indexed", || {
            self.ctx.queue.submit(std::iter::once(encoder.finish()))
        })?;
        frame.present();
        tracing::trace!(intensity, "presented frame");

        Ok(())
    }

    /// Runs one GPU operation inside a validation error scope so a reported
    /// error can be attributed to the operation by name.
    fn checked<T>(&self, op: &'static str, f: impl FnOnce() -> T) -> Result<T, GpuError> {
        self.ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = f();
        match pollster::block_on(self.ctx.device.pop_error_scope()) {
            None => Ok(value),
            Some(error) => Err(GpuError {
                op,
                message: error.to_string(),
            }),
        }
    }

    /// Checked operation with the configured policy applied: best-effort
    /// logs and continues, strict aborts the frame.
    fn step<T>(&self, op: &'static str, f: impl FnOnce() -> T) -> Result<Option<T>, GpuError> {
        match self.checked(op, f) {
            Ok(value) => Ok(Some(value)),
            Err(error) => {
                tracing::error!(op = error.op, message = %error.message, "GPU error");
                match self.options.policy {
                    ErrorPolicy::BestEffort => Ok(None),
                    ErrorPolicy::Strict => Err(error),
                }
            }
        }
    }

    /// Background intensity after the most recent frame.
    pub fn background_intensity(&self) -> f32 {
        self.state.intensity()
    }
}
