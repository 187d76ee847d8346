//! Rendering core for quadpaper.
//!
//! The crate glues a host-owned window, the `wgpu` pipeline, and the
//! embedded quad shaders together. The overall flow is:
//!
//! ```text
//!   quadview host
//!          │ RendererOptions
//!          ▼
//!   QuadRenderer::new ──▶ GpuContext (surface / device / queue)
//!          │
//!          ├─ initialize(w, h) ──▶ QuadProgram::link ──▶ FrameResources
//!          │                                             (quad buffers, texture, depth)
//!          └─ render_frame() ──▶ clear ▸ texture refresh ▸ draw_indexed ▸ present
//! ```
//!
//! `initialize` runs once per surface creation or resize and owns the shader
//! program lifecycle: both GLSL stages are validated through naga's
//! front-end before the pipeline is created, and the previous program is
//! dropped before a replacement is linked. `render_frame` is invoked by the
//! host once per presented frame; a missing or mis-sized texture image and
//! any reported GPU validation error are logged and the frame completes
//! best-effort (or aborts, under [`ErrorPolicy::Strict`]).

pub mod compile;
pub mod error;
pub mod geometry;
pub mod gpu;
mod renderer;
pub mod state;
pub mod texture;
pub mod types;

pub use error::{GpuError, ShaderError, TextureError};
pub use gpu::{GpuContext, QuadProgram};
pub use renderer::QuadRenderer;
pub use state::FrameState;
pub use types::{ErrorPolicy, RendererOptions, TextureSource};
