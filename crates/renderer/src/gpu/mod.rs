pub mod context;
pub mod pipeline;

pub use context::{DepthTarget, GpuContext, DEPTH_FORMAT};
pub use pipeline::QuadProgram;
