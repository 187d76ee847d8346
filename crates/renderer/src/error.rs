use std::path::PathBuf;

use thiserror::Error;

use crate::compile::ShaderStageKind;

/// Failures raised while compiling or linking the shader program.
///
/// None of these are fatal to the process: surface initialization reports
/// them and returns failure, and the host decides what to do next.
#[derive(Debug, Error)]
pub enum ShaderError {
    /// The source text for a stage was empty or whitespace-only.
    #[error("{stage} shader source is empty")]
    EmptySource { stage: ShaderStageKind },
    /// The compiler rejected one stage; `log` carries the full diagnostic.
    #[error("could not compile {stage} shader:\n{log}")]
    Compile { stage: ShaderStageKind, log: String },
    /// Pipeline creation reported a validation error after both stages
    /// compiled.
    #[error("could not link program:\n{log}")]
    Link { log: String },
}

/// Failures raised while sourcing the quad's texture image.
///
/// These are logged once per frame and swallowed; the draw proceeds with
/// whatever the cached texture currently holds.
#[derive(Debug, Error)]
pub enum TextureError {
    /// The image file could not be read at all.
    #[error("failed to open texture at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file was readable but the decoder rejected it.
    #[error("failed to decode texture at {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    /// The decoded image does not measure what the configuration promised.
    #[error(
        "texture at {path} is {actual_width}x{actual_height}, \
         expected {expected_width}x{expected_height}"
    )]
    DimensionMismatch {
        path: PathBuf,
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },
}

/// A GPU operation reported a validation error after completing.
#[derive(Debug, Error)]
#[error("GPU error after {op}: {message}")]
pub struct GpuError {
    /// Name of the operation the error scope wrapped.
    pub op: &'static str,
    /// Message reported by the backend.
    pub message: String,
}
