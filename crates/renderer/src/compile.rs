use wgpu::naga;
use wgpu::naga::front::glsl;
use wgpu::naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::error::ShaderError;

/// Identifies which programmable stage a source string feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStageKind {
    Vertex,
    Fragment,
}

impl ShaderStageKind {
    pub(crate) fn naga_stage(self) -> naga::ShaderStage {
        match self {
            ShaderStageKind::Vertex => naga::ShaderStage::Vertex,
            ShaderStageKind::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl std::fmt::Display for ShaderStageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStageKind::Vertex => f.write_str("vertex"),
            ShaderStageKind::Fragment => f.write_str("fragment"),
        }
    }
}

/// Pass-through vertex stage: clip-space position plus UV forwarding.
pub const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec2 aPos;
layout(location = 1) in vec2 aTexCoord;

layout(location = 0) out vec2 TexCoord;

void main() {
    gl_Position = vec4(aPos.x, aPos.y, 0.0, 1.0);
    TexCoord = vec2(aTexCoord.x, aTexCoord.y);
}
";

/// Single-texture-sample fragment stage. The texture and its sampler are
/// bound explicitly at set 0, bindings 0 and 1.
pub const FRAGMENT_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec2 TexCoord;
layout(location = 0) out vec4 FragColor;

layout(set = 0, binding = 0) uniform texture2D ourTexture;
layout(set = 0, binding = 1) uniform sampler ourSampler;

void main() {
    FragColor = texture(sampler2D(ourTexture, ourSampler), TexCoord);
}
";

/// A named vertex input together with its `layout(location = N)` binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedAttribute {
    pub name: String,
    pub location: u32,
}

/// Parses and validates one shader stage, returning the naga module.
///
/// The front-end run is pure CPU work, so compile failures can be observed
/// without a GPU; the rendered diagnostic doubles as the compiler log carried
/// by [`ShaderError::Compile`].
pub fn compile_stage(stage: ShaderStageKind, source: &str) -> Result<naga::Module, ShaderError> {
    if source.trim().is_empty() {
        return Err(ShaderError::EmptySource { stage });
    }

    let mut frontend = glsl::Frontend::default();
    let options = glsl::Options::from(stage.naga_stage());
    let module = frontend
        .parse(&options, source)
        .map_err(|errors| ShaderError::Compile {
            stage,
            log: errors.emit_to_string(source),
        })?;

    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|error| ShaderError::Compile {
            stage,
            log: error.emit_to_string(source),
        })?;

    Ok(module)
}

/// Compiles a vertex/fragment source pair.
///
/// The vertex stage compiles first; a failure there short-circuits before the
/// fragment stage is touched.
pub fn compile_pair(
    vertex_src: &str,
    fragment_src: &str,
) -> Result<(naga::Module, naga::Module), ShaderError> {
    let vertex = compile_stage(ShaderStageKind::Vertex, vertex_src)?;
    let fragment = compile_stage(ShaderStageKind::Fragment, fragment_src)?;
    Ok((vertex, fragment))
}

/// Collects the vertex entry point's named inputs and their locations.
pub fn reflect_attributes(module: &naga::Module) -> Vec<NamedAttribute> {
    let Some(entry) = module
        .entry_points
        .iter()
        .find(|entry| entry.stage == naga::ShaderStage::Vertex)
    else {
        return Vec::new();
    };

    entry
        .function
        .arguments
        .iter()
        .filter_map(|argument| {
            let name = argument.name.clone()?;
            match &argument.binding {
                Some(naga::Binding::Location { location, .. }) => Some(NamedAttribute {
                    name,
                    location: *location,
                }),
                _ => None,
            }
        })
        .collect()
}

/// Looks up a named vertex input's location.
pub fn attribute_location(module: &naga::Module, name: &str) -> Option<u32> {
    reflect_attributes(module)
        .into_iter()
        .find(|attribute| attribute.name == name)
        .map(|attribute| attribute.location)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_sources_compile() {
        compile_stage(ShaderStageKind::Vertex, VERTEX_SHADER_GLSL).expect("vertex stage");
        compile_stage(ShaderStageKind::Fragment, FRAGMENT_SHADER_GLSL).expect("fragment stage");
    }

    #[test]
    fn vertex_inputs_reflect_by_name() {
        let module =
            compile_stage(ShaderStageKind::Vertex, VERTEX_SHADER_GLSL).expect("vertex stage");
        assert_eq!(attribute_location(&module, "aPos"), Some(0));
        assert_eq!(attribute_location(&module, "aTexCoord"), Some(1));
        assert_eq!(attribute_location(&module, "aNormal"), None);
    }

    #[test]
    fn missing_brace_is_a_compile_error() {
        let broken = FRAGMENT_SHADER_GLSL.trim_end().trim_end_matches('}');
        let err = compile_stage(ShaderStageKind::Fragment, broken).unwrap_err();
        match err {
            ShaderError::Compile { stage, log } => {
                assert_eq!(stage, ShaderStageKind::Fragment);
                assert!(!log.is_empty());
            }
            other => panic!("expected a compile error, got {other:?}"),
        }
    }

    #[test]
    fn empty_source_is_rejected_before_parsing() {
        let err = compile_stage(ShaderStageKind::Vertex, "   \n").unwrap_err();
        assert!(matches!(
            err,
            ShaderError::EmptySource {
                stage: ShaderStageKind::Vertex
            }
        ));
    }

    #[test]
    fn vertex_failure_short_circuits_the_fragment_stage() {
        let err = compile_pair("void broken(", "also broken {").unwrap_err();
        match err {
            ShaderError::Compile { stage, .. } => assert_eq!(stage, ShaderStageKind::Vertex),
            other => panic!("expected a vertex compile error, got {other:?}"),
        }
    }
}
