use std::borrow::Cow;

use wgpu::naga::ShaderStage;

use crate::compile::{self, NamedAttribute};
use crate::error::ShaderError;
use crate::geometry::Vertex;

use super::context::DEPTH_FORMAT;

/// A linked quad program: the render pipeline plus the bind-group layout and
/// reflection data resolved at link time.
///
/// Exists only if both stages compiled and pipeline creation reported no
/// validation error. Dropping it frees the pipeline, so rebuilding on
/// re-initialization cannot leak the previous program.
pub struct QuadProgram {
    pub pipeline: wgpu::RenderPipeline,
    pub texture_layout: wgpu::BindGroupLayout,
    attributes: Vec<NamedAttribute>,
}

impl QuadProgram {
    /// Compiles both stages and links them into a render pipeline.
    ///
    /// The vertex stage compiles first and short-circuits on failure; the
    /// fragment stage is never touched in that case. Any validation error
    /// reported while the pipeline is created surfaces as
    /// [`ShaderError::Link`]. The intermediate shader modules are dropped on
    /// return regardless of outcome.
    pub fn link(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<Self, ShaderError> {
        let (vertex_module, _fragment_module) = compile::compile_pair(vertex_src, fragment_src)?;
        let attributes = compile::reflect_attributes(&vertex_module);

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let vertex_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("quad vertex"),
            source: wgpu::ShaderSource::Glsl {
                shader: Cow::Borrowed(vertex_src),
                stage: ShaderStage::Vertex,
                defines: &[],
            },
        });
        let fragment_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("quad fragment"),
            source: wgpu::ShaderSource::Glsl {
                shader: Cow::Borrowed(fragment_src),
                stage: ShaderStage::Fragment,
                defines: &[],
            },
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("quad texture layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("quad pipeline layout"),
            bind_group_layouts: &[&texture_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("quad pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_shader,
                entry_point: Some("main"),
                buffers: &[Vertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_shader,
                entry_point: Some("main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview: None,
            cache: None,
        });

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(ShaderError::Link {
                log: error.to_string(),
            });
        }

        Ok(Self {
            pipeline,
            texture_layout,
            attributes,
        })
    }

    /// Looks up a named vertex input's location from the reflection data.
    pub fn attribute_location(&self, name: &str) -> Option<u32> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name == name)
            .map(|attribute| attribute.location)
    }
}
