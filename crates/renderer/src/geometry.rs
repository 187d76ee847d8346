use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

/// One interleaved quad vertex: clip-space position plus texture coordinate.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub tex_coord: [f32; 2],
}

/// The fixed quad: four corners with image-space UVs.
pub const QUAD_VERTICES: [Vertex; 4] = [
    Vertex {
        position: [0.5, 0.5],
        tex_coord: [1.0, 0.0],
    }, // top right
    Vertex {
        position: [0.5, -0.5],
        tex_coord: [1.0, 1.0],
    }, // bottom right
    Vertex {
        position: [-0.5, -0.5],
        tex_coord: [0.0, 1.0],
    }, // bottom left
    Vertex {
        position: [-0.5, 0.5],
        tex_coord: [0.0, 0.0],
    }, // top left
];

/// Two triangles covering the quad.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

impl Vertex {
    /// Buffer layout matching the interleaved position/UV data.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// GPU-resident quad buffers, uploaded once and reused every frame.
pub struct QuadGeometry {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl QuadGeometry {
    pub fn new(device: &wgpu::Device) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad vertices"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad indices"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: QUAD_INDICES.len() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_holds_four_vertices_and_six_indices() {
        assert_eq!(QUAD_VERTICES.len(), 4);
        assert_eq!(
            std::mem::size_of_val(&QUAD_VERTICES),
            16 * std::mem::size_of::<f32>()
        );
        assert_eq!(QUAD_INDICES, [0, 1, 3, 1, 2, 3]);
    }

    #[test]
    fn interleaved_layout_matches_attribute_bindings() {
        let layout = Vertex::layout();
        assert_eq!(layout.array_stride, 16);
        assert_eq!(layout.attributes.len(), 2);
        assert_eq!(layout.attributes[0].shader_location, 0);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[1].shader_location, 1);
        assert_eq!(layout.attributes[1].offset, 8);
    }

    #[test]
    fn attributes_decode_back_to_position_uv_pairs() {
        let bytes: &[u8] = bytemuck::cast_slice(&QUAD_VERTICES);
        for (index, vertex) in QUAD_VERTICES.iter().enumerate() {
            let base = index * 16;
            let position: [f32; 2] = bytemuck::pod_read_unaligned(&bytes[base..base + 8]);
            let uv: [f32; 2] = bytemuck::pod_read_unaligned(&bytes[base + 8..base + 16]);
            assert_eq!(position, vertex.position);
            assert_eq!(uv, vertex.tex_coord);
        }
    }
}
