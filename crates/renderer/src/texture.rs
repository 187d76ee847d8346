use std::path::Path;

use image::imageops::FilterType;
use image::RgbaImage;

use crate::error::TextureError;
use crate::types::TextureSource;

/// Decoded RGB8 pixel buffer with explicit dimensions, dense row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Decodes the configured image and validates its dimensions.
///
/// The decoded size must match [`TextureSource::expected_size`] exactly;
/// anything else is reported as a mismatch rather than uploaded blind.
pub fn load_image(source: &TextureSource) -> Result<TextureImage, TextureError> {
    let decoded = image::open(&source.path).map_err(|error| classify(&source.path, error))?;
    let rgb = decoded.to_rgb8();

    let (expected_width, expected_height) = source.expected_size;
    if rgb.width() != expected_width || rgb.height() != expected_height {
        return Err(TextureError::DimensionMismatch {
            path: source.path.clone(),
            expected_width,
            expected_height,
            actual_width: rgb.width(),
            actual_height: rgb.height(),
        });
    }

    Ok(TextureImage {
        width: rgb.width(),
        height: rgb.height(),
        pixels: rgb.into_raw(),
    })
}

fn classify(path: &Path, error: image::ImageError) -> TextureError {
    match error {
        image::ImageError::IoError(source) => TextureError::Open {
            path: path.to_path_buf(),
            source,
        },
        other => TextureError::Decode {
            path: path.to_path_buf(),
            source: other,
        },
    }
}

/// Number of mip levels needed to reach 1x1 from the given base size.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Expands tightly packed RGB8 rows into RGBA8 with opaque alpha.
pub fn expand_to_rgba(image: &TextureImage) -> RgbaImage {
    let mut rgba = Vec::with_capacity(image.pixels.len() / 3 * 4);
    for rgb in image.pixels.chunks_exact(3) {
        rgba.extend_from_slice(rgb);
        rgba.push(u8::MAX);
    }
    RgbaImage::from_raw(image.width, image.height, rgba)
        .expect("pixel buffer length matches the declared dimensions")
}

/// Builds the full mip chain, base level included, halving each step.
pub fn build_mip_chain(base: RgbaImage) -> Vec<RgbaImage> {
    let levels = mip_level_count(base.width(), base.height());
    let mut chain = Vec::with_capacity(levels as usize);
    chain.push(base);
    for _ in 1..levels {
        let previous = chain.last().expect("chain starts with the base level");
        let width = (previous.width() / 2).max(1);
        let height = (previous.height() / 2).max(1);
        chain.push(image::imageops::resize(
            previous,
            width,
            height,
            FilterType::Triangle,
        ));
    }
    chain
}

/// GPU texture and sampler for the quad, allocated once with a full mip
/// chain and refreshed in place on later frames.
pub struct QuadTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    size: (u32, u32),
}

impl QuadTexture {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("quad texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: mip_level_count(width, height),
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("quad sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            size: (width, height),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Uploads the decoded image and every derived mip level.
    pub fn upload(&self, queue: &wgpu::Queue, image: &TextureImage) {
        let chain = build_mip_chain(expand_to_rgba(image));
        for (level, mip) in chain.iter().enumerate() {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &self.texture,
                    mip_level: level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                mip.as_raw(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(mip.width() * 4),
                    rows_per_image: Some(mip.height()),
                },
                wgpu::Extent3d {
                    width: mip.width(),
                    height: mip.height(),
                    depth_or_array_layers: 1,
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::types::TextureSource;

    fn checker(width: u32, height: u32) -> TextureImage {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let value = if (x + y) % 2 == 0 { 255 } else { 0 };
                pixels.extend_from_slice(&[value, 0, 255 - value]);
            }
        }
        TextureImage {
            width,
            height,
            pixels,
        }
    }

    fn temp_image(name: &str, width: u32, height: u32) -> PathBuf {
        let dir = std::env::temp_dir().join("quadpaper-texture-tests");
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join(name);
        image::RgbImage::new(width, height)
            .save(&path)
            .expect("write probe image");
        path
    }

    #[test]
    fn missing_file_reports_an_open_error() {
        let source = TextureSource {
            path: PathBuf::from("/nonexistent/car_image.png"),
            expected_size: (1920, 1280),
        };
        let err = load_image(&source).unwrap_err();
        assert!(matches!(err, TextureError::Open { .. }));
    }

    #[test]
    fn dimension_mismatch_carries_both_sizes() {
        let path = temp_image("small.png", 4, 4);
        let source = TextureSource {
            path,
            expected_size: (1920, 1280),
        };
        match load_image(&source).unwrap_err() {
            TextureError::DimensionMismatch {
                expected_width,
                expected_height,
                actual_width,
                actual_height,
                ..
            } => {
                assert_eq!((expected_width, expected_height), (1920, 1280));
                assert_eq!((actual_width, actual_height), (4, 4));
            }
            other => panic!("expected a dimension mismatch, got {other}"),
        }
    }

    #[test]
    fn matching_dimensions_load_as_rgb8() {
        let path = temp_image("exact.png", 6, 3);
        let source = TextureSource {
            path,
            expected_size: (6, 3),
        };
        let image = load_image(&source).expect("load probe image");
        assert_eq!((image.width, image.height), (6, 3));
        assert_eq!(image.pixels.len(), 6 * 3 * 3);
    }

    #[test]
    fn mip_count_covers_down_to_one_pixel() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(2, 2), 2);
        assert_eq!(mip_level_count(1, 256), 9);
        assert_eq!(mip_level_count(1920, 1280), 11);
    }

    #[test]
    fn rgb_expands_to_opaque_rgba() {
        let source = checker(4, 2);
        let rgba = expand_to_rgba(&source);
        assert_eq!(rgba.dimensions(), (4, 2));
        for pixel in rgba.pixels() {
            assert_eq!(pixel.0[3], u8::MAX);
        }
        assert_eq!(&rgba.get_pixel(0, 0).0[..3], &source.pixels[..3]);
    }

    #[test]
    fn mip_chain_halves_down_to_one_by_one() {
        let chain = build_mip_chain(expand_to_rgba(&checker(16, 8)));
        let dims: Vec<_> = chain.iter().map(|mip| mip.dimensions()).collect();
        assert_eq!(dims, vec![(16, 8), (8, 4), (4, 2), (2, 1), (1, 1)]);
    }
}
