use crate::AssetError;
use sha2::{Digest, Sha256};
use std::io::Cursor;

/// Content-addressed texture ID computed from the decoded texels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

/// How a texture is projected when sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureMapping {
    /// Plain 2D lookup by mesh UVs.
    #[default]
    Uv,
    /// Panorama wrapped onto a sphere, sampled by reflected view direction.
    EquirectangularReflection,
    /// Panorama wrapped onto a sphere, sampled by refracted view direction.
    EquirectangularRefraction,
}

impl TextureMapping {
    pub fn is_equirectangular(self) -> bool {
        matches!(
            self,
            Self::EquirectangularReflection | Self::EquirectangularRefraction
        )
    }
}

/// A decoded floating-point RGB image.
#[derive(Debug, Clone)]
pub struct Texture {
    id: TextureId,
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Row-major RGB texels, three floats per pixel.
    pub data: Vec<f32>,
    pub mapping: TextureMapping,
}

impl Texture {
    /// Wrap raw RGB float data. `data.len()` must be `width * height * 3`.
    pub fn from_rgb32f(
        name: impl Into<String>,
        width: u32,
        height: u32,
        data: Vec<f32>,
    ) -> Result<Self, AssetError> {
        let name = name.into();
        let expected = width as usize * height as usize * 3;
        if width == 0 || height == 0 || data.len() != expected {
            return Err(AssetError::Decode {
                name,
                reason: format!(
                    "{width}x{height} image needs {expected} floats, got {}",
                    data.len()
                ),
            });
        }
        let id = content_hash(width, height, &data);
        Ok(Self {
            id,
            name,
            width,
            height,
            data,
            mapping: TextureMapping::default(),
        })
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn pixel(&self, x: u32, y: u32) -> [f32; 3] {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        let idx = ((y * self.width + x) * 3) as usize;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }

    /// Mean color over all texels.
    pub fn average_color(&self) -> [f32; 3] {
        let mut sum = [0.0f64; 3];
        for px in self.data.chunks_exact(3) {
            sum[0] += px[0] as f64;
            sum[1] += px[1] as f64;
            sum[2] += px[2] as f64;
        }
        let n = (self.width as f64) * (self.height as f64);
        [
            (sum[0] / n) as f32,
            (sum[1] / n) as f32,
            (sum[2] / n) as f32,
        ]
    }
}

/// Decode a Radiance HDR (or any float-capable format `image` recognises).
pub fn decode_hdr(name: &str, bytes: &[u8]) -> Result<Texture, AssetError> {
    let decode_err = |reason: String| AssetError::Decode {
        name: name.to_string(),
        reason,
    };
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| decode_err(e.to_string()))?;
    let img = reader.decode().map_err(|e| decode_err(e.to_string()))?;

    let rgb = img.into_rgb32f();
    let (width, height) = rgb.dimensions();
    tracing::debug!(name, width, height, "decoded texture");
    Texture::from_rgb32f(name, width, height, rgb.into_raw())
}

fn content_hash(width: u32, height: u32, data: &[f32]) -> TextureId {
    let mut hasher = Sha256::new();
    hasher.update(width.to_le_bytes());
    hasher.update(height.to_le_bytes());
    for v in data {
        hasher.update(v.to_le_bytes());
    }
    let result = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&result[..8]);
    TextureId(u64::from_le_bytes(bytes))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A 2x1 flat (non run-length encoded) Radiance file.
    pub(crate) fn tiny_hdr() -> Vec<u8> {
        let mut bytes = b"#?RADIANCE\nFORMAT=32-bit_rle_rgbe\n\n-Y 1 +X 2\n".to_vec();
        bytes.extend_from_slice(&[128, 64, 32, 129]);
        bytes.extend_from_slice(&[64, 128, 32, 129]);
        bytes
    }

    #[test]
    fn decode_radiance_file() {
        let tex = decode_hdr("tiny.hdr", &tiny_hdr()).unwrap();
        assert_eq!((tex.width, tex.height), (2, 1));
        assert_eq!(tex.data.len(), 6);
        let [r, g, b] = tex.pixel(0, 0);
        assert!(r > g && g > b && b > 0.0);
        assert_eq!(tex.mapping, TextureMapping::Uv);
    }

    #[test]
    fn decode_garbage_fails() {
        let err = decode_hdr("junk.hdr", b"definitely not an image").unwrap_err();
        assert!(matches!(err, AssetError::Decode { .. }));
    }

    #[test]
    fn content_addressed_ids() {
        let a = Texture::from_rgb32f("a", 1, 1, vec![1.0, 0.5, 0.25]).unwrap();
        let b = Texture::from_rgb32f("b", 1, 1, vec![1.0, 0.5, 0.25]).unwrap();
        let c = Texture::from_rgb32f("c", 1, 1, vec![0.0, 0.5, 0.25]).unwrap();
        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
    }

    #[test]
    fn size_mismatch_rejected() {
        assert!(Texture::from_rgb32f("bad", 2, 2, vec![0.0; 3]).is_err());
        assert!(Texture::from_rgb32f("empty", 0, 0, Vec::new()).is_err());
    }

    #[test]
    fn average_color() {
        let tex = Texture::from_rgb32f("avg", 2, 1, vec![1.0, 0.0, 0.0, 0.0, 0.0, 1.0]).unwrap();
        assert_eq!(tex.average_color(), [0.5, 0.0, 0.5]);
    }

    #[test]
    fn equirectangular_mappings() {
        assert!(TextureMapping::EquirectangularReflection.is_equirectangular());
        assert!(!TextureMapping::Uv.is_equirectangular());
    }
}
