//! # Header Image Loading
//!
//! Loads the page header from a file path or a `data:image/...;base64,` URI
//! and prepares it for PDF embedding. JPEG bytes pass through untouched
//! (PDF decodes them with DCTDecode). PNG is decoded to RGB pixels with a
//! separate alpha channel for SMask transparency.

use std::io::Cursor;
use std::path::Path;

use crate::error::CareerDocError;

/// A loaded image ready for PDF embedding.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

impl LoadedImage {
    /// Width over height.
    pub fn aspect_ratio(&self) -> f64 {
        self.width_px as f64 / self.height_px as f64
    }
}

/// Pixel data in a form the PDF writer consumes directly.
#[derive(Debug, Clone)]
pub enum ImagePixelData {
    /// Raw JPEG bytes.
    Jpeg {
        data: Vec<u8>,
        color_space: JpegColorSpace,
    },
    /// Decoded pixels.
    Decoded {
        /// width * height * 3 bytes
        rgb: Vec<u8>,
        /// width * height bytes, `None` when fully opaque
        alpha: Option<Vec<u8>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegColorSpace {
    DeviceRGB,
    DeviceGray,
}

impl JpegColorSpace {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::DeviceRGB => "/DeviceRGB",
            Self::DeviceGray => "/DeviceGray",
        }
    }
}

fn image_error(message: impl Into<String>) -> CareerDocError {
    CareerDocError::Image(message.into())
}

/// Load an image from a data URI or a file path.
pub fn load_image(src: &str) -> Result<LoadedImage, CareerDocError> {
    let raw = match src.strip_prefix("data:image/") {
        Some(rest) => {
            let (_, b64) = rest
                .split_once(',')
                .ok_or_else(|| image_error("invalid data URI: missing comma"))?;
            base64_decode(b64)?
        }
        None => {
            return load_image_file(Path::new(src));
        }
    };
    decode_image_bytes(&raw)
}

/// Load an image from disk.
pub fn load_image_file(path: &Path) -> Result<LoadedImage, CareerDocError> {
    let raw = std::fs::read(path).map_err(|e| {
        image_error(format!("failed to read image file '{}': {}", path.display(), e))
    })?;
    decode_image_bytes(&raw)
}

fn base64_decode(input: &str) -> Result<Vec<u8>, CareerDocError> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(input.trim())
        .map_err(|e| image_error(format!("base64 decode error: {}", e)))
}

/// Detect the format from magic bytes and decode accordingly.
pub fn decode_image_bytes(data: &[u8]) -> Result<LoadedImage, CareerDocError> {
    if data.len() < 4 {
        return Err(image_error("image data too short"));
    }

    let image = if is_jpeg(data) {
        decode_jpeg(data)?
    } else if is_png(data) {
        decode_png(data)?
    } else {
        return Err(image_error("unsupported image format (expected JPEG or PNG)"));
    };

    if image.width_px == 0 || image.height_px == 0 {
        return Err(image_error("image has zero width or height"));
    }
    Ok(image)
}

fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

fn is_png(data: &[u8]) -> bool {
    data.starts_with(&[0x89, b'P', b'N', b'G'])
}

/// JPEG: read dimensions and color space without decoding pixels.
fn decode_jpeg(data: &[u8]) -> Result<LoadedImage, CareerDocError> {
    let reader = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| image_error(format!("JPEG format detection error: {}", e)))?;

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| image_error(format!("failed to read JPEG dimensions: {}", e)))?;

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Jpeg {
            data: data.to_vec(),
            color_space: detect_jpeg_color_space(data),
        },
        width_px: width,
        height_px: height,
    })
}

/// Walk the JPEG markers to the start-of-frame segment and read its
/// component count.
fn detect_jpeg_color_space(data: &[u8]) -> JpegColorSpace {
    let mut i = 2;
    while i + 3 < data.len() && data[i] == 0xFF {
        let marker = data[i + 1];
        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        if is_sof && i + 9 < data.len() {
            return if data[i + 9] == 1 {
                JpegColorSpace::DeviceGray
            } else {
                JpegColorSpace::DeviceRGB
            };
        }
        let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        i += 2 + seg_len;
    }
    JpegColorSpace::DeviceRGB
}

/// PNG: decode to RGBA, split into RGB + alpha.
fn decode_png(data: &[u8]) -> Result<LoadedImage, CareerDocError> {
    let img = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| image_error(format!("PNG format detection error: {}", e)))?
        .decode()
        .map_err(|e| image_error(format!("failed to decode PNG: {}", e)))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let pixel_count = (width as usize) * (height as usize);
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel.0[3]);
    }
    let opaque = alpha.iter().all(|&a| a == 255);

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Decoded {
            rgb,
            alpha: if opaque { None } else { Some(alpha) },
        },
        width_px: width,
        height_px: height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};

    fn encode(img: DynamicImage, format: ImageOutputFormat) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
        buf
    }

    fn png(width: u32, height: u32, alpha: u8) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, alpha]));
        encode(DynamicImage::ImageRgba8(img), ImageOutputFormat::Png)
    }

    #[test]
    fn test_magic_bytes() {
        assert!(is_jpeg(&[0xFF, 0xD8, 0xFF, 0xE0]));
        assert!(!is_jpeg(&[0x89, 0x50, 0x4E, 0x47]));
        assert!(is_png(&[0x89, 0x50, 0x4E, 0x47]));
        assert!(!is_png(&[0x89, 0x50]));
    }

    #[test]
    fn test_opaque_png_has_no_alpha() {
        let loaded = decode_image_bytes(&png(8, 2, 255)).unwrap();
        assert_eq!((loaded.width_px, loaded.height_px), (8, 2));
        assert_eq!(loaded.aspect_ratio(), 4.0);
        match loaded.pixel_data {
            ImagePixelData::Decoded { rgb, alpha } => {
                assert_eq!(rgb.len(), 8 * 2 * 3);
                assert!(alpha.is_none());
            }
            other => panic!("expected decoded pixels, got {:?}", other),
        }
    }

    #[test]
    fn test_translucent_png_keeps_alpha() {
        let loaded = decode_image_bytes(&png(3, 3, 128)).unwrap();
        match loaded.pixel_data {
            ImagePixelData::Decoded { alpha: Some(a), .. } => assert_eq!(a.len(), 9),
            other => panic!("expected alpha channel, got {:?}", other),
        }
    }

    #[test]
    fn test_jpeg_passes_through() {
        let img = DynamicImage::new_rgb8(6, 3);
        let bytes = encode(img, ImageOutputFormat::Jpeg(80));
        let loaded = decode_image_bytes(&bytes).unwrap();
        assert_eq!((loaded.width_px, loaded.height_px), (6, 3));
        match loaded.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                assert_eq!(data, bytes);
                assert_eq!(color_space, JpegColorSpace::DeviceRGB);
            }
            other => panic!("expected JPEG passthrough, got {:?}", other),
        }
    }

    #[test]
    fn test_data_uri() {
        use base64::Engine;
        let b64 = base64::engine::general_purpose::STANDARD.encode(png(4, 4, 255));
        let loaded = load_image(&format!("data:image/png;base64,{}", b64)).unwrap();
        assert_eq!(loaded.width_px, 4);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(load_image("data:image/png;base64").is_err());
        assert!(decode_image_bytes(&[0x00, 0x01]).is_err());
        assert!(decode_image_bytes(&[0x00, 0x01, 0x02, 0x03, 0x04]).is_err());
        assert!(load_image("/definitely/not/here/header.png").is_err());
    }
}
