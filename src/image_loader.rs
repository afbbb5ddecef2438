//! # Image Loading
//!
//! Turns encoded images into pixel data the PDF writer can embed. Two kinds
//! of image reach a page: rasterized charts and the header logo (built in,
//! or supplied by the caller as a file or data URI). JPEG logos are
//! embedded as-is with DCTDecode; PNGs are decoded to RGB with a separate
//! alpha plane for the SMask.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use base64::Engine as _;

use crate::error::LayoutError;

/// A decoded image ready for PDF embedding.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

#[derive(Debug, Clone)]
pub enum ImagePixelData {
    /// The original JPEG stream.
    Jpeg {
        data: Vec<u8>,
        color_space: JpegColorSpace,
    },
    /// `rgb` holds 3 bytes per pixel; `alpha` 1 byte per pixel, absent when
    /// every pixel is opaque.
    Decoded { rgb: Vec<u8>, alpha: Option<Vec<u8>> },
}

/// `/ColorSpace` of an embedded JPEG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegColorSpace {
    DeviceRGB,
    DeviceGray,
}

impl LoadedImage {
    pub fn is_opaque(&self) -> bool {
        match &self.pixel_data {
            ImagePixelData::Jpeg { .. } => true,
            ImagePixelData::Decoded { alpha, .. } => alpha.is_none(),
        }
    }
}

/// Where a caller-supplied image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Base64 payload of a `data:image/...;base64,` URI.
    DataUri(String),
    Path(PathBuf),
}

impl ImageSource {
    /// `data:` URIs are inline images; anything else names a file.
    pub fn parse(src: &str) -> Self {
        match src.trim().strip_prefix("data:") {
            Some(rest) => ImageSource::DataUri(rest.to_string()),
            None => ImageSource::Path(PathBuf::from(src)),
        }
    }

    fn read(&self) -> Result<Vec<u8>, LayoutError> {
        match self {
            ImageSource::DataUri(rest) => {
                let (media, payload) = rest
                    .split_once(',')
                    .ok_or_else(|| LayoutError::Image("data URI has no payload".to_string()))?;
                if !media.starts_with("image/") || !media.ends_with(";base64") {
                    return Err(LayoutError::Image(format!(
                        "expected a base64 image data URI, got \"data:{}\"",
                        media
                    )));
                }
                base64::engine::general_purpose::STANDARD
                    .decode(payload.trim())
                    .map_err(|e| LayoutError::Image(format!("data URI is not valid base64: {}", e)))
            }
            ImageSource::Path(path) => read_file(path),
        }
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, LayoutError> {
    std::fs::read(path).map_err(|e| LayoutError::Image(format!("cannot read {}: {}", path.display(), e)))
}

/// Load a logo or other image from a file path or a data URI.
pub fn load_image(src: &str) -> Result<LoadedImage, LayoutError> {
    let bytes = ImageSource::parse(src).read()?;
    decode_image_bytes(&bytes)
}

/// Decode PNG or JPEG bytes, chosen by their signature.
pub fn decode_image_bytes(data: &[u8]) -> Result<LoadedImage, LayoutError> {
    const PNG_SIGNATURE: &[u8] = b"\x89PNG";
    const JPEG_SIGNATURE: &[u8] = b"\xFF\xD8";

    if data.starts_with(JPEG_SIGNATURE) {
        decode_jpeg(data)
    } else if data.starts_with(PNG_SIGNATURE) {
        decode_png(data)
    } else {
        Err(LayoutError::Image(
            "unsupported image format (expected JPEG or PNG)".to_string(),
        ))
    }
}

fn decode_jpeg(data: &[u8]) -> Result<LoadedImage, LayoutError> {
    let (width_px, height_px) = image::io::Reader::with_format(Cursor::new(data), image::ImageFormat::Jpeg)
        .into_dimensions()
        .map_err(|e| LayoutError::Image(format!("unreadable JPEG header: {}", e)))?;

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Jpeg {
            data: data.to_vec(),
            color_space: jpeg_color_space(data),
        },
        width_px,
        height_px,
    })
}

/// Component count from the first start-of-frame segment; one component
/// is grayscale, anything else is treated as RGB.
fn jpeg_color_space(data: &[u8]) -> JpegColorSpace {
    let mut pos = 2;
    while let &[0xFF, marker, len_hi, len_lo, ..] = &data[pos.min(data.len())..] {
        let start_of_frame = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        if start_of_frame {
            // FF marker, length (2), precision (1), height (2), width (2), components.
            return match data.get(pos + 9) {
                Some(1) => JpegColorSpace::DeviceGray,
                _ => JpegColorSpace::DeviceRGB,
            };
        }
        pos += 2 + u16::from_be_bytes([len_hi, len_lo]) as usize;
    }
    JpegColorSpace::DeviceRGB
}

fn decode_png(data: &[u8]) -> Result<LoadedImage, LayoutError> {
    let rgba = image::load_from_memory_with_format(data, image::ImageFormat::Png)
        .map_err(|e| LayoutError::Image(format!("cannot decode PNG: {}", e)))?
        .to_rgba8();
    let (width_px, height_px) = rgba.dimensions();

    let (rgb, alpha): (Vec<[u8; 3]>, Vec<u8>) = rgba
        .pixels()
        .map(|p| ([p.0[0], p.0[1], p.0[2]], p.0[3]))
        .unzip();
    let translucent = alpha.iter().any(|&a| a != u8::MAX);

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Decoded {
            rgb: rgb.concat(),
            alpha: translucent.then_some(alpha),
        },
        width_px,
        height_px,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(pixel: [u8; 4]) -> Vec<u8> {
        let mut img = image::RgbaImage::new(1, 1);
        img.put_pixel(0, 0, image::Rgba(pixel));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), 1, 1, image::ColorType::Rgba8)
            .unwrap();
        buf
    }

    fn jpeg_bytes(color: image::ColorType) -> Vec<u8> {
        let channels = color.channel_count() as usize;
        let pixels = vec![128u8; 4 * 2 * channels];
        let mut buf = Vec::new();
        image::codecs::jpeg::JpegEncoder::new(&mut buf)
            .encode(&pixels, 4, 2, color)
            .unwrap();
        buf
    }

    #[test]
    fn sources_are_data_uris_or_paths() {
        assert_eq!(
            ImageSource::parse("data:image/png;base64,AAAA"),
            ImageSource::DataUri("image/png;base64,AAAA".to_string())
        );
        assert_eq!(
            ImageSource::parse("assets/logo.png"),
            ImageSource::Path(PathBuf::from("assets/logo.png"))
        );
    }

    #[test]
    fn data_uri_without_payload_is_rejected() {
        assert!(load_image("data:image/png;base64").is_err());
        assert!(load_image("data:text/plain;base64,aGk=").is_err());
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_image("/nonexistent/logo.png").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/logo.png"));
    }

    #[test]
    fn unknown_signature_is_rejected() {
        assert!(decode_image_bytes(&[0x00, 0x01]).is_err());
        assert!(decode_image_bytes(b"GIF89a").is_err());
    }

    #[test]
    fn opaque_png_has_no_alpha_plane() {
        let loaded = decode_image_bytes(&png_bytes([255, 0, 0, 255])).unwrap();
        assert_eq!((loaded.width_px, loaded.height_px), (1, 1));
        assert!(loaded.is_opaque());
        match &loaded.pixel_data {
            ImagePixelData::Decoded { rgb, .. } => assert_eq!(rgb, &[255, 0, 0]),
            other => panic!("expected decoded pixels, got {:?}", other),
        }
    }

    #[test]
    fn translucent_png_keeps_alpha() {
        let loaded = decode_image_bytes(&png_bytes([255, 0, 0, 128])).unwrap();
        match &loaded.pixel_data {
            ImagePixelData::Decoded { alpha, .. } => assert_eq!(alpha.as_deref(), Some(&[128u8][..])),
            other => panic!("expected decoded pixels, got {:?}", other),
        }
    }

    #[test]
    fn png_from_data_uri() {
        let b64 = base64::engine::general_purpose::STANDARD.encode(png_bytes([0, 255, 0, 255]));
        let loaded = load_image(&format!("data:image/png;base64,{}", b64)).unwrap();
        assert_eq!(loaded.width_px, 1);
    }

    #[test]
    fn jpeg_passes_through_with_color_space() {
        let rgb = jpeg_bytes(image::ColorType::Rgb8);
        let loaded = decode_image_bytes(&rgb).unwrap();
        assert_eq!((loaded.width_px, loaded.height_px), (4, 2));
        match &loaded.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                assert_eq!(data, &rgb);
                assert_eq!(*color_space, JpegColorSpace::DeviceRGB);
            }
            other => panic!("expected JPEG passthrough, got {:?}", other),
        }

        let gray = decode_image_bytes(&jpeg_bytes(image::ColorType::L8)).unwrap();
        assert!(matches!(
            gray.pixel_data,
            ImagePixelData::Jpeg {
                color_space: JpegColorSpace::DeviceGray,
                ..
            }
        ));
    }

    #[test]
    fn jpeg_logo_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.jpg");
        std::fs::write(&path, jpeg_bytes(image::ColorType::Rgb8)).unwrap();
        let loaded = load_image(path.to_str().unwrap()).unwrap();
        assert!(loaded.is_opaque());
        assert!(matches!(loaded.pixel_data, ImagePixelData::Jpeg { .. }));
    }
}
