//! # PDF Serializer
//!
//! Takes the laid-out pages and writes a valid PDF file.
//!
//! This is a from-scratch PDF 1.7 writer. Reports only need the standard
//! Helvetica faces (no embedding), filled and stroked rectangles, lines,
//! and raster images, so the subset of the format involved is small.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (fonts, images, pages, content streams)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! Layout coordinates have a top-left origin; PDF user space has its origin
//! at the bottom-left, so every y is flipped against the page height.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>
use std::sync::Arc;

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::error::LayoutError;
use crate::font::StandardFont;
use crate::image_loader::{ImagePixelData, JpegColorSpace, LoadedImage};
use crate::layout::{DrawCommand, LayoutElement, LayoutPage};
use crate::style::Color;

const PRODUCER: &str = "Folio";

/// Document information dictionary entries.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub title: Option<String>,
}

#[derive(Debug, Default)]
pub struct PdfWriter;

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<Vec<u8>>,
    /// Font resource name index → object id, in `/F{index}` order.
    fonts: Vec<(StandardFont, usize)>,
    /// Image object ids, keyed by the shared image allocation so an image
    /// drawn on every page (the logo) is written once.
    images: HashMap<*const LoadedImage, usize>,
}

impl PdfBuilder {
    fn push(&mut self, data: Vec<u8>) -> usize {
        self.objects.push(data);
        self.objects.len() - 1
    }

    fn push_stream(&mut self, dict: &str, data: &[u8]) -> usize {
        let mut obj: Vec<u8> = Vec::with_capacity(data.len() + dict.len() + 32);
        let _ = write!(obj, "<< {} /Length {} >>\nstream\n", dict, data.len());
        obj.extend_from_slice(data);
        obj.extend_from_slice(b"\nendstream");
        self.push(obj)
    }

    fn font_resource(&self, font: StandardFont) -> usize {
        self.fonts
            .iter()
            .position(|(f, _)| *f == font)
            .unwrap_or(0)
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write laid-out pages to a PDF byte vector.
    pub fn write(&self, pages: &[LayoutPage], metadata: &Metadata) -> Result<Vec<u8>, LayoutError> {
        if pages.is_empty() {
            return Err(LayoutError::Pdf("document has no pages".to_string()));
        }

        // 0 = placeholder (PDF objects are 1-indexed), 1 = Catalog, 2 = Pages.
        let mut builder = PdfBuilder {
            objects: vec![Vec::new(), Vec::new(), Vec::new()],
            fonts: Vec::new(),
            images: HashMap::new(),
        };

        self.register_fonts(&mut builder, pages);

        let mut page_obj_ids = Vec::with_capacity(pages.len());
        for page in pages {
            let image_ids = self.register_images(&mut builder, page);
            let content = self.build_content_stream(page, &builder);
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);
            let content_obj_id = builder.push_stream("/Filter /FlateDecode", &compressed);

            let fonts = builder
                .fonts
                .iter()
                .enumerate()
                .map(|(i, (_, id))| format!("/F{} {} 0 R", i, id))
                .collect::<Vec<_>>()
                .join(" ");
            let mut resources = format!("/Font << {} >>", fonts);
            if !image_ids.is_empty() {
                let xobjects = image_ids
                    .iter()
                    .map(|id| format!("/Im{} {} 0 R", id, id))
                    .collect::<Vec<_>>()
                    .join(" ");
                let _ = write!(resources, " /XObject << {} >>", xobjects);
            }

            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << {} >> >>",
                page.width, page.height, content_obj_id, resources
            );
            page_obj_ids.push(builder.push(page_dict.into_bytes()));
        }

        builder.objects[1] = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2] = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let mut info = String::from("<< ");
        if let Some(ref title) = metadata.title {
            let _ = write!(info, "/Title ({}) ", Self::escape_pdf_string(title));
        }
        let _ = write!(info, "/Producer ({}) /Creator ({}) >>", PRODUCER, PRODUCER);
        let info_obj_id = builder.push(info.into_bytes());

        Ok(self.serialize(&builder, info_obj_id))
    }

    /// One Type1 font object per face actually used, in a stable order.
    fn register_fonts(&self, builder: &mut PdfBuilder, pages: &[LayoutPage]) {
        let mut used: BTreeSet<StandardFont> = pages
            .iter()
            .flat_map(|p| p.elements.iter())
            .filter_map(|e| match &e.draw {
                DrawCommand::Text { font, .. } => Some(*font),
                _ => None,
            })
            .collect();
        // Always have at least Helvetica
        if used.is_empty() {
            used.insert(StandardFont::Helvetica);
        }

        for font in used {
            let dict = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.pdf_name()
            );
            let id = builder.push(dict.into_bytes());
            builder.fonts.push((font, id));
        }
    }

    /// Write the page's images that are not yet in the file. Returns the
    /// object ids of every image the page uses, which double as their
    /// `/Im{id}` resource names.
    fn register_images(&self, builder: &mut PdfBuilder, page: &LayoutPage) -> Vec<usize> {
        let mut ids = Vec::new();
        for element in &page.elements {
            if let DrawCommand::Image { image } = &element.draw {
                let key = Arc::as_ptr(image);
                let id = match builder.images.get(&key) {
                    Some(&id) => id,
                    None => {
                        let id = Self::write_image_xobject(builder, image);
                        builder.images.insert(key, id);
                        id
                    }
                };
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        ids
    }

    /// Write a single image as one or two XObject PDF objects.
    /// Returns the main XObject ID.
    fn write_image_xobject(builder: &mut PdfBuilder, image: &LoadedImage) -> usize {
        match &image.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                let color_space = match color_space {
                    JpegColorSpace::DeviceRGB => "/DeviceRGB",
                    JpegColorSpace::DeviceGray => "/DeviceGray",
                };
                let dict = format!(
                    "/Type /XObject /Subtype /Image /Width {} /Height {} \
                     /ColorSpace {} /BitsPerComponent 8 /Filter /DCTDecode",
                    image.width_px, image.height_px, color_space
                );
                builder.push_stream(&dict, data)
            }

            ImagePixelData::Decoded { rgb, alpha } => {
                // SMask first so the image dictionary can reference it.
                let smask_ref = alpha
                    .as_ref()
                    .map(|alpha| {
                        let dict = format!(
                            "/Type /XObject /Subtype /Image /Width {} /Height {} \
                             /ColorSpace /DeviceGray /BitsPerComponent 8 /Filter /FlateDecode",
                            image.width_px, image.height_px
                        );
                        let id = builder.push_stream(&dict, &compress_to_vec_zlib(alpha, 6));
                        format!(" /SMask {} 0 R", id)
                    })
                    .unwrap_or_default();

                let dict = format!(
                    "/Type /XObject /Subtype /Image /Width {} /Height {} \
                     /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /FlateDecode{}",
                    image.width_px, image.height_px, smask_ref
                );
                builder.push_stream(&dict, &compress_to_vec_zlib(rgb, 6))
            }
        }
    }

    /// Build the PDF content stream for a single page.
    fn build_content_stream(&self, page: &LayoutPage, builder: &PdfBuilder) -> String {
        let mut stream = String::new();
        for element in &page.elements {
            self.write_element(&mut stream, element, page.height, builder);
        }
        stream
    }

    /// Write a single layout element as PDF operators.
    fn write_element(&self, stream: &mut String, element: &LayoutElement, page_height: f64, builder: &PdfBuilder) {
        match &element.draw {
            DrawCommand::Rect { fill, stroke } => {
                let x = element.x;
                let y = page_height - element.y - element.height;
                if let Some(bg) = fill.filter(|c| c.a > 0.0) {
                    let _ = write!(
                        stream,
                        "q\n{} rg\n{:.2} {:.2} {:.2} {:.2} re\nf\nQ\n",
                        Self::rgb(&bg),
                        x,
                        y,
                        element.width,
                        element.height
                    );
                }
                if let Some((color, width)) = stroke.filter(|(_, w)| *w > 0.0) {
                    let _ = write!(
                        stream,
                        "q\n{} RG\n{:.2} w\n{:.2} {:.2} {:.2} {:.2} re\nS\nQ\n",
                        Self::rgb(&color),
                        width,
                        x,
                        y,
                        element.width,
                        element.height
                    );
                }
            }

            DrawCommand::Line { color, line_width } => {
                let _ = write!(
                    stream,
                    "q\n{} RG\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                    Self::rgb(color),
                    line_width,
                    element.x,
                    page_height - element.y,
                    element.x + element.width,
                    page_height - element.y - element.height
                );
            }

            DrawCommand::Text {
                lines,
                font,
                font_size,
                color,
            } => {
                let _ = write!(
                    stream,
                    "BT\n{} rg\n/F{} {:.1} Tf\n",
                    Self::rgb(color),
                    builder.font_resource(*font),
                    font_size
                );
                for line in lines {
                    // Absolute text matrix per line; Td would be relative.
                    let _ = writeln!(
                        stream,
                        "1 0 0 1 {:.2} {:.2} Tm\n({}) Tj",
                        line.x,
                        page_height - line.y,
                        Self::encode_text(&line.text)
                    );
                }
                stream.push_str("ET\n");
            }

            DrawCommand::Image { image } => {
                let y = page_height - element.y - element.height;
                match builder.images.get(&Arc::as_ptr(image)) {
                    Some(id) => {
                        let _ = write!(
                            stream,
                            "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
                            element.width, element.height, element.x, y, id
                        );
                    }
                    None => Self::write_placeholder(stream, element.x, y, element.width, element.height),
                }
            }

            DrawCommand::ImagePlaceholder => {
                let y = page_height - element.y - element.height;
                Self::write_placeholder(stream, element.x, y, element.width, element.height);
            }
        }
    }

    fn write_placeholder(stream: &mut String, x: f64, y: f64, w: f64, h: f64) {
        let _ = write!(
            stream,
            "q\n0.9 0.9 0.9 rg\n{:.2} {:.2} {:.2} {:.2} re\nf\nQ\n",
            x, y, w, h
        );
    }

    fn rgb(color: &Color) -> String {
        format!("{:.3} {:.3} {:.3}", color.r, color.g, color.b)
    }

    /// Encode text as a WinAnsi literal string body.
    fn encode_text(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for ch in text.chars() {
            let b = Self::unicode_to_winansi(ch).unwrap_or(b'?');
            match b {
                b'\\' => out.push_str("\\\\"),
                b'(' => out.push_str("\\("),
                b')' => out.push_str("\\)"),
                0x20..=0x7E => out.push(b as char),
                _ => {
                    // Octal escape for bytes outside ASCII printable range
                    let _ = write!(out, "\\{:03o}", b);
                }
            }
        }
        out
    }

    /// Escape special characters in a PDF string.
    fn escape_pdf_string(s: &str) -> String {
        s.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)")
    }

    fn unicode_to_winansi(ch: char) -> Option<u8> {
        let cp = ch as u32;
        if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
            return Some(cp as u8);
        }
        // Windows-1252 assignments in 0x80-0x9F
        match cp {
            0x20AC => Some(0x80),
            0x201A => Some(0x82),
            0x0192 => Some(0x83),
            0x201E => Some(0x84),
            0x2026 => Some(0x85),
            0x2020 => Some(0x86),
            0x2021 => Some(0x87),
            0x02C6 => Some(0x88),
            0x2030 => Some(0x89),
            0x0160 => Some(0x8A),
            0x2039 => Some(0x8B),
            0x0152 => Some(0x8C),
            0x017D => Some(0x8E),
            0x2018 => Some(0x91),
            0x2019 => Some(0x92),
            0x201C => Some(0x93),
            0x201D => Some(0x94),
            0x2022 => Some(0x95),
            0x2013 => Some(0x96),
            0x2014 => Some(0x97),
            0x02DC => Some(0x98),
            0x2122 => Some(0x99),
            0x0161 => Some(0x9A),
            0x203A => Some(0x9B),
            0x0153 => Some(0x9C),
            0x017E => Some(0x9E),
            0x0178 => Some(0x9F),
            _ => None,
        }
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(obj);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        );

        output
    }
}
