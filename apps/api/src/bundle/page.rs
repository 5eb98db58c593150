//! PDF page composition for the document bundler.
//!
//! One [`PdfWriter`] builds the whole output file: A4 pages, each carrying a
//! single piece of content centered and scaled to fit inside the page margin.
//! Images become image XObjects (JPEG bytes pass through with DCTDecode,
//! everything else is decoded to raw RGB). Source PDFs contribute their first
//! page as a Form XObject: the source object graph is renumbered past our own
//! ids and adopted wholesale, so nested resources keep resolving.
//!
//! Placeholder pages render Korean text through the predefined
//! HYSMyeongJo-Medium CID font (Adobe-Korea1), which viewers supply
//! themselves — no font file is embedded.

use image::DynamicImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use thiserror::Error;

// A4 in points.
const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
const MARGIN: f32 = 40.0;

const TITLE_FONT_SIZE: f32 = 18.0;
const MESSAGE_FONT_SIZE: f32 = 13.0;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("PDF construction error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("source PDF has no pages")]
    EmptySourcePdf,

    #[error("source PDF page has no MediaBox")]
    MissingMediaBox,
}

/// Incrementally builds the bundled PDF, one page per call.
pub struct PdfWriter {
    doc: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
}

impl PdfWriter {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            page_ids: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Appends a page carrying a decoded image, centered and scaled to the
    /// content box. `jpeg_bytes` enables DCTDecode passthrough so already
    /// compressed data is not re-encoded.
    pub fn add_image_page(
        &mut self,
        image: &DynamicImage,
        jpeg_bytes: Option<&[u8]>,
    ) -> Result<(), PageError> {
        let (width, height) = (image.width() as f32, image.height() as f32);

        let xobject = match jpeg_bytes {
            Some(bytes) => Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => image.width() as i64,
                    "Height" => image.height() as i64,
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8,
                    "Filter" => "DCTDecode",
                },
                bytes.to_vec(),
            ),
            None => {
                let rgb = image.to_rgb8();
                let mut stream = Stream::new(
                    dictionary! {
                        "Type" => "XObject",
                        "Subtype" => "Image",
                        "Width" => image.width() as i64,
                        "Height" => image.height() as i64,
                        "ColorSpace" => "DeviceRGB",
                        "BitsPerComponent" => 8,
                    },
                    rgb.into_raw(),
                );
                // Raw RGB compresses well; ignore failure and embed uncompressed.
                stream.compress().ok();
                stream
            }
        };
        let xobject_id = self.doc.add_object(xobject);

        let (w, h, x, y) = fit_into_content_box(width, height);
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        w.into(),
                        0f32.into(),
                        0f32.into(),
                        h.into(),
                        x.into(),
                        y.into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };

        let resources = dictionary! {
            "XObject" => dictionary! { "Im0" => xobject_id },
        };
        self.push_page(content, resources)
    }

    /// Appends a page carrying the first page of a source PDF, wrapped as a
    /// Form XObject and placed like an image.
    pub fn add_pdf_first_page(&mut self, pdf_bytes: &[u8]) -> Result<(), PageError> {
        let mut source = Document::load_mem(pdf_bytes)?;

        // Adopt the source object graph under ids that cannot collide.
        source.renumber_objects_with(self.doc.max_id + 1);

        let first_page_id = *source
            .get_pages()
            .values()
            .next()
            .ok_or(PageError::EmptySourcePdf)?;

        let content = source.get_page_content(first_page_id)?;
        let media_box = inherited_media_box(&source, first_page_id)?;
        let resources = inherited_resources(&source, first_page_id);
        let rotation = inherited_rotation(&source, first_page_id);

        self.doc.max_id = source.max_id;
        for (id, object) in std::mem::take(&mut source.objects) {
            self.doc.objects.insert(id, object);
        }

        let [x0, y0, x1, y1] = media_box;
        let form = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => vec![x0.into(), y0.into(), x1.into(), y1.into()],
                "Resources" => resources,
            },
            content,
        );
        let form_id = self.doc.add_object(form);

        let (bbox_w, bbox_h) = ((x1 - x0).abs().max(1.0), (y1 - y0).abs().max(1.0));

        // A /Rotate of 90 or 270 swaps the displayed dimensions; the scan is
        // then drawn upright by baking the rotation into the cm matrix.
        let (display_w, display_h) = if rotation % 180 == 0 {
            (bbox_w, bbox_h)
        } else {
            (bbox_h, bbox_w)
        };
        let (w, _, x, y) = fit_into_content_box(display_w, display_h);
        let scale = w / display_w;

        // Unit rotation matrix plus the offset that moves the rotated bbox
        // back into the first quadrant.
        let (a, b, c, d, ox, oy) = match rotation {
            90 => (0.0f32, -1.0, 1.0, 0.0, 0.0, bbox_w),
            180 => (-1.0, 0.0, 0.0, -1.0, bbox_w, bbox_h),
            270 => (0.0, 1.0, -1.0, 0.0, bbox_h, 0.0),
            _ => (1.0, 0.0, 0.0, 1.0, 0.0, 0.0),
        };

        // Compose translate ∘ scale ∘ rotate ∘ translate(-bbox origin).
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        (scale * a).into(),
                        (scale * b).into(),
                        (scale * c).into(),
                        (scale * d).into(),
                        (x + scale * (ox - a * x0 - c * y0)).into(),
                        (y + scale * (oy - b * x0 - d * y0)).into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Fm0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };

        let resources = dictionary! {
            "XObject" => dictionary! { "Fm0" => form_id },
        };
        self.push_page(content, resources)
    }

    /// Appends an error placeholder page: employee name, then the localized
    /// failure message below it.
    pub fn add_placeholder_page(&mut self, name: &str, message: &str) -> Result<(), PageError> {
        let font_id = self.doc.add_object(korean_font());

        let title_y = PAGE_HEIGHT / 2.0 + 20.0;
        let message_y = title_y - 36.0;

        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F0".into(), TITLE_FONT_SIZE.into()]),
                Operation::new(
                    "Td",
                    vec![
                        centered_text_x(name, TITLE_FONT_SIZE).into(),
                        title_y.into(),
                    ],
                ),
                Operation::new("Tj", vec![utf16_string(name)]),
                Operation::new("ET", vec![]),
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F0".into(), MESSAGE_FONT_SIZE.into()]),
                Operation::new(
                    "Td",
                    vec![
                        centered_text_x(message, MESSAGE_FONT_SIZE).into(),
                        message_y.into(),
                    ],
                ),
                Operation::new("Tj", vec![utf16_string(message)]),
                Operation::new("ET", vec![]),
            ],
        };

        let resources = dictionary! {
            "Font" => dictionary! { "F0" => font_id },
        };
        self.push_page(content, resources)
    }

    /// Finalizes the document and returns the serialized bytes.
    pub fn finish(mut self) -> Result<Vec<u8>, PageError> {
        let kids: Vec<Object> = self.page_ids.iter().map(|&id| id.into()).collect();
        let count = self.page_ids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.compress();

        let mut bytes = Vec::new();
        self.doc.save_to(&mut std::io::Cursor::new(&mut bytes))?;
        Ok(bytes)
    }

    fn push_page(
        &mut self,
        content: Content,
        resources: lopdf::Dictionary,
    ) -> Result<(), PageError> {
        let content_id = self
            .doc
            .add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![
                0f32.into(),
                0f32.into(),
                PAGE_WIDTH.into(),
                PAGE_HEIGHT.into(),
            ],
            "Contents" => content_id,
            "Resources" => resources,
        });
        self.page_ids.push(page_id);
        Ok(())
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Placement math
// ────────────────────────────────────────────────────────────────────────────

/// Scales `(width, height)` to fit the page's content box (A4 minus margins),
/// preserving aspect ratio, and centers the result. Returns the placed
/// `(width, height, x, y)`.
fn fit_into_content_box(width: f32, height: f32) -> (f32, f32, f32, f32) {
    let box_w = PAGE_WIDTH - 2.0 * MARGIN;
    let box_h = PAGE_HEIGHT - 2.0 * MARGIN;

    let scale = (box_w / width).min(box_h / height);
    let w = width * scale;
    let h = height * scale;
    let x = MARGIN + (box_w - w) / 2.0;
    let y = MARGIN + (box_h - h) / 2.0;
    (w, h, x, y)
}

/// Left text origin that roughly centers the string horizontally.
/// CJK glyphs are a full em wide, ASCII roughly half.
fn centered_text_x(text: &str, font_size: f32) -> f32 {
    let ems: f32 = text
        .chars()
        .map(|c| if c.is_ascii() { 0.5 } else { 1.0 })
        .sum();
    ((PAGE_WIDTH - ems * font_size) / 2.0).max(MARGIN)
}

// ────────────────────────────────────────────────────────────────────────────
// Source PDF attribute lookup
// ────────────────────────────────────────────────────────────────────────────

/// Reads the page's MediaBox, walking Parent links for inherited values.
fn inherited_media_box(doc: &Document, page_id: ObjectId) -> Result<[f32; 4], PageError> {
    let mut current = page_id;
    for _ in 0..16 {
        let dict = doc.get_object(current)?.as_dict()?;
        if let Ok(object) = dict.get(b"MediaBox") {
            let array = doc.dereference(object)?.1.as_array()?;
            if array.len() == 4 {
                let mut media_box = [0f32; 4];
                for (slot, value) in media_box.iter_mut().zip(array) {
                    *slot = numeric(doc.dereference(value)?.1).ok_or(PageError::MissingMediaBox)?;
                }
                return Ok(media_box);
            }
        }
        match dict.get(b"Parent") {
            Ok(parent) => current = parent.as_reference()?,
            Err(_) => break,
        }
    }
    Err(PageError::MissingMediaBox)
}

fn numeric(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Reads the page's Resources (possibly inherited). A reference is kept as a
/// reference — the referenced object is adopted with the rest of the graph.
/// Pages without resources get an empty dictionary.
fn inherited_resources(doc: &Document, page_id: ObjectId) -> Object {
    let mut current = page_id;
    for _ in 0..16 {
        let Ok(dict) = doc.get_object(current).and_then(Object::as_dict) else {
            break;
        };
        if let Ok(resources) = dict.get(b"Resources") {
            return resources.clone();
        }
        match dict.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent) => current = parent,
            Err(_) => break,
        }
    }
    Object::Dictionary(dictionary! {})
}

/// Reads the page's /Rotate entry (possibly inherited), normalized to
/// 0, 90, 180 or 270. Missing or malformed entries mean no rotation.
fn inherited_rotation(doc: &Document, page_id: ObjectId) -> i64 {
    let mut current = page_id;
    for _ in 0..16 {
        let Ok(dict) = doc.get_object(current).and_then(Object::as_dict) else {
            break;
        };
        if let Ok(object) = dict.get(b"Rotate") {
            if let Ok((_, Object::Integer(r))) = doc.dereference(object) {
                return ((r % 360) + 360) % 360;
            }
            break;
        }
        match dict.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent) => current = parent,
            Err(_) => break,
        }
    }
    0
}

// ────────────────────────────────────────────────────────────────────────────
// Korean text without embedded fonts
// ────────────────────────────────────────────────────────────────────────────

/// Predefined CID font for Korean placeholder text (Adobe-Korea1 registry,
/// UCS-2 encoding). Viewers substitute a system font; nothing is embedded.
fn korean_font() -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => "HYSMyeongJo-Medium",
        "Encoding" => "UniKS-UCS2-H",
        "DescendantFonts" => vec![Object::Dictionary(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType0",
            "BaseFont" => "HYSMyeongJo-Medium",
            "CIDSystemInfo" => dictionary! {
                "Registry" => Object::String(b"Adobe".to_vec(), StringFormat::Literal),
                "Ordering" => Object::String(b"Korea1".to_vec(), StringFormat::Literal),
                "Supplement" => 1,
            },
            "DW" => 1000,
        })],
    }
}

/// UTF-16BE hex string as UniKS-UCS2-H expects.
fn utf16_string(text: &str) -> Object {
    let bytes: Vec<u8> = text.encode_utf16().flat_map(u16::to_be_bytes).collect();
    Object::String(bytes, StringFormat::Hexadecimal)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    fn sample_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([120, 10, 10])))
    }

    fn minimal_source_pdf() -> Vec<u8> {
        let mut writer = PdfWriter::new();
        writer
            .add_image_page(&sample_image(100, 100), None)
            .unwrap();
        writer.finish().unwrap()
    }

    // ── fit math ────────────────────────────────────────────────────────────

    #[test]
    fn test_fit_wide_content_is_width_bound() {
        let (w, h, x, y) = fit_into_content_box(2000.0, 1000.0);
        assert!((w - (PAGE_WIDTH - 2.0 * MARGIN)).abs() < 0.01);
        assert!((h - w / 2.0).abs() < 0.01);
        assert!((x - MARGIN).abs() < 0.01);
        assert!(y > MARGIN);
    }

    #[test]
    fn test_fit_tall_content_is_height_bound() {
        let (w, h, _, y) = fit_into_content_box(500.0, 4000.0);
        assert!((h - (PAGE_HEIGHT - 2.0 * MARGIN)).abs() < 0.01);
        assert!(w < PAGE_WIDTH - 2.0 * MARGIN);
        assert!((y - MARGIN).abs() < 0.01);
    }

    #[test]
    fn test_fit_small_content_is_upscaled() {
        let (w, h, _, _) = fit_into_content_box(10.0, 10.0);
        assert!(w > 10.0);
        assert!((w - h).abs() < 0.01);
    }

    // ── page assembly ───────────────────────────────────────────────────────

    #[test]
    fn test_image_pages_count() {
        let mut writer = PdfWriter::new();
        writer.add_image_page(&sample_image(80, 60), None).unwrap();
        writer.add_image_page(&sample_image(60, 80), None).unwrap();
        let bytes = writer.finish().unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn test_placeholder_page_is_a_real_page() {
        let mut writer = PdfWriter::new();
        writer
            .add_placeholder_page("김영희", "문서를 불러오지 못했습니다.")
            .unwrap();
        let bytes = writer.finish().unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_pdf_first_page_import() {
        let source = minimal_source_pdf();

        let mut writer = PdfWriter::new();
        writer.add_pdf_first_page(&source).unwrap();
        writer.add_placeholder_page("이몽룡", "오류").unwrap();
        let bytes = writer.finish().unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn test_multi_page_source_contributes_one_page() {
        let mut source_writer = PdfWriter::new();
        source_writer
            .add_image_page(&sample_image(50, 50), None)
            .unwrap();
        source_writer
            .add_image_page(&sample_image(50, 50), None)
            .unwrap();
        let source = source_writer.finish().unwrap();

        let mut writer = PdfWriter::new();
        writer.add_pdf_first_page(&source).unwrap();
        let bytes = writer.finish().unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    /// A 200x100 landscape page flagged with the given /Rotate value and an
    /// empty content stream.
    fn rotated_source_pdf(rotate: i64) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content = Content {
            operations: vec![Operation::new("q", vec![]), Operation::new("Q", vec![])],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 200.into(), 100.into()],
            "Rotate" => rotate,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut std::io::Cursor::new(&mut bytes)).unwrap();
        bytes
    }

    fn placement_matrix(bundle: &[u8]) -> Vec<f32> {
        let doc = Document::load_mem(bundle).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
        let cm = content
            .operations
            .iter()
            .find(|op| op.operator == "cm")
            .expect("page has a placement matrix");
        cm.operands.iter().map(|o| numeric(o).unwrap()).collect()
    }

    #[test]
    fn test_rotated_source_page_is_drawn_upright() {
        let source = rotated_source_pdf(90);

        let mut writer = PdfWriter::new();
        writer.add_pdf_first_page(&source).unwrap();
        let bundle = writer.finish().unwrap();

        let m = placement_matrix(&bundle);
        // 90° rotation: diagonal terms vanish, off-diagonals carry the scale.
        assert!(m[0].abs() < 1e-3 && m[3].abs() < 1e-3);
        assert!(m[1] < 0.0 && m[2] > 0.0);
        // The 200x100 box displays as 100x200, so the fit is height-bound:
        // scale = (841.89 - 80) / 200.
        let expected_scale = (PAGE_HEIGHT - 2.0 * MARGIN) / 200.0;
        assert!((m[2] - expected_scale).abs() < 0.01);
    }

    #[test]
    fn test_unrotated_source_page_keeps_plain_scaling() {
        let source = rotated_source_pdf(0);

        let mut writer = PdfWriter::new();
        writer.add_pdf_first_page(&source).unwrap();
        let bundle = writer.finish().unwrap();

        let m = placement_matrix(&bundle);
        assert!(m[1].abs() < 1e-3 && m[2].abs() < 1e-3);
        assert!(m[0] > 0.0 && (m[0] - m[3]).abs() < 1e-3);
    }

    #[test]
    fn test_full_turn_rotation_is_normalized() {
        let source = rotated_source_pdf(360);

        let mut writer = PdfWriter::new();
        writer.add_pdf_first_page(&source).unwrap();
        let bundle = writer.finish().unwrap();

        let m = placement_matrix(&bundle);
        assert!(m[1].abs() < 1e-3 && m[2].abs() < 1e-3);
    }

    #[test]
    fn test_garbage_bytes_are_an_error() {
        let mut writer = PdfWriter::new();
        assert!(writer.add_pdf_first_page(b"not a pdf at all").is_err());
    }

    #[test]
    fn test_centered_text_never_leaves_margin() {
        let long = "아주".repeat(100);
        assert!((centered_text_x(&long, TITLE_FONT_SIZE) - MARGIN).abs() < 0.01);
    }
}
