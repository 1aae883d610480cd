//! Serialises paginated draw operations into a PDF 1.5 file with `lopdf`.
//!
//! Text uses the standard-14 Helvetica faces with WinAnsi encoding, so no font
//! files are embedded. Nothing time- or randomness-dependent is written: the same
//! pages always serialise to the same bytes.

use std::collections::BTreeMap;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::{write::ZlibEncoder, Compression};
use image::{ImageError, ImageReader};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::layout::font_metrics::FontFace;
use crate::layout::{DrawOp, Page, PageGeometry};
use crate::render::RenderError;

/// Resource name and object id of an embedded image, keyed by source path.
type ImageResources = BTreeMap<PathBuf, (String, ObjectId)>;

pub fn write_pdf<W: Write>(
    pages: &[Page],
    geometry: &PageGeometry,
    output: W,
) -> Result<(), RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for face in [FontFace::Helvetica, FontFace::HelveticaBold] {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => face.base_font(),
            "Encoding" => "WinAnsiEncoding"
        });
        fonts.set(face.resource_name(), font_id);
    }

    let images = embed_images(&mut doc, pages)?;
    let mut xobjects = Dictionary::new();
    for (name, id) in images.values() {
        xobjects.set(name.as_str(), *id);
    }

    let mut kids = Vec::with_capacity(pages.len());
    for page in pages {
        let content = page_content(page, &images);
        let stream = deflate_stream(Dictionary::new(), &content.encode()?)?;
        let content_id = doc.add_object(stream);

        let mut resources = dictionary! { "Font" => fonts.clone() };
        if !images.is_empty() {
            resources.set("XObject", xobjects.clone());
        }

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                real(geometry.width),
                real(geometry.height)
            ]
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id
    });
    doc.trailer.set("Root", catalog_id);

    let mut writer = BufWriter::new(output);
    doc.save_to(&mut writer)?;
    writer.flush()?;
    Ok(())
}

fn page_content(page: &Page, images: &ImageResources) -> Content {
    let mut operations = Vec::new();

    for op in &page.ops {
        match op {
            DrawOp::Text {
                x,
                y,
                face,
                size,
                color,
                text,
            } => {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new(
                    "Tf",
                    vec![face.resource_name().into(), real(*size)],
                ));
                operations.push(Operation::new(
                    "rg",
                    vec![real(color[0]), real(color[1]), real(color[2])],
                ));
                operations.push(Operation::new("Td", vec![real(*x), real(*y)]));
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
                ));
                operations.push(Operation::new("ET", vec![]));
            }
            DrawOp::Rule {
                x1,
                x2,
                y,
                thickness,
                gray,
            } => {
                operations.push(Operation::new("q", vec![]));
                operations.push(Operation::new("G", vec![real(*gray)]));
                operations.push(Operation::new("w", vec![real(*thickness)]));
                operations.push(Operation::new("m", vec![real(*x1), real(*y)]));
                operations.push(Operation::new("l", vec![real(*x2), real(*y)]));
                operations.push(Operation::new("S", vec![]));
                operations.push(Operation::new("Q", vec![]));
            }
            DrawOp::Image {
                path,
                x,
                y,
                width,
                height,
            } => {
                // embed_images registers every path that appears in the pages
                let Some((name, _)) = images.get(path) else {
                    continue;
                };
                operations.push(Operation::new("q", vec![]));
                operations.push(Operation::new(
                    "cm",
                    vec![
                        real(*width),
                        real(0.0),
                        real(0.0),
                        real(*height),
                        real(*x),
                        real(*y),
                    ],
                ));
                operations.push(Operation::new("Do", vec![name.as_str().into()]));
                operations.push(Operation::new("Q", vec![]));
            }
        }
    }

    Content { operations }
}

/// Adds one image XObject per distinct path drawn on any page.
fn embed_images(doc: &mut Document, pages: &[Page]) -> Result<ImageResources, RenderError> {
    let mut images = ImageResources::new();
    for op in pages.iter().flat_map(|page| &page.ops) {
        if let DrawOp::Image { path, .. } = op {
            if images.contains_key(path) {
                continue;
            }
            let stream = image_stream(doc, path)?;
            let id = doc.add_object(stream);
            let name = format!("Im{}", images.len() + 1);
            images.insert(path.clone(), (name, id));
        }
    }
    Ok(images)
}

/// Decodes the image at `path` into an RGB XObject. The alpha channel, when
/// present, becomes a DeviceGray soft mask so transparent pixels stay transparent.
///
/// The format is sniffed from the file contents, not the extension.
fn image_stream(doc: &mut Document, path: &Path) -> Result<Stream, RenderError> {
    let img = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(ImageError::IoError)?
        .decode()?;
    let (width, height) = (img.width(), img.height());

    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => i64::from(width),
        "Height" => i64::from(height),
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8_i64
    };

    if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        let mut rgb = Vec::with_capacity(rgba.as_raw().len() / 4 * 3);
        let mut alpha = Vec::with_capacity(rgba.as_raw().len() / 4);
        for pixel in rgba.pixels() {
            rgb.extend_from_slice(&pixel.0[..3]);
            alpha.push(pixel.0[3]);
        }

        let mask = deflate_stream(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(width),
                "Height" => i64::from(height),
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8_i64
            },
            &alpha,
        )?;
        dict.set("SMask", doc.add_object(mask));
        return deflate_stream(dict, &rgb);
    }

    deflate_stream(dict, img.to_rgb8().as_raw())
}

fn deflate_stream(mut dict: Dictionary, data: &[u8]) -> Result<Stream, RenderError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    let compressed = encoder.finish()?;
    dict.set("Filter", "FlateDecode");
    Ok(Stream::new(dict, compressed))
}

fn real(value: f32) -> Object {
    Object::Real(value)
}

/// Maps text onto WinAnsiEncoding. Characters outside it become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            _ => b'?',
        })
        .collect()
}
