//! The intermediate representation between résumé data and the rendered PDF.

use std::path::PathBuf;

use crate::layout::font_metrics::FontFace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
}

/// Paragraph style for a text block. Sizes are in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub face: FontFace,
    pub size: f32,
    pub leading: f32,
    pub space_after: f32,
    pub alignment: Alignment,
    /// RGB fill colour, each channel 0.0 – 1.0.
    pub color: [f32; 3],
}

pub const TITLE_STYLE: TextStyle = TextStyle {
    face: FontFace::HelveticaBold,
    size: 24.0,
    leading: 28.8,
    space_after: 12.0,
    alignment: Alignment::Center,
    color: [0.0, 0.0, 0.0],
};

pub const SECTION_HEADER_STYLE: TextStyle = TextStyle {
    face: FontFace::HelveticaBold,
    size: 16.0,
    leading: 19.2,
    space_after: 6.0,
    alignment: Alignment::Left,
    // dark blue
    color: [0.0, 0.0, 0.545],
};

pub const SUBHEADING_STYLE: TextStyle = TextStyle {
    face: FontFace::HelveticaBold,
    size: 12.0,
    leading: 14.4,
    space_after: 4.0,
    alignment: Alignment::Left,
    color: [0.0, 0.0, 0.0],
};

pub const NORMAL_STYLE: TextStyle = TextStyle {
    face: FontFace::Helvetica,
    size: 11.0,
    leading: 13.2,
    space_after: 0.0,
    alignment: Alignment::Left,
    color: [0.0, 0.0, 0.0],
};

/// One unit of flowing content. Produced once per render and consumed by the paginator.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutBlock {
    /// A raster image drawn centered in the frame at a fixed size.
    Image {
        path: PathBuf,
        width: f32,
        height: f32,
    },
    Title(String),
    SectionHeader(String),
    Subheading(String),
    Paragraph(String),
    /// Horizontal rule closing a section.
    Divider,
    Spacer(f32),
    PageBreak,
}

impl LayoutBlock {
    /// Text and style for the text-bearing variants.
    pub fn text_with_style(&self) -> Option<(&str, &'static TextStyle)> {
        match self {
            LayoutBlock::Title(text) => Some((text.as_str(), &TITLE_STYLE)),
            LayoutBlock::SectionHeader(text) => Some((text.as_str(), &SECTION_HEADER_STYLE)),
            LayoutBlock::Subheading(text) => Some((text.as_str(), &SUBHEADING_STYLE)),
            LayoutBlock::Paragraph(text) => Some((text.as_str(), &NORMAL_STYLE)),
            _ => None,
        }
    }
}
