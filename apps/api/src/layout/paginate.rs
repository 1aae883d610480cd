//! Flows layout blocks onto fixed-size pages.
//!
//! Coordinates are PDF points with the origin at the bottom-left of the page.
//! The cursor tracks the top of the remaining free space in the frame.

use std::path::PathBuf;

use crate::layout::blocks::{Alignment, LayoutBlock, TextStyle};
use crate::layout::font_metrics::FontFace;

/// Vertical space reserved for a section divider; the rule sits in its middle.
const DIVIDER_HEIGHT: f32 = 8.0;
const DIVIDER_THICKNESS: f32 = 0.5;
const DIVIDER_GRAY: f32 = 0.6;

/// Paper size and margins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

/// US letter (8.5" × 11") with 1" margins on every side.
pub const US_LETTER: PageGeometry = PageGeometry {
    width: 612.0,
    height: 792.0,
    margin: 72.0,
};

impl PageGeometry {
    pub fn frame_left(&self) -> f32 {
        self.margin
    }

    pub fn frame_right(&self) -> f32 {
        self.width - self.margin
    }

    pub fn frame_top(&self) -> f32 {
        self.height - self.margin
    }

    pub fn frame_bottom(&self) -> f32 {
        self.margin
    }

    pub fn frame_width(&self) -> f32 {
        self.frame_right() - self.frame_left()
    }
}

/// A positioned drawing instruction on one page.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// A single line of text; `y` is the baseline.
    Text {
        x: f32,
        y: f32,
        face: FontFace,
        size: f32,
        color: [f32; 3],
        text: String,
    },
    Rule {
        x1: f32,
        x2: f32,
        y: f32,
        thickness: f32,
        gray: f32,
    },
    /// `x`/`y` is the lower-left corner.
    Image {
        path: PathBuf,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Lays `blocks` out on pages of `geometry`. Always returns at least one page.
///
/// A `PageBreak` only opens a new page once more content arrives, so a trailing
/// break never produces a blank page. Content taller than an empty frame is
/// placed anyway rather than looping.
pub fn paginate(blocks: &[LayoutBlock], geometry: &PageGeometry) -> Vec<Page> {
    let mut paginator = Paginator::new(geometry);
    for block in blocks {
        paginator.place(block);
    }
    paginator.finish()
}

struct Paginator<'a> {
    geometry: &'a PageGeometry,
    pages: Vec<Page>,
    current: Page,
    cursor: f32,
    break_pending: bool,
}

impl<'a> Paginator<'a> {
    fn new(geometry: &'a PageGeometry) -> Self {
        Self {
            geometry,
            pages: Vec::new(),
            current: Page::default(),
            cursor: geometry.frame_top(),
            break_pending: false,
        }
    }

    fn place(&mut self, block: &LayoutBlock) {
        match block {
            LayoutBlock::PageBreak => self.break_pending = true,
            LayoutBlock::Spacer(height) => {
                if !self.break_pending {
                    self.cursor -= height;
                }
            }
            LayoutBlock::Divider => {
                self.reserve(DIVIDER_HEIGHT);
                let y = self.cursor - DIVIDER_HEIGHT / 2.0;
                self.current.ops.push(DrawOp::Rule {
                    x1: self.geometry.frame_left(),
                    x2: self.geometry.frame_right(),
                    y,
                    thickness: DIVIDER_THICKNESS,
                    gray: DIVIDER_GRAY,
                });
                self.cursor -= DIVIDER_HEIGHT;
            }
            LayoutBlock::Image {
                path,
                width,
                height,
            } => {
                self.reserve(*height);
                let x = self.geometry.frame_left() + (self.geometry.frame_width() - width) / 2.0;
                self.current.ops.push(DrawOp::Image {
                    path: path.clone(),
                    x,
                    y: self.cursor - height,
                    width: *width,
                    height: *height,
                });
                self.cursor -= height;
            }
            LayoutBlock::Title(_)
            | LayoutBlock::SectionHeader(_)
            | LayoutBlock::Subheading(_)
            | LayoutBlock::Paragraph(_) => {
                if let Some((text, style)) = block.text_with_style() {
                    self.place_text(text, style);
                }
            }
        }
    }

    fn place_text(&mut self, text: &str, style: &TextStyle) {
        let metrics = style.face.metrics();
        let frame_width = self.geometry.frame_width();

        for line in metrics.wrap_lines(text, style.size, frame_width) {
            self.reserve(style.leading);
            let x = match style.alignment {
                Alignment::Left => self.geometry.frame_left(),
                Alignment::Center => {
                    let line_width = metrics.width_pt(&line, style.size);
                    self.geometry.frame_left() + (frame_width - line_width) / 2.0
                }
            };
            self.current.ops.push(DrawOp::Text {
                x,
                y: self.cursor - style.size,
                face: style.face,
                size: style.size,
                color: style.color,
                text: line,
            });
            self.cursor -= style.leading;
        }
        self.cursor -= style.space_after;
    }

    /// Makes room for `height` points of content, opening a new page if needed.
    fn reserve(&mut self, height: f32) {
        if self.break_pending {
            self.break_pending = false;
            if !self.current.is_empty() {
                self.new_page();
            }
        }
        if self.cursor - height < self.geometry.frame_bottom() && !self.current.is_empty() {
            self.new_page();
        }
    }

    fn new_page(&mut self) {
        let finished = std::mem::take(&mut self.current);
        self.pages.push(finished);
        self.cursor = self.geometry.frame_top();
    }

    fn finish(mut self) -> Vec<Page> {
        self.pages.push(self.current);
        self.pages
    }
}
