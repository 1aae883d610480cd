//! Document generation. Turns a résumé record into layout blocks and then
//! into PDF bytes.
//!
//! Flow: validate → optional logo → title + contact line → Profile, Experience,
//!       Education, Skills (each closed by a divider) → page break →
//!       paginate → serialise.
//!
//! Unlike refinement, nothing here degrades silently: any failure is returned.

pub mod pdf;

use std::io::Write;
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use crate::layout::{paginate, LayoutBlock, PageGeometry, US_LETTER};
use crate::models::resume::{ResumeRecord, ValidationError};
use crate::refinement::{Refine, DEFAULT_MAX_BULLETS};

pub const LOGO_WIDTH: f32 = 100.0;
pub const LOGO_HEIGHT: f32 = 50.0;

/// Space after the logo and contact line, and before each section header.
const BLOCK_GAP: f32 = 12.0;
/// Space before each item inside a section.
const ITEM_GAP: f32 = 6.0;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Logo image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
}

/// Résumé sections in render order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Profile,
    Experience,
    Education,
    Skills,
}

impl Section {
    pub const ORDER: [Section; 4] = [
        Section::Profile,
        Section::Experience,
        Section::Education,
        Section::Skills,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Section::Profile => "Profile",
            Section::Experience => "Experience",
            Section::Education => "Education",
            Section::Skills => "Skills",
        }
    }
}

/// Builds the fixed single-template résumé layout.
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    logo_path: Option<PathBuf>,
    geometry: PageGeometry,
    max_bullets: usize,
}

impl DocumentBuilder {
    pub fn new(logo_path: Option<PathBuf>) -> Self {
        Self {
            logo_path,
            geometry: US_LETTER,
            max_bullets: DEFAULT_MAX_BULLETS,
        }
    }

    /// Validates `record` and writes the complete PDF to `output`.
    ///
    /// Nothing is written when validation fails.
    #[cfg(test)]
    pub async fn render<W: Write>(
        &self,
        output: W,
        record: &ResumeRecord,
        refiner: &dyn Refine,
    ) -> Result<(), RenderError> {
        let blocks = self.build_blocks(record, refiner).await?;
        self.write_blocks(&blocks, output)
    }

    /// Produces the ordered block sequence for `record`.
    ///
    /// Experience details are refined one entry at a time, in input order.
    pub async fn build_blocks(
        &self,
        record: &ResumeRecord,
        refiner: &dyn Refine,
    ) -> Result<Vec<LayoutBlock>, RenderError> {
        record.validate()?;

        let mut blocks = Vec::new();

        // A missing logo is not an error.
        if let Some(logo) = self.logo_path.as_ref().filter(|p| p.is_file()) {
            blocks.push(LayoutBlock::Image {
                path: logo.clone(),
                width: LOGO_WIDTH,
                height: LOGO_HEIGHT,
            });
            blocks.push(LayoutBlock::Spacer(BLOCK_GAP));
        }

        blocks.push(LayoutBlock::Title(record.name.clone()));
        blocks.push(LayoutBlock::Paragraph(record.contact_line()));
        blocks.push(LayoutBlock::Spacer(BLOCK_GAP));

        for section in Section::ORDER {
            blocks.push(LayoutBlock::Spacer(BLOCK_GAP));
            blocks.push(LayoutBlock::SectionHeader(section.title().to_string()));

            match section {
                Section::Profile => {
                    blocks.push(LayoutBlock::Spacer(ITEM_GAP));
                    blocks.push(LayoutBlock::Paragraph(
                        record.profile.clone().unwrap_or_default(),
                    ));
                }
                Section::Experience => {
                    for entry in &record.experience {
                        blocks.push(LayoutBlock::Spacer(ITEM_GAP));
                        blocks.push(LayoutBlock::Subheading(entry.heading()));
                        let bullets = refiner.refine(&entry.details, self.max_bullets).await;
                        for bullet in bullets {
                            blocks.push(LayoutBlock::Spacer(ITEM_GAP));
                            blocks.push(LayoutBlock::Paragraph(bullet));
                        }
                    }
                }
                Section::Education => {
                    for entry in &record.education {
                        blocks.push(LayoutBlock::Spacer(ITEM_GAP));
                        blocks.push(LayoutBlock::Paragraph(entry.line()));
                    }
                }
                Section::Skills => {
                    for skill in &record.skills {
                        blocks.push(LayoutBlock::Spacer(ITEM_GAP));
                        blocks.push(LayoutBlock::Paragraph(skill.clone()));
                    }
                }
            }

            blocks.push(LayoutBlock::Divider);
        }

        blocks.push(LayoutBlock::PageBreak);
        Ok(blocks)
    }

    /// Paginates `blocks` and writes the PDF to `output`. CPU-bound.
    pub fn write_blocks<W: Write>(
        &self,
        blocks: &[LayoutBlock],
        output: W,
    ) -> Result<(), RenderError> {
        let pages = paginate(blocks, &self.geometry);
        debug!("Laid out {} blocks on {} pages", blocks.len(), pages.len());
        pdf::write_pdf(&pages, &self.geometry, output)
    }
}
