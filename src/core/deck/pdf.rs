//! Paginated PDF output
//!
//! Built with `printpdf`, whose coordinate origin is the bottom-left corner
//! of the page. Layout is computed top-down in millimetres and flipped when
//! handed to the PDF layer.

use super::layout;
use super::{DeckMetadata, DeckWriter, Orientation, PageType};
use crate::config::ExportSettings;
use crate::core::tiles::TileIndex;
use crate::domain::errors::TabopsError;
use crate::domain::result::Result;
use image::{DynamicImage, GenericImageView};
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference,
};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

const LAYER_NAME: &str = "Layer 1";
const MM_PER_INCH: f64 = 25.4;
const MM_PER_POINT: f64 = MM_PER_INCH / 72.0;
const TITLE_LINE_HEIGHT_MM: f64 = 10.0;
/// Average Helvetica glyph width as a fraction of the font size
const HELVETICA_AVG_WIDTH: f64 = 0.5;

/// Page and placement settings for PDF output
#[derive(Debug, Clone, PartialEq)]
pub struct PdfOptions {
    pub page_type: PageType,
    pub orientation: Orientation,
    pub margin_mm: f64,
    pub auto_page_break: bool,
    pub image_dpi: f64,
}

impl PdfOptions {
    /// Options from the `[export]` section, with optional CLI overrides
    pub fn from_settings(
        settings: &ExportSettings,
        page_type: Option<&str>,
        orientation: Option<&str>,
    ) -> Result<Self> {
        let page_type = page_type
            .unwrap_or(&settings.default_page_type)
            .parse::<PageType>()
            .map_err(TabopsError::Configuration)?;
        let orientation = orientation
            .unwrap_or(&settings.default_orientation)
            .parse::<Orientation>()
            .map_err(TabopsError::Configuration)?;

        Ok(Self {
            page_type,
            orientation,
            margin_mm: settings.pdf_margin_mm,
            auto_page_break: settings.auto_page_break,
            image_dpi: settings.image_dpi,
        })
    }

    pub fn page_size_mm(&self) -> (f64, f64) {
        self.page_type.size_mm(self.orientation)
    }

    /// Page size minus the margin on every side
    pub fn content_size_mm(&self) -> (f64, f64) {
        let (w, h) = self.page_size_mm();
        (
            (w - 2.0 * self.margin_mm).max(0.0),
            (h - 2.0 * self.margin_mm).max(0.0),
        )
    }

    fn px_to_mm(&self, px: u32) -> f64 {
        f64::from(px) / self.image_dpi * MM_PER_INCH
    }
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            page_type: PageType::A4,
            orientation: Orientation::Landscape,
            margin_mm: 15.0,
            auto_page_break: true,
            image_dpi: 96.0,
        }
    }
}

/// Writes a title page followed by one page per tile
pub struct PdfDeck {
    options: PdfOptions,
}

impl PdfDeck {
    pub fn new(options: PdfOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PdfOptions {
        &self.options
    }

    fn new_page(&self, doc: &PdfDocumentReference) -> PdfLayerReference {
        let (w, h) = self.options.page_size_mm();
        let (page, layer) = doc.add_page(Mm(w as f32), Mm(h as f32), LAYER_NAME);
        doc.get_page(page).get_layer(layer)
    }

    /// Lays out the title block; returns the number of pages it used
    fn write_title(
        &self,
        doc: &PdfDocumentReference,
        first_layer: PdfLayerReference,
        meta: &DeckMetadata,
        bold: &IndirectFontRef,
        oblique: &IndirectFontRef,
    ) -> usize {
        let (page_w, page_h) = self.options.page_size_mm();
        let bottom_limit = page_h - self.options.margin_mm;
        let lines = [
            (meta.title(), 24.0, bold),
            (meta.project_line(), 16.0, oblique),
            (meta.timestamp_line(), 12.0, oblique),
        ];

        let block_height = TITLE_LINE_HEIGHT_MM * lines.len() as f64;
        let mut top = (page_h - block_height) / 2.0;
        let mut layer = first_layer;
        let mut pages = 1;

        for (text, size, font) in lines {
            if self.options.auto_page_break && top + TITLE_LINE_HEIGHT_MM > bottom_limit {
                layer = self.new_page(doc);
                pages += 1;
                top = self.options.margin_mm;
            }

            let width = text_width_mm(&text, size);
            let x = ((page_w - width) / 2.0).max(0.0);
            let baseline = top + TITLE_LINE_HEIGHT_MM * 0.7;
            layer.use_text(text, size as f32, Mm(x as f32), Mm((page_h - baseline) as f32), font);
            top += TITLE_LINE_HEIGHT_MM;
        }

        pages
    }
}

impl DeckWriter for PdfDeck {
    fn write(&self, tiles: &TileIndex, meta: &DeckMetadata, output: &Path) -> Result<usize> {
        let (page_w, page_h) = self.options.page_size_mm();
        let (content_w, content_h) = self.options.content_size_mm();

        let (doc, page, layer) =
            PdfDocument::new(meta.title(), Mm(page_w as f32), Mm(page_h as f32), LAYER_NAME);
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
        let oblique = doc.add_builtin_font(BuiltinFont::HelveticaOblique)?;

        let first_layer = doc.get_page(page).get_layer(layer);
        let mut pages = self.write_title(&doc, first_layer, meta, &bold, &oblique);

        for path in tiles.paths() {
            let img = image::open(&path).map_err(|e| {
                TabopsError::Render(format!("Failed to open tile {}: {}", path.display(), e))
            })?;
            let (px_w, px_h) = img.dimensions();
            let native_w = self.options.px_to_mm(px_w);
            let native_h = self.options.px_to_mm(px_h);
            let placement =
                layout::place(native_w, native_h, content_w, content_h, page_w, page_h);

            let layer = self.new_page(&doc);
            pages += 1;

            let pdf_image = Image::from_dynamic_image(&DynamicImage::ImageRgb8(img.to_rgb8()));
            pdf_image.add_to_layer(
                layer,
                ImageTransform {
                    translate_x: Some(Mm(placement.x as f32)),
                    translate_y: Some(Mm((page_h - placement.y - placement.height) as f32)),
                    scale_x: Some((placement.width / native_w) as f32),
                    scale_y: Some((placement.height / native_h) as f32),
                    dpi: Some(self.options.image_dpi as f32),
                    ..Default::default()
                },
            );

            tracing::debug!(tile = %path.display(), page = pages, "Added tile to PDF");
        }

        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(output)?;
        doc.save(&mut BufWriter::new(file))?;

        tracing::info!(
            path = %output.display(),
            pages,
            page_type = %self.options.page_type,
            orientation = %self.options.orientation,
            "Saved PDF deck"
        );

        Ok(pages)
    }
}

/// Approximate rendered width of `text` in Helvetica at `size_pt`
fn text_width_mm(text: &str, size_pt: f64) -> f64 {
    text.chars().count() as f64 * size_pt * HELVETICA_AVG_WIDTH * MM_PER_POINT
}
