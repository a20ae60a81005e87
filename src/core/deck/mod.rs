//! Deck assembly: turning an ordered tile index into a document
//!
//! Two output formats share one contract. A title page or slide comes
//! first, then exactly one page or slide per tile, in index order, with the
//! tile scaled down to the content area and centered.
//!
//! - [`pdf`] writes a paginated PDF (page size and orientation selectable)
//! - [`pptx`] writes a PowerPoint deck (10in x 7.5in slides)
//! - [`layout`] holds the fit/center math both of them use

pub mod layout;
pub mod pdf;
pub mod pptx;

pub use pdf::{PdfDeck, PdfOptions};
pub use pptx::PptxDeck;

use crate::core::tiles::TileIndex;
use chrono::{DateTime, Local};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Writes a tile index out as a document
pub trait DeckWriter: Send + Sync {
    /// Writes the document to `output`, replacing any existing file
    ///
    /// Returns the number of pages or slides written, title included.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::TabopsError::Render`] when a tile cannot be
    /// read as an image.
    fn write(
        &self,
        tiles: &TileIndex,
        meta: &DeckMetadata,
        output: &Path,
    ) -> crate::domain::Result<usize>;
}

/// What the title page/slide shows
#[derive(Debug, Clone)]
pub struct DeckMetadata {
    pub workbook_name: String,
    pub project_name: String,
    pub generated_at: DateTime<Local>,
}

impl DeckMetadata {
    /// Metadata stamped with the current local time
    pub fn now(workbook_name: impl Into<String>, project_name: impl Into<String>) -> Self {
        Self {
            workbook_name: workbook_name.into(),
            project_name: project_name.into(),
            generated_at: Local::now(),
        }
    }

    pub fn title(&self) -> String {
        format!("Tableau Workbook Export: {}", self.workbook_name)
    }

    pub fn project_line(&self) -> String {
        format!("Project: {}", self.project_name)
    }

    pub fn timestamp_line(&self) -> String {
        format!(
            "Exported on: {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

/// Paper size for PDF output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    A3,
    A4,
    A5,
    B5,
    Executive,
    Folio,
    Ledger,
    Legal,
    Letter,
    Note,
    Quarto,
    Tabloid,
}

impl PageType {
    /// Width and height in millimetres, short side first
    pub fn portrait_mm(&self) -> (f64, f64) {
        match self {
            PageType::A3 => (297.0, 420.0),
            PageType::A4 => (210.0, 297.0),
            PageType::A5 => (148.0, 210.0),
            PageType::B5 => (176.0, 250.0),
            PageType::Executive => (184.15, 266.7),
            PageType::Folio => (215.9, 330.2),
            PageType::Ledger | PageType::Tabloid => (279.4, 431.8),
            PageType::Legal => (215.9, 355.6),
            PageType::Letter => (215.9, 279.4),
            PageType::Note => (190.5, 254.0),
            PageType::Quarto => (215.0, 275.0),
        }
    }

    /// Page size in millimetres for the given orientation
    pub fn size_mm(&self, orientation: Orientation) -> (f64, f64) {
        let (short, long) = self.portrait_mm();
        match orientation {
            Orientation::Portrait => (short, long),
            Orientation::Landscape => (long, short),
        }
    }
}

impl FromStr for PageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let page = match s.trim().to_lowercase().as_str() {
            "a3" => PageType::A3,
            "a4" => PageType::A4,
            "a5" => PageType::A5,
            "b5" => PageType::B5,
            "executive" => PageType::Executive,
            "folio" => PageType::Folio,
            "ledger" => PageType::Ledger,
            "legal" => PageType::Legal,
            "letter" => PageType::Letter,
            "note" => PageType::Note,
            "quarto" => PageType::Quarto,
            "tabloid" => PageType::Tabloid,
            other => {
                return Err(format!(
                    "Unsupported page type '{other}'. Use one of: A3, A4, A5, B5, Executive, \
                     Folio, Ledger, Legal, Letter, Note, Quarto, Tabloid"
                ))
            }
        };
        Ok(page)
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Page orientation for PDF output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "portrait" | "p" => Ok(Orientation::Portrait),
            "landscape" | "l" => Ok(Orientation::Landscape),
            other => Err(format!(
                "Unsupported orientation '{other}'. Use 'portrait' or 'landscape'"
            )),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Portrait => f.write_str("portrait"),
            Orientation::Landscape => f.write_str("landscape"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("A4", PageType::A4 ; "upper case")]
    #[test_case("a3", PageType::A3 ; "lower case")]
    #[test_case("Letter", PageType::Letter ; "mixed case")]
    #[test_case(" tabloid ", PageType::Tabloid ; "surrounding whitespace")]
    fn test_page_type_parse(input: &str, expected: PageType) {
        assert_eq!(input.parse::<PageType>().unwrap(), expected);
    }

    #[test]
    fn test_page_type_rejects_unknown() {
        assert!("A0".parse::<PageType>().is_err());
    }

    #[test_case("portrait", Orientation::Portrait)]
    #[test_case("P", Orientation::Portrait)]
    #[test_case("Landscape", Orientation::Landscape)]
    #[test_case("l", Orientation::Landscape)]
    fn test_orientation_parse(input: &str, expected: Orientation) {
        assert_eq!(input.parse::<Orientation>().unwrap(), expected);
    }

    #[test]
    fn test_landscape_swaps_sides() {
        assert_eq!(PageType::A4.size_mm(Orientation::Portrait), (210.0, 297.0));
        assert_eq!(PageType::A4.size_mm(Orientation::Landscape), (297.0, 210.0));
    }

    #[test]
    fn test_metadata_lines() {
        let meta = DeckMetadata::now("Sales", "Finance");
        assert_eq!(meta.title(), "Tableau Workbook Export: Sales");
        assert_eq!(meta.project_line(), "Project: Finance");
        assert!(meta.timestamp_line().starts_with("Exported on: "));
    }
}
