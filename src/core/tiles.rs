//! Splitting exported view images into slide-sized tiles
//!
//! Every view image is cut on a 2x2 grid. The top row is kept as a single
//! full-width band (the `(0, 1)` cell is never emitted) and the bottom row
//! yields one tile per column, so each view contributes three tiles:
//!
//! ```text
//! +-----------+-----------+
//! |       tile_0_0        |
//! +-----------+-----------+
//! | tile_1_0  | tile_1_1  |
//! +-----------+-----------+
//! ```
//!
//! Tile sizes use floor division; remainder pixels on the right and bottom
//! edges are dropped.

use crate::domain::errors::TabopsError;
use crate::domain::export::ImageIndex;
use crate::domain::result::Result;
use image::{GenericImageView, ImageFormat};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the tile folder inside a run's scratch directory
pub const TILE_DIR_NAME: &str = "slide_imgs";

/// Grid an image is cut on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    pub rows: u32,
    pub cols: u32,
}

impl TileGrid {
    /// The grid used for every export
    pub const SLIDE: TileGrid = TileGrid { rows: 2, cols: 2 };
}

/// Pixel rectangle of one tile within its source image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRegion {
    pub row: u32,
    pub col: u32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// One written tile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    /// Base name of the image the tile was cut from
    pub source: String,
    pub row: u32,
    pub col: u32,
    pub file_name: String,
}

/// Ordered tiles plus the folder holding them
///
/// The order is the page/slide order of the final document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileIndex {
    dir: PathBuf,
    tiles: Vec<Tile>,
}

impl TileIndex {
    pub fn new(dir: impl Into<PathBuf>, tiles: Vec<Tile>) -> Self {
        Self {
            dir: dir.into(),
            tiles,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Full paths of the tiles, in order
    pub fn paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.tiles.iter().map(|t| self.dir.join(&t.file_name))
    }
}

/// Computes the tile rectangles for a `width` x `height` image
///
/// # Errors
///
/// Returns [`TabopsError::Render`] when the image is smaller than the grid.
pub fn tile_regions(grid: TileGrid, width: u32, height: u32) -> Result<Vec<TileRegion>> {
    if grid.rows == 0 || grid.cols == 0 {
        return Err(TabopsError::Render("Tile grid must have rows and columns".to_string()));
    }
    if width < grid.cols || height < grid.rows {
        return Err(TabopsError::Render(format!(
            "Image of {width}x{height} pixels is too small for a {}x{} grid",
            grid.rows, grid.cols
        )));
    }

    let tile_width = width / grid.cols;
    let tile_height = height / grid.rows;
    let mut regions = Vec::with_capacity((grid.rows * grid.cols) as usize);

    for row in 0..grid.rows {
        if row == 0 {
            regions.push(TileRegion {
                row,
                col: 0,
                x: 0,
                y: 0,
                width,
                height: tile_height,
            });
            continue;
        }
        for col in 0..grid.cols {
            regions.push(TileRegion {
                row,
                col,
                x: col * tile_width,
                y: row * tile_height,
                width: tile_width,
                height: tile_height,
            });
        }
    }

    Ok(regions)
}

/// Cuts one image into tiles written to `output_dir`
///
/// Tiles are named `{base_name}_tile_{row}_{col}.png`.
pub fn split_image(
    image_path: &Path,
    base_name: &str,
    grid: TileGrid,
    output_dir: &Path,
) -> Result<Vec<Tile>> {
    let img = image::open(image_path).map_err(|e| {
        TabopsError::Render(format!(
            "Failed to open image {}: {}",
            image_path.display(),
            e
        ))
    })?;
    let (width, height) = img.dimensions();
    let regions = tile_regions(grid, width, height)?;

    fs::create_dir_all(output_dir)?;

    let mut tiles = Vec::with_capacity(regions.len());
    for region in regions {
        let file_name = format!("{base_name}_tile_{}_{}.png", region.row, region.col);
        let tile = img.crop_imm(region.x, region.y, region.width, region.height);
        tile.save_with_format(output_dir.join(&file_name), ImageFormat::Png)?;

        tracing::trace!(
            file = %file_name,
            width = region.width,
            height = region.height,
            "Wrote tile"
        );

        tiles.push(Tile {
            source: base_name.to_string(),
            row: region.row,
            col: region.col,
            file_name,
        });
    }

    Ok(tiles)
}

/// Tiles every image of the index, in index order
///
/// Images are read from `images_dir`; tiles go to `images_dir/slide_imgs`.
/// Files in `images_dir` that are not in the index are ignored.
pub fn split_index(images_dir: &Path, index: &ImageIndex, grid: TileGrid) -> Result<TileIndex> {
    let tile_dir = images_dir.join(TILE_DIR_NAME);
    let mut tiles = Vec::with_capacity(index.len() * 3);

    for file_name in index.files() {
        let base_name = Path::new(file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file_name.as_str());
        let mut image_tiles = split_image(&images_dir.join(file_name), base_name, grid, &tile_dir)?;
        tiles.append(&mut image_tiles);
    }

    tracing::info!(
        images = index.len(),
        tiles = tiles.len(),
        dir = %tile_dir.display(),
        "Split images into tiles"
    );

    Ok(TileIndex::new(tile_dir, tiles))
}
