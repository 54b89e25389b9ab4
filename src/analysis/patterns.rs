//! Image decomposition into tiles and multi-tile pattern units

use image::{RgbaImage, imageops};
use ndarray::Array2;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::io::configuration::DEFAULT_PATTERN_SIZE;
use crate::io::error::{AlgorithmError, Result, invalid_configuration, invalid_parameter};
use crate::spatial::tiles::{ContentHasher, TiledImage};

/// Which tiles around an anchor make up one unit
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum UnitShape {
    /// A single tile
    #[default]
    Tile,
    /// A `rows × cols` block of tiles anchored at its top-left tile
    Block {
        /// Tiles along the row axis
        rows: usize,
        /// Tiles along the column axis
        cols: usize,
    },
    /// The anchor tile plus `up` tiles above it and `left` tiles to its left
    UpLeft {
        /// Tiles above the anchor
        up: usize,
        /// Tiles left of the anchor
        left: usize,
    },
}

impl UnitShape {
    const NAMES: [&'static str; 3] = ["tile", "block", "up-left"];

    /// Same shape kind with different extents; `Tile` is unaffected
    #[must_use]
    pub const fn with_extent(self, rows: usize, cols: usize) -> Self {
        match self {
            Self::Tile => Self::Tile,
            Self::Block { .. } => Self::Block { rows, cols },
            Self::UpLeft { .. } => Self::UpLeft {
                up: rows,
                left: cols,
            },
        }
    }

    /// Member tile offsets `(row, col)` relative to the anchor, row-major
    pub fn offsets(self) -> Vec<(isize, isize)> {
        match self {
            Self::Tile => vec![(0, 0)],
            Self::Block { rows, cols } => (0..rows as isize)
                .flat_map(|row| (0..cols as isize).map(move |col| (row, col)))
                .collect(),
            Self::UpLeft { up, left } => {
                let above = (1..=up as isize).rev().map(|row| (-row, 0));
                let beside = (0..=left as isize).rev().map(|col| (0, -col));
                above.chain(beside).collect()
            }
        }
    }

    fn validate(self) -> Result<()> {
        match self {
            Self::Block { rows, cols } if rows == 0 || cols == 0 => Err(invalid_parameter(
                "pattern size",
                &format!("{rows}x{cols}"),
                &"block patterns need at least one row and column",
            )),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for UnitShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tile => f.write_str("tile"),
            Self::Block { rows, cols } => write!(f, "block {rows}x{cols}"),
            Self::UpLeft { up, left } => write!(f, "up-left {up}/{left}"),
        }
    }
}

impl FromStr for UnitShape {
    type Err = AlgorithmError;

    /// Parse the shape kind with default pattern extents
    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "tile" => Ok(Self::Tile),
            "block" => Ok(Self::Block {
                rows: DEFAULT_PATTERN_SIZE,
                cols: DEFAULT_PATTERN_SIZE,
            }),
            "up-left" => Ok(Self::UpLeft {
                up: DEFAULT_PATTERN_SIZE,
                left: DEFAULT_PATTERN_SIZE,
            }),
            _ => Err(invalid_configuration("shape", &value, &Self::NAMES)),
        }
    }
}

/// Splits images into tiles and groups them into units
#[derive(Clone, Copy, Debug)]
pub struct UnitExtractor {
    tile_width: u32,
    tile_height: u32,
    shape: UnitShape,
}

impl UnitExtractor {
    /// Create an extractor for `tile_width × tile_height` pixel tiles
    pub const fn new(tile_width: u32, tile_height: u32, shape: UnitShape) -> Self {
        Self {
            tile_width,
            tile_height,
            shape,
        }
    }

    /// Load a PNG file and decompose it
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be opened or decoded
    /// - The image cannot be decomposed (see [`Self::decompose`])
    pub fn from_png<P: AsRef<Path>>(&self, path: P) -> Result<TiledImage> {
        let path_buf = path.as_ref().to_path_buf();
        let image = image::open(&path_buf).map_err(|e| AlgorithmError::ImageLoad {
            path: path_buf,
            source: e,
        })?;
        self.decompose(&image.to_rgba8())
    }

    /// Decompose an image into a grid of units
    ///
    /// Trailing pixels that do not fill a whole tile are ignored. Pattern
    /// members past the image edge wrap around, so the unit grid always has
    /// one unit per tile.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The tile size or pattern extent is zero
    /// - The image is smaller than a single tile
    pub fn decompose(&self, image: &RgbaImage) -> Result<TiledImage> {
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err(invalid_parameter(
                "tile size",
                &format!("{}x{}", self.tile_width, self.tile_height),
                &"tiles must be at least one pixel wide and tall",
            ));
        }
        self.shape.validate()?;

        let cols = (image.width() / self.tile_width) as usize;
        let rows = (image.height() / self.tile_height) as usize;
        if rows == 0 || cols == 0 {
            return Err(AlgorithmError::InvalidSourceData {
                reason: format!(
                    "{}x{} image is smaller than one {}x{} tile",
                    image.width(),
                    image.height(),
                    self.tile_width,
                    self.tile_height
                ),
            });
        }

        let tiles = Array2::from_shape_fn((rows, cols), |(row, col)| {
            imageops::crop_imm(
                image,
                col as u32 * self.tile_width,
                row as u32 * self.tile_height,
                self.tile_width,
                self.tile_height,
            )
            .to_image()
        });

        let offsets = self.shape.offsets();
        let mut images = HashMap::new();
        let units = Array2::from_shape_fn((rows, cols), |(row, col)| {
            let mut hasher = ContentHasher::new();
            for &(d_row, d_col) in &offsets {
                let member = tiles.get([wrap(row, d_row, rows), wrap(col, d_col, cols)]);
                if let Some(tile) = member {
                    hasher.write(&d_row.to_le_bytes());
                    hasher.write(&d_col.to_le_bytes());
                    hasher.write(tile.as_raw());
                }
            }
            let unit = hasher.finish();
            if let Some(anchor) = tiles.get([row, col]) {
                images.entry(unit).or_insert_with(|| anchor.clone());
            }
            unit
        });

        tracing::debug!(
            rows,
            cols,
            units = images.len(),
            shape = %self.shape,
            "decomposed source image"
        );

        Ok(TiledImage::new(
            units,
            images,
            self.tile_width,
            self.tile_height,
        ))
    }
}

/// Index `base + offset` wrapped into `0..len`
fn wrap(base: usize, offset: isize, len: usize) -> usize {
    (base as isize + offset).rem_euclid(len as isize) as usize
}
