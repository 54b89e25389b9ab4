//! Unit identifiers and the tiled-image view of a decomposed source
//!
//! A unit is identified purely by its content: two tiles or patterns with
//! identical pixels (and, for patterns, identical member layout) hash to the
//! same id. The tiled image keeps one representative image per unit so that
//! generated grids can be rendered back into pixels.

use image::{Rgba, RgbaImage, imageops};
use ndarray::Array2;
use std::collections::HashMap;
use std::fmt;

use crate::io::configuration::BLANK_COLOR;
use crate::io::error::{AlgorithmError, Result, invalid_parameter};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0100_0000_01b3;

/// Opaque content-derived identifier of a tile or pattern
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Unit(u64);

impl Unit {
    /// Wrap a raw identifier
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw identifier value
    pub const fn id(self) -> u64 {
        self.0
    }

    /// Derive the identifier of a single block of content
    pub fn from_content(bytes: &[u8]) -> Self {
        let mut hasher = ContentHasher::new();
        hasher.write(bytes);
        hasher.finish()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:016x}", self.0)
    }
}

/// Incremental FNV-1a hasher producing unit identifiers
///
/// Stable across platforms and runs, unlike the std `DefaultHasher`.
#[derive(Clone, Debug)]
pub struct ContentHasher {
    state: u64,
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentHasher {
    /// Start a new hash
    pub const fn new() -> Self {
        Self {
            state: FNV_OFFSET_BASIS,
        }
    }

    /// Feed bytes into the hash
    pub fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= u64::from(byte);
            self.state = self.state.wrapping_mul(FNV_PRIME);
        }
    }

    /// Finish hashing and produce the unit identifier
    pub const fn finish(&self) -> Unit {
        Unit(self.state)
    }
}

/// Source image decomposed into a grid of units
///
/// `units` is indexed `[x, y]` with `x` running down the image rows.
pub struct TiledImage {
    units: Array2<Unit>,
    images: HashMap<Unit, RgbaImage>,
    tile_width: u32,
    tile_height: u32,
    blank: RgbaImage,
}

impl TiledImage {
    /// Assemble a tiled image from its unit grid and representative images
    pub fn new(
        units: Array2<Unit>,
        images: HashMap<Unit, RgbaImage>,
        tile_width: u32,
        tile_height: u32,
    ) -> Self {
        let blank = RgbaImage::from_pixel(tile_width, tile_height, Rgba(BLANK_COLOR));
        Self {
            units,
            images,
            tile_width,
            tile_height,
            blank,
        }
    }

    /// Unit grid of the source, used as the training grid
    pub const fn units(&self) -> &Array2<Unit> {
        &self.units
    }

    /// Representative image of a unit
    pub fn image(&self, unit: Unit) -> Option<&RgbaImage> {
        self.images.get(&unit)
    }

    /// Number of distinct units
    pub fn unit_count(&self) -> usize {
        self.images.len()
    }

    /// Tile size in pixels as `(width, height)`
    pub const fn tile_size(&self) -> (u32, u32) {
        (self.tile_width, self.tile_height)
    }

    /// Render a resolved grid into pixels
    ///
    /// Unresolved cells are drawn with the blank tile.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The output dimensions overflow `u32`
    /// - A cell holds a unit that this image never produced
    pub fn render(&self, resolved: &Array2<Option<Unit>>) -> Result<RgbaImage> {
        let (rows, cols) = resolved.dim();
        let pixel_width = u32::try_from(cols)
            .ok()
            .and_then(|cols| cols.checked_mul(self.tile_width))
            .ok_or_else(|| invalid_parameter("width", &cols, &"rendered image too wide"))?;
        let pixel_height = u32::try_from(rows)
            .ok()
            .and_then(|rows| rows.checked_mul(self.tile_height))
            .ok_or_else(|| invalid_parameter("height", &rows, &"rendered image too tall"))?;

        let mut canvas = RgbaImage::new(pixel_width, pixel_height);

        for ((x, y), cell) in resolved.indexed_iter() {
            let tile = match cell {
                Some(unit) => self.images.get(unit).ok_or_else(|| {
                    AlgorithmError::InvalidSourceData {
                        reason: format!("unit {unit} has no source image"),
                    }
                })?,
                None => &self.blank,
            };
            let left = y as i64 * i64::from(self.tile_width);
            let top = x as i64 * i64::from(self.tile_height);
            imageops::replace(&mut canvas, tile, left, top);
        }

        Ok(canvas)
    }

    /// Render the source itself, reassembled from representative images
    ///
    /// # Errors
    ///
    /// Returns an error if the output dimensions overflow `u32`
    pub fn render_source(&self) -> Result<RgbaImage> {
        self.render(&self.units.mapv(Some))
    }
}
