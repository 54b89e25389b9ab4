//! Frame capture and GIF generation for generation visualization

use image::Frame;
use ndarray::Array2;
use std::path::Path;

use crate::algorithm::executor::GenerationObserver;
use crate::io::configuration::{FINAL_FRAME_HOLD, VIEWER_MIN_FRAME_DELAY_MS};
use crate::io::error::{AlgorithmError, Result};
use crate::spatial::grid::{Grid, Position};
use crate::spatial::tiles::{TiledImage, Unit};

/// A cell whose resolved unit changed between two captured frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellChange {
    /// Changed cell
    pub position: Position,
    /// New resolved unit, `None` when the cell reopened after a rollback
    pub unit: Option<Unit>,
}

/// Captures the resolved grid over time for visualization
///
/// Only the cells that changed since the previous frame are stored, so
/// rollbacks during backtracking show up as cells reverting to blank.
pub struct VisualizationCapture {
    current: Array2<Option<Unit>>,
    frames: Vec<Vec<CellChange>>,
}

impl VisualizationCapture {
    /// Create a capture for a `width × height` grid
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            current: Array2::from_elem((width, height), None),
            frames: Vec::new(),
        }
    }

    /// Record the current state of `grid` as a new frame
    pub fn record(&mut self, grid: &Grid) {
        let resolved = grid.resolve();
        if resolved.dim() != self.current.dim() {
            self.current = Array2::from_elem(resolved.dim(), None);
        }

        let mut changes = Vec::new();
        for ((x, y), &unit) in resolved.indexed_iter() {
            if let Some(cell) = self.current.get_mut([x, y])
                && *cell != unit
            {
                *cell = unit;
                changes.push(CellChange {
                    position: Position::new(x, y),
                    unit,
                });
            }
        }
        self.frames.push(changes);
    }

    /// Recorded frames as change lists
    pub fn frames(&self) -> &[Vec<CellChange>] {
        &self.frames
    }

    /// Number of recorded frames
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Export the captured frames as a GIF with automatic frame skipping
    ///
    /// Automatically skips frames if the requested frame rate exceeds viewer capabilities.
    /// For example, if `frame_delay_ms` is 10ms (100 FPS) but viewers only support 50ms (20 FPS),
    /// this will keep every 5th frame to maintain the apparent animation speed.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No frames were captured
    /// - A captured unit has no image in `tiled`
    /// - File system operations fail
    /// - GIF encoding fails
    pub fn export_gif<P: AsRef<Path>>(
        &self,
        tiled: &TiledImage,
        output_path: P,
        frame_delay_ms: u32,
    ) -> Result<()> {
        let output_path = output_path.as_ref();
        if self.frames.is_empty() {
            return Err(AlgorithmError::InvalidSourceData {
                reason: "No frames captured for visualization".to_string(),
            });
        }

        let effective_delay_ms = frame_delay_ms.max(VIEWER_MIN_FRAME_DELAY_MS);
        let skip_factor = if frame_delay_ms < VIEWER_MIN_FRAME_DELAY_MS {
            VIEWER_MIN_FRAME_DELAY_MS.div_ceil(frame_delay_ms.max(1))
        } else {
            1
        };

        let frames = self.generate_frames(tiled, effective_delay_ms, skip_factor as usize)?;

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AlgorithmError::FileSystem {
                path: parent.to_path_buf(),
                operation: "create directory",
                source: e,
            })?;
        }

        let file = std::fs::File::create(output_path).map_err(|e| AlgorithmError::FileSystem {
            path: output_path.to_path_buf(),
            operation: "create file",
            source: e,
        })?;

        let mut encoder = image::codecs::gif::GifEncoder::new(file);
        encoder
            .encode_frames(frames)
            .map_err(|e| AlgorithmError::ImageExport {
                path: output_path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    fn generate_frames(
        &self,
        tiled: &TiledImage,
        delay_ms: u32,
        skip_factor: usize,
    ) -> Result<Vec<Frame>> {
        let mut state = Array2::from_elem(self.current.dim(), None);
        let mut frames = Vec::new();
        let mut frame_count = 0;

        for changes in &self.frames {
            for change in changes {
                if let Some(cell) = state.get_mut([change.position.x, change.position.y]) {
                    *cell = change.unit;
                }
            }

            frame_count += 1;
            if frame_count % skip_factor == 0 {
                frames.push(render_frame(tiled, &state, delay_ms)?);
            }
        }

        if frame_count % skip_factor != 0 {
            frames.push(render_frame(tiled, &state, delay_ms)?);
        }

        // Final frame displays longer for better visibility
        if let Some(last_frame_img) = frames.last().map(|f| f.buffer().clone()) {
            frames.push(Frame::from_parts(
                last_frame_img,
                0,
                0,
                image::Delay::from_numer_denom_ms(delay_ms * FINAL_FRAME_HOLD, 1),
            ));
        }

        Ok(frames)
    }
}

fn render_frame(tiled: &TiledImage, state: &Array2<Option<Unit>>, delay_ms: u32) -> Result<Frame> {
    Ok(Frame::from_parts(
        tiled.render(state)?,
        0,
        0,
        image::Delay::from_numer_denom_ms(delay_ms, 1),
    ))
}

impl GenerationObserver for VisualizationCapture {
    fn before_collapse(&mut self, grid: &Grid, _position: Position) {
        self.record(grid);
    }

    fn finished(&mut self, grid: &Grid) {
        self.record(grid);
    }
}
