//! PNG export of generated grids

use ndarray::Array2;
use std::path::Path;

use crate::io::error::{AlgorithmError, Result};
use crate::spatial::tiles::{TiledImage, Unit};

/// Render a resolved grid through `tiled` and save it as a PNG
///
/// Unresolved cells are drawn blank. Missing parent directories are created.
///
/// # Errors
///
/// Returns an error if:
/// - The grid holds a unit `tiled` has no image for
/// - The parent directory cannot be created
/// - The image cannot be saved to the specified path
pub fn export_grid_as_png<P: AsRef<Path>>(
    tiled: &TiledImage,
    resolved: &Array2<Option<Unit>>,
    output_path: P,
) -> Result<()> {
    let output_path = output_path.as_ref();
    let image = tiled.render(resolved)?;

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| AlgorithmError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }

    image
        .save(output_path)
        .map_err(|e| AlgorithmError::ImageExport {
            path: output_path.to_path_buf(),
            source: e,
        })?;

    Ok(())
}
