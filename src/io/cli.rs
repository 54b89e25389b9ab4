//! Command-line interface for batch processing PNG files with pattern generation

use crate::algorithm::executor::{GenerationConfig, GenerationObserver, Solver};
use crate::algorithm::propagation::UpdatingMode;
use crate::algorithm::selection::EntropyMode;
use crate::analysis::patterns::{UnitExtractor, UnitShape};
use crate::analysis::statistics::StatisticalModel;
use crate::analysis::weights::WeightingMode;
use crate::io::configuration::{
    DEFAULT_OUTPUT_HEIGHT, DEFAULT_OUTPUT_WIDTH, DEFAULT_PATTERN_SIZE, DEFAULT_SEED,
    DEFAULT_TILE_SIZE, GIF_FRAME_DELAY_MS, MAX_GRID_DIMENSION, OUTPUT_SUFFIX,
};
use crate::io::error::{AlgorithmError, Result, invalid_parameter};
use crate::io::image::export_grid_as_png;
use crate::io::progress::ProgressManager;
use crate::io::visualization::VisualizationCapture;
use crate::spatial::grid::{Grid, Position};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Instant;

const VISUALIZATION_SUFFIX: &str = "_visualization";

#[derive(Parser)]
#[command(name = "contextile")]
#[command(
    author,
    version,
    about = "Generate images from a sample using context-sensitive wave function collapse"
)]
/// Command-line arguments for the generation tool
// CLI tools commonly need multiple boolean flags for various features and user preferences
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Input PNG file or directory to process
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Random seed for reproducible generation
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Output extent along x in units (grid rows)
    #[arg(short = 'W', long, default_value_t = DEFAULT_OUTPUT_WIDTH)]
    pub width: usize,

    /// Output extent along y in units (grid columns)
    #[arg(short = 'H', long, default_value_t = DEFAULT_OUTPUT_HEIGHT)]
    pub height: usize,

    /// Tile width in pixels
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE)]
    pub tile_width: u32,

    /// Tile height in pixels
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE)]
    pub tile_height: u32,

    /// Unit shape: tile, block or up-left
    #[arg(long, default_value = "tile")]
    pub shape: UnitShape,

    /// Pattern rows (block) or tiles above the anchor (up-left)
    #[arg(long, default_value_t = DEFAULT_PATTERN_SIZE)]
    pub pattern_rows: usize,

    /// Pattern columns (block) or tiles left of the anchor (up-left)
    #[arg(long, default_value_t = DEFAULT_PATTERN_SIZE)]
    pub pattern_cols: usize,

    /// Candidate weighting: uniform, frequency or context
    #[arg(long, default_value = "uniform")]
    pub weighting: WeightingMode,

    /// Propagation reach: neighbor or chain
    #[arg(long, default_value = "chain")]
    pub updating: UpdatingMode,

    /// Cell scoring: domain-size, shannon, scan-a or scan-b
    #[arg(long, default_value = "scan-a")]
    pub entropy: EntropyMode,

    /// Roll back contradictions instead of leaving cells unresolved
    #[arg(short, long)]
    pub backtrack: bool,

    /// Give up backtracking after this many collapse attempts
    #[arg(long)]
    pub attempt_limit: Option<usize>,

    /// Enable visualization output as animated GIF
    #[arg(short, long)]
    pub visualize: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Process files even if output exists
    #[arg(short, long)]
    pub no_skip: bool,

    /// Increase log verbosity (repeatable)
    #[arg(long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Check if existing output files should be skipped
    pub const fn skip_existing(&self) -> bool {
        !self.no_skip
    }

    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Unit shape with the requested pattern extents
    pub const fn unit_shape(&self) -> UnitShape {
        self.shape.with_extent(self.pattern_rows, self.pattern_cols)
    }

    /// Solver configuration described by the arguments
    ///
    /// # Errors
    ///
    /// Returns an error if an output dimension is zero or exceeds
    /// `MAX_GRID_DIMENSION`
    pub fn generation_config(&self) -> Result<GenerationConfig> {
        for (parameter, value) in [("width", self.width), ("height", self.height)] {
            if value == 0 || value > MAX_GRID_DIMENSION {
                return Err(invalid_parameter(
                    parameter,
                    &value,
                    &format!("must be between 1 and {MAX_GRID_DIMENSION}"),
                ));
            }
        }

        Ok(GenerationConfig {
            width: self.width,
            height: self.height,
            weighting: self.weighting,
            updating: self.updating,
            entropy: self.entropy,
            seed: self.seed,
            backtracking: self.backtrack,
            attempt_limit: self.attempt_limit,
        })
    }
}

/// Forwards generation events to several observers
struct Observers<'a>(Vec<&'a mut dyn GenerationObserver>);

impl GenerationObserver for Observers<'_> {
    fn before_collapse(&mut self, grid: &Grid, position: Position) {
        for observer in &mut self.0 {
            observer.before_collapse(grid, position);
        }
    }

    fn finished(&mut self, grid: &Grid) {
        for observer in &mut self.0 {
            observer.finished(grid);
        }
    }
}

/// Orchestrates batch processing of PNG files with progress tracking
pub struct FileProcessor {
    cli: Cli,
    progress_manager: Option<ProgressManager>,
}

impl FileProcessor {
    /// Create a new file processor with the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress_manager = cli.should_show_progress().then(ProgressManager::new);

        Self {
            cli,
            progress_manager,
        }
    }

    /// Process files according to CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The arguments describe an invalid configuration
    /// - The target is neither a PNG file nor a directory
    /// - Any file fails to load, generate or export
    pub fn process(&mut self) -> Result<()> {
        let config = self.cli.generation_config()?;
        let files = self.collect_files()?;

        if files.is_empty() {
            return Ok(());
        }

        if let Some(pm) = &mut self.progress_manager {
            pm.initialize(files.len());
        }

        for (index, file) in files.iter().enumerate() {
            self.process_file(file, index, &config)?;
        }

        if let Some(pm) = &self.progress_manager {
            pm.finish();
        }

        Ok(())
    }

    fn collect_files(&self) -> Result<Vec<PathBuf>> {
        let target = &self.cli.target;
        if target.is_file() {
            if is_png(target) {
                Ok(self
                    .should_process_file(target)
                    .then(|| target.clone())
                    .into_iter()
                    .collect())
            } else {
                Err(invalid_parameter(
                    "target",
                    &target.display(),
                    &"target file must be a PNG image",
                ))
            }
        } else if target.is_dir() {
            let mut files = Vec::new();
            let entries = std::fs::read_dir(target).map_err(|e| {
                AlgorithmError::FileSystem {
                    path: target.clone(),
                    operation: "read directory",
                    source: e,
                }
            })?;
            for entry in entries {
                let path = entry?.path();
                if is_png(&path) && !is_generated(&path) && self.should_process_file(&path) {
                    files.push(path);
                }
            }
            files.sort();
            Ok(files)
        } else {
            Err(invalid_parameter(
                "target",
                &target.display(),
                &"target must be a PNG file or directory",
            ))
        }
    }

    fn should_process_file(&self, input_path: &Path) -> bool {
        if !self.cli.skip_existing() {
            return true;
        }

        let output_path = Self::get_output_path(input_path);
        if output_path.exists() {
            // Allow print for user feedback for progress messages
            #[allow(clippy::print_stderr)]
            if !self.cli.quiet {
                eprintln!("Skipping: {} (output exists)", input_path.display());
            }
            false
        } else {
            true
        }
    }

    fn process_file(
        &mut self,
        input_path: &Path,
        index: usize,
        config: &GenerationConfig,
    ) -> Result<()> {
        let start_time = Instant::now();

        let extractor =
            UnitExtractor::new(self.cli.tile_width, self.cli.tile_height, self.cli.unit_shape());
        let tiled = extractor.from_png(input_path)?;
        let model = StatisticalModel::train(tiled.units());

        if let Some(pm) = &mut self.progress_manager {
            pm.start_file(index, input_path, config.width * config.height);
        }

        let mut capture = self
            .cli
            .visualize
            .then(|| VisualizationCapture::new(config.width, config.height));

        let solver = Solver::new(&model);
        let generation = {
            let mut progress = self
                .progress_manager
                .as_mut()
                .map(|pm| pm.observer(index));
            let mut observers = Observers(Vec::new());
            if let Some(progress) = &mut progress {
                observers.0.push(progress);
            }
            if let Some(capture) = &mut capture {
                observers.0.push(capture);
            }
            solver.generate_observed(config, &mut observers)?
        };

        export_grid_as_png(&tiled, &generation.resolve(), Self::get_output_path(input_path))?;

        if let Some(capture) = &capture {
            capture.export_gif(
                &tiled,
                Self::get_visualization_path(input_path),
                GIF_FRAME_DELAY_MS,
            )?;
        }

        if let Some(pm) = &mut self.progress_manager {
            pm.complete_file(index);
        }

        tracing::info!(
            file = %input_path.display(),
            units = model.unit_count(),
            complete = generation.is_complete(),
            elapsed_ms = start_time.elapsed().as_millis(),
            "processed file"
        );

        Ok(())
    }

    fn get_output_path(input_path: &Path) -> PathBuf {
        sibling_path(input_path, OUTPUT_SUFFIX, "png")
    }

    fn get_visualization_path(input_path: &Path) -> PathBuf {
        sibling_path(input_path, VISUALIZATION_SUFFIX, "gif")
    }
}

fn is_png(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case("png"))
}

/// Outputs of earlier runs living next to their inputs
fn is_generated(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|stem| stem.ends_with(OUTPUT_SUFFIX))
}

fn sibling_path(input_path: &Path, suffix: &str, extension: &str) -> PathBuf {
    let stem = input_path.file_stem().unwrap_or_default();
    let name = format!("{}{suffix}.{extension}", stem.to_string_lossy());

    if let Some(parent) = input_path.parent() {
        parent.join(name)
    } else {
        PathBuf::from(name)
    }
}
