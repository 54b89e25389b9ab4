//! Multi-file progress tracking with automatic batching for large sets

use crate::algorithm::executor::GenerationObserver;
use crate::io::configuration::MAX_INDIVIDUAL_PROGRESS_BARS;
use crate::spatial::grid::{Grid, Position};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::LazyLock;

/// Display state of one file: name, collapsed cells, total cells
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct FileState {
    name: String,
    collapsed: usize,
    cells: usize,
}

/// Coordinates progress display for batch generation
///
/// Shows one bar per file for small batches and adds a batch bar counting
/// finished files once the batch outgrows the individual bars.
pub struct ProgressManager {
    multi_progress: MultiProgress,
    batch_bar: Option<ProgressBar>,
    file_bars: Vec<ProgressBar>,
    file_states: Vec<FileState>,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

static PROGRESS_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("{msg} [{bar:30.cyan/blue}] {prefix}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

static BATCH_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] Files: [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

impl ProgressManager {
    /// Create a new progress manager
    pub fn new() -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            batch_bar: None,
            file_bars: Vec::new(),
            file_states: Vec::new(),
        }
    }

    /// Create the bars for a batch of `file_count` files
    pub fn initialize(&mut self, file_count: usize) {
        if file_count > MAX_INDIVIDUAL_PROGRESS_BARS + 1 {
            let batch_bar = ProgressBar::new(file_count as u64);
            batch_bar.set_style(BATCH_STYLE.clone());
            self.batch_bar = Some(self.multi_progress.add(batch_bar));
        }

        for _ in 0..file_count.min(MAX_INDIVIDUAL_PROGRESS_BARS) {
            let bar = ProgressBar::new(0);
            bar.set_style(PROGRESS_STYLE.clone());
            self.file_bars.push(self.multi_progress.add(bar));
        }
    }

    /// Start tracking a file whose output grid has `cells` cells
    pub fn start_file(&mut self, index: usize, path: &Path, cells: usize) {
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        if index >= self.file_states.len() {
            self.file_states.resize(index + 1, FileState::default());
        }
        if let Some(state) = self.file_states.get_mut(index) {
            *state = FileState {
                name,
                collapsed: 0,
                cells,
            };
        }
        self.update_bars();
    }

    /// Report how many cells of a file are currently collapsed
    pub fn update_collapsed(&mut self, index: usize, collapsed: usize) {
        if let Some(state) = self.file_states.get_mut(index) {
            state.collapsed = collapsed.min(state.cells);
        }
        self.update_bars();
    }

    /// Mark a file as done
    pub fn complete_file(&mut self, index: usize) {
        if let Some(batch_bar) = &self.batch_bar {
            batch_bar.inc(1);
        }

        if let Some(state) = self.file_states.get_mut(index) {
            state.name = format!("✓ {}", state.name);
            state.collapsed = state.cells;
        }
        self.update_bars();
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        if let Some(batch_bar) = &self.batch_bar {
            batch_bar.finish_with_message("All files processed");
        }
        let _ = self.multi_progress.clear();
    }

    /// Observer that feeds collapse progress of file `index` into this manager
    pub fn observer(&mut self, index: usize) -> ProgressObserver<'_> {
        let cells = self
            .file_states
            .get(index)
            .map_or(0, |state| state.cells);
        ProgressObserver {
            manager: self,
            index,
            collapses: 0,
            stride: (cells / 100).max(1),
        }
    }

    /// Show the most recently started files in the available bars
    fn update_bars(&self) {
        let active: Vec<&FileState> = self
            .file_states
            .iter()
            .filter(|state| !state.name.is_empty())
            .collect();

        let start = active.len().saturating_sub(MAX_INDIVIDUAL_PROGRESS_BARS);
        let visible = active.get(start..).unwrap_or(&[]);

        for (bar, state) in self.file_bars.iter().zip(visible) {
            bar.set_length(state.cells as u64);
            bar.set_position(state.collapsed as u64);
            let width = state.cells.to_string().len();
            bar.set_message(format!("{:>width$}/{}", state.collapsed, state.cells));
            bar.set_prefix(state.name.clone());
        }

        for bar in self.file_bars.iter().skip(visible.len()) {
            bar.set_length(0);
            bar.set_position(0);
            bar.set_message(String::new());
            bar.set_prefix(String::new());
        }
    }
}

/// Generation observer that advances one file's progress bar
///
/// Progress is the grid's collapsed-cell count, so rollbacks move the bar back.
pub struct ProgressObserver<'a> {
    manager: &'a mut ProgressManager,
    index: usize,
    collapses: usize,
    stride: usize,
}

impl GenerationObserver for ProgressObserver<'_> {
    fn before_collapse(&mut self, grid: &Grid, _position: Position) {
        self.collapses += 1;
        if self.collapses % self.stride == 0 {
            self.manager
                .update_collapsed(self.index, grid.collapsed_count());
        }
    }

    fn finished(&mut self, grid: &Grid) {
        self.manager
            .update_collapsed(self.index, grid.collapsed_count());
    }
}
