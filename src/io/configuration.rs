//! Generation constants and runtime configuration defaults

/// Fixed seed for reproducible generation
pub const DEFAULT_SEED: u64 = 42;

/// Default output grid extent along x, in units
pub const DEFAULT_OUTPUT_WIDTH: usize = 20;

/// Default output grid extent along y, in units
pub const DEFAULT_OUTPUT_HEIGHT: usize = 20;

/// Default tile edge length in pixels
pub const DEFAULT_TILE_SIZE: u32 = 1;

/// Default pattern extent (rows and columns) for multi-tile unit shapes
pub const DEFAULT_PATTERN_SIZE: usize = 3;

// Safety limit to prevent excessive memory allocation
/// Maximum allowed output grid dimension
pub const MAX_GRID_DIMENSION: usize = 10_000;

// Progress bar display settings
/// Threshold for switching to batch progress mode
pub const MAX_INDIVIDUAL_PROGRESS_BARS: usize = 5;

// Output settings
/// Suffix added to output filenames
pub const OUTPUT_SUFFIX: &str = "_result";
/// Delay between GIF animation frames
pub const GIF_FRAME_DELAY_MS: u32 = 20;
/// Minimum frame delay that viewers reliably support (in milliseconds)
pub const VIEWER_MIN_FRAME_DELAY_MS: u32 = 50;
/// Multiplier applied to the frame delay for the held final frame
pub const FINAL_FRAME_HOLD: u32 = 25;

/// Fill color used for unresolved or blank cells when rendering
pub const BLANK_COLOR: [u8; 4] = [255, 255, 255, 255];
