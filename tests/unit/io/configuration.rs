//! Tests for generation constants and defaults

#[cfg(test)]
mod tests {
    use contextile::io::configuration::{
        BLANK_COLOR, DEFAULT_OUTPUT_HEIGHT, DEFAULT_OUTPUT_WIDTH, DEFAULT_PATTERN_SIZE,
        DEFAULT_SEED, DEFAULT_TILE_SIZE, FINAL_FRAME_HOLD, GIF_FRAME_DELAY_MS, MAX_GRID_DIMENSION,
        MAX_INDIVIDUAL_PROGRESS_BARS, OUTPUT_SUFFIX, VIEWER_MIN_FRAME_DELAY_MS,
    };

    // Tests default output extents fit within the dimension limit
    // Verified by changing the default extents
    #[test]
    fn test_default_dimensions() {
        assert_eq!(DEFAULT_OUTPUT_WIDTH, 20);
        assert_eq!(DEFAULT_OUTPUT_HEIGHT, 20);
        assert_eq!(MAX_GRID_DIMENSION, 10_000);
    }

    // Tests tile and pattern defaults are usable sizes
    // Verified by setting the defaults to zero
    #[test]
    fn test_tile_defaults() {
        assert_eq!(DEFAULT_TILE_SIZE, 1);
        assert_eq!(DEFAULT_PATTERN_SIZE, 3);
        assert_eq!(DEFAULT_SEED, 42);
    }

    // Tests GIF timing keeps frames visible in common viewers
    // Verified by changing the frame delays
    #[test]
    fn test_gif_timing() {
        assert_eq!(GIF_FRAME_DELAY_MS, 20);
        assert_eq!(VIEWER_MIN_FRAME_DELAY_MS, 50);
        assert_eq!(FINAL_FRAME_HOLD, 25);
    }

    // Tests output naming and display settings
    // Verified by changing the suffix
    #[test]
    fn test_output_settings() {
        assert_eq!(OUTPUT_SUFFIX, "_result");
        assert_eq!(MAX_INDIVIDUAL_PROGRESS_BARS, 5);
        assert_eq!(BLANK_COLOR, [255, 255, 255, 255]);
    }
}
