//! Tests for image decomposition into tile and pattern units

#[cfg(test)]
mod tests {
    use contextile::analysis::patterns::{UnitExtractor, UnitShape};
    use contextile::AlgorithmError;
    use image::{Rgba, RgbaImage};

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    /// Image of `colors` rows, each color filling one `tile × tile` square
    fn tiled_image(colors: &[&[Rgba<u8>]], tile: u32) -> RgbaImage {
        let rows = colors.len() as u32;
        let cols = colors.first().map_or(0, |row| row.len()) as u32;
        RgbaImage::from_fn(cols * tile, rows * tile, |px, py| {
            colors[(py / tile) as usize][(px / tile) as usize]
        })
    }

    // Tests single-tile units group identical tiles
    // Verified by hashing tile positions into the unit identity
    #[test]
    fn test_tile_decomposition() {
        let image = tiled_image(&[&[RED, GREEN, RED], &[BLUE, RED, GREEN]], 2);
        let tiled = UnitExtractor::new(2, 2, UnitShape::Tile)
            .decompose(&image)
            .expect("valid image");

        let units = tiled.units();
        assert_eq!(units.dim(), (2, 3));
        assert_eq!(tiled.unit_count(), 3);
        assert_eq!(units[[0, 0]], units[[0, 2]]);
        assert_eq!(units[[0, 0]], units[[1, 1]]);
        assert_ne!(units[[0, 0]], units[[0, 1]]);
        assert_eq!(tiled.tile_size(), (2, 2));
    }

    // Tests reassembling the source from unit images reproduces it
    // Verified by storing the last member tile instead of the anchor
    #[test]
    fn test_render_source_round_trip() {
        let image = tiled_image(&[&[RED, GREEN], &[BLUE, RED]], 3);
        let shape = UnitShape::Block { rows: 2, cols: 2 };
        let tiled = UnitExtractor::new(3, 3, shape)
            .decompose(&image)
            .expect("valid image");

        assert_eq!(tiled.render_source().expect("renderable"), image);
    }

    // Tests block units distinguish tiles by their surroundings
    // Verified by hashing only the anchor tile
    #[test]
    fn test_block_units_use_neighbors() {
        let image = tiled_image(&[&[RED, RED, GREEN]], 1);

        let tiles = UnitExtractor::new(1, 1, UnitShape::Tile)
            .decompose(&image)
            .expect("valid image");
        assert_eq!(tiles.unit_count(), 2);

        let blocks = UnitExtractor::new(1, 1, UnitShape::Block { rows: 1, cols: 2 })
            .decompose(&image)
            .expect("valid image");
        assert_eq!(blocks.unit_count(), 3);
        assert_ne!(blocks.units()[[0, 0]], blocks.units()[[0, 1]]);
    }

    // Tests trailing pixels short of a whole tile are ignored
    // Verified by rounding the tile count up
    #[test]
    fn test_partial_tiles_are_ignored() {
        let image = RgbaImage::from_pixel(5, 3, RED);
        let tiled = UnitExtractor::new(2, 2, UnitShape::Tile)
            .decompose(&image)
            .expect("valid image");

        assert_eq!(tiled.units().dim(), (1, 2));
        assert_eq!(tiled.unit_count(), 1);
    }

    // Tests zero tile sizes and undersized images are rejected
    // Verified by removing the tile size validation
    #[test]
    fn test_invalid_decomposition() {
        let image = RgbaImage::from_pixel(4, 4, RED);

        let zero = UnitExtractor::new(0, 2, UnitShape::Tile).decompose(&image);
        assert!(matches!(zero, Err(AlgorithmError::InvalidParameter { .. })));

        let too_small = UnitExtractor::new(8, 8, UnitShape::Tile).decompose(&image);
        assert!(matches!(too_small, Err(AlgorithmError::InvalidSourceData { .. })));

        let empty_block =
            UnitExtractor::new(1, 1, UnitShape::Block { rows: 0, cols: 2 }).decompose(&image);
        assert!(matches!(empty_block, Err(AlgorithmError::InvalidParameter { .. })));
    }

    // Tests member offsets of each shape
    // Verified by omitting the anchor from up-left shapes
    #[test]
    fn test_shape_offsets() {
        assert_eq!(UnitShape::Tile.offsets(), vec![(0, 0)]);
        assert_eq!(
            UnitShape::Block { rows: 2, cols: 2 }.offsets(),
            vec![(0, 0), (0, 1), (1, 0), (1, 1)]
        );
        assert_eq!(
            UnitShape::UpLeft { up: 1, left: 2 }.offsets(),
            vec![(-1, 0), (0, -2), (0, -1), (0, 0)]
        );
    }

    // Tests shape parsing and extent overrides
    // Verified by letting extents override the tile shape
    #[test]
    fn test_shape_parsing() {
        let block: UnitShape = "block".parse().expect("known shape");
        assert_eq!(block.with_extent(2, 4), UnitShape::Block { rows: 2, cols: 4 });
        assert_eq!(UnitShape::Tile.with_extent(2, 4), UnitShape::Tile);
        assert_eq!(
            "up-left".parse::<UnitShape>().map(|shape| shape.with_extent(1, 1)).ok(),
            Some(UnitShape::UpLeft { up: 1, left: 1 })
        );
        assert!("hexagon".parse::<UnitShape>().is_err());
        assert_eq!(UnitShape::Block { rows: 2, cols: 3 }.to_string(), "block 2x3");
    }

    // Tests loading a PNG from disk
    // Verified by mapping load failures to source data errors
    #[test]
    fn test_from_png() {
        let dir = tempfile::tempdir().expect("temporary directory");
        let path = dir.path().join("sample.png");
        tiled_image(&[&[RED, BLUE]], 1).save(&path).expect("saved");

        let extractor = UnitExtractor::new(1, 1, UnitShape::Tile);
        let tiled = extractor.from_png(&path).expect("loadable");
        assert_eq!(tiled.unit_count(), 2);

        let missing = extractor.from_png(dir.path().join("missing.png"));
        assert!(matches!(missing, Err(AlgorithmError::ImageLoad { .. })));
    }
}
