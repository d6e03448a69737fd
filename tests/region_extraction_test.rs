use ndarray::Array2;
use shoreline::region_extraction::extract_regions;
use shoreline::similarity::SimilarityGrid;

/// Zero background with a hot rectangular block.
fn grid_with_block(
    height: usize,
    width: usize,
    y0: usize,
    x0: usize,
    block_h: usize,
    block_w: usize,
) -> SimilarityGrid {
    let mut grid = Array2::<f32>::zeros((height, width));
    for y in y0..y0 + block_h {
        for x in x0..x0 + block_w {
            grid[[y, x]] = 1.0;
        }
    }
    grid
}

#[test]
fn test_single_block_becomes_one_region() {
    let grid = grid_with_block(200, 200, 50, 30, 40, 60);
    let regions = extract_regions(&grid, 0.4, 20);

    assert_eq!(regions.len(), 1);
    let region = &regions[0];
    assert_eq!((region.x, region.y), (30, 50));
    assert_eq!((region.width, region.height), (60, 40));
    // Mean of normalized values inside the block is ~1.0
    assert!(region.score > 0.99);
}

#[test]
fn test_regions_respect_min_size_and_bounds() {
    let mut grid = grid_with_block(150, 150, 10, 10, 50, 50);
    // Second, sub-floor blob
    for y in 100..110 {
        for x in 100..110 {
            grid[[y, x]] = 1.0;
        }
    }

    let min_size = 20;
    let regions = extract_regions(&grid, 0.4, min_size);

    assert_eq!(regions.len(), 1, "sub-floor blob must be discarded");
    for region in &regions {
        assert!(region.width >= min_size);
        assert!(region.height >= min_size);
        assert!(region.x + region.width <= 150);
        assert!(region.y + region.height <= 150);
        assert!((0.0..=1.0).contains(&region.score));
    }
}

#[test]
fn test_extraction_is_deterministic() {
    let mut grid = grid_with_block(300, 300, 20, 20, 40, 40);
    for y in 150..200 {
        for x in 100..180 {
            grid[[y, x]] = 0.9;
        }
    }
    for y in 240..290 {
        for x in 240..290 {
            grid[[y, x]] = 0.7;
        }
    }

    let first = extract_regions(&grid, 0.4, 20);
    let second = extract_regions(&grid, 0.4, 20);
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[test]
fn test_diagonally_touching_blocks_merge() {
    // Blocks meeting only at a corner are one component under
    // 8-connectivity, so a single bounding rectangle covers both.
    let mut grid = grid_with_block(100, 100, 0, 0, 30, 30);
    for y in 30..60 {
        for x in 30..60 {
            grid[[y, x]] = 1.0;
        }
    }

    let regions = extract_regions(&grid, 0.4, 20);
    assert_eq!(regions.len(), 1);
    assert_eq!((regions[0].width, regions[0].height), (60, 60));
}

#[test]
fn test_irregular_component_gets_bounding_rectangle() {
    // A plus-shape: the bounding rectangle covers its full extents even
    // though corners of the rectangle are inactive.
    let mut grid = Array2::<f32>::zeros((120, 120));
    for y in 40..80 {
        for x in 20..100 {
            grid[[y, x]] = 1.0;
        }
    }
    for y in 20..100 {
        for x in 40..80 {
            grid[[y, x]] = 1.0;
        }
    }

    let regions = extract_regions(&grid, 0.4, 20);
    assert_eq!(regions.len(), 1);
    assert_eq!((regions[0].x, regions[0].y), (20, 20));
    assert_eq!((regions[0].width, regions[0].height), (80, 80));
    // Inactive corners drag the mean below 1
    assert!(regions[0].score < 1.0);
}

#[test]
fn test_constant_grid_has_no_regions() {
    let grid = Array2::from_elem((100, 100), 0.42f32);
    assert!(extract_regions(&grid, 0.4, 20).is_empty());
}

#[test]
fn test_cold_grid_has_no_regions() {
    // Active cells exist but no component reaches the minimum side
    let grid = grid_with_block(100, 100, 5, 5, 10, 80);
    assert!(extract_regions(&grid, 0.4, 20).is_empty());
}
