//! Extracts candidate rectangular regions from a similarity grid.
//!
//! This is a heuristic stand-in for a trained object detector: normalize the
//! surface, binarize at a threshold, take the bounding rectangle of each
//! 8-connected active component. A real detector could replace this module
//! without touching category detection or scoring.

use image::{GrayImage, Luma};
use imageproc::region_labelling::{connected_components, Connectivity};
use ndarray::{s, Array2};
use std::collections::HashMap;

use crate::detection::Region;
use crate::similarity::SimilarityGrid;

const NORM_EPSILON: f32 = 1e-6;

/// Normalize a similarity surface to [0,1]. The epsilon keeps a constant
/// grid (max == min) from dividing by zero; such a grid normalizes to all
/// zeros.
fn normalize(grid: &SimilarityGrid) -> Array2<f32> {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &v in grid.iter() {
        min = min.min(v);
        max = max.max(v);
    }
    grid.mapv(|v| (v - min) / (max - min + NORM_EPSILON))
}

fn mean_inside(normalized: &Array2<f32>, x: u32, y: u32, width: u32, height: u32) -> f32 {
    let view = normalized.slice(s![
        y as usize..(y + height) as usize,
        x as usize..(x + width) as usize
    ]);
    view.sum() / (width * height) as f32
}

/// Extract scored candidate regions from a similarity grid.
///
/// Cells with normalized value >= `threshold` are active; each 8-connected
/// component becomes one axis-aligned bounding rectangle. Rectangles with a
/// side below `min_size` are discarded. Each survivor is scored with the
/// mean of the normalized (un-binarized) values inside it.
///
/// Deterministic for a fixed grid and parameters. May return an empty list.
pub fn extract_regions(grid: &SimilarityGrid, threshold: f32, min_size: u32) -> Vec<Region> {
    let (height, width) = grid.dim();
    if height == 0 || width == 0 {
        return Vec::new();
    }

    let normalized = normalize(grid);

    let mut mask = GrayImage::new(width as u32, height as u32);
    for (y, row) in normalized.outer_iter().enumerate() {
        for (x, &v) in row.iter().enumerate() {
            if v >= threshold {
                mask.put_pixel(x as u32, y as u32, Luma([255u8]));
            }
        }
    }

    let labels = connected_components(&mask, Connectivity::Eight, Luma([0u8]));

    // Bounding rectangle per component; label 0 is background.
    let mut bounds: HashMap<u32, (u32, u32, u32, u32)> = HashMap::new();
    for (x, y, pixel) in labels.enumerate_pixels() {
        let label = pixel[0];
        if label == 0 {
            continue;
        }
        let entry = bounds.entry(label).or_insert((x, y, x, y));
        entry.0 = entry.0.min(x);
        entry.1 = entry.1.min(y);
        entry.2 = entry.2.max(x);
        entry.3 = entry.3.max(y);
    }

    // Component labels come from a HashMap; sort them so output order is
    // stable across runs.
    let mut component_labels: Vec<u32> = bounds.keys().copied().collect();
    component_labels.sort_unstable();

    let mut regions = Vec::new();
    for label in component_labels {
        let (min_x, min_y, max_x, max_y) = bounds[&label];
        let region_width = max_x - min_x + 1;
        let region_height = max_y - min_y + 1;

        if region_width < min_size || region_height < min_size {
            continue;
        }

        regions.push(Region {
            x: min_x,
            y: min_y,
            width: region_width,
            height: region_height,
            score: mean_inside(&normalized, min_x, min_y, region_width, region_height),
        });
    }

    regions
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_constant_grid_yields_no_regions() {
        // Constant surface: normalization must not divide by zero, and the
        // all-zero normalized grid has no active cells at any threshold > 0.
        let grid = Array2::from_elem((64, 64), 0.7f32);
        assert!(extract_regions(&grid, 0.4, 20).is_empty());
    }

    #[test]
    fn test_empty_grid_yields_no_regions() {
        let grid = Array2::<f32>::zeros((0, 0));
        assert!(extract_regions(&grid, 0.4, 20).is_empty());
    }

    #[test]
    fn test_normalize_spans_unit_interval() {
        let mut grid = Array2::<f32>::zeros((4, 4));
        grid[[0, 0]] = -2.0;
        grid[[3, 3]] = 2.0;
        let normalized = normalize(&grid);
        assert!(normalized[[0, 0]].abs() < 1e-5);
        assert!((normalized[[3, 3]] - 1.0).abs() < 1e-3);
    }
}
