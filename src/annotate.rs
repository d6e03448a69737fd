//! Renders detection boxes onto a copy of the analyzed image.
//!
//! Each localized detection gets a 3-px hollow rectangle in its category
//! color plus a filled severity tick whose height scales with the hazard
//! rating. Detections without regions are not drawn.

use anyhow::Result;
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use std::path::Path;

use crate::detection::Detection;
use crate::taxonomy::LitterCategory;

const BOX_THICKNESS: i32 = 3;
const TICK_WIDTH: u32 = 4;

fn category_color(taxonomy: &[LitterCategory], name: &str) -> Rgba<u8> {
    taxonomy
        .iter()
        .find(|c| c.name == name)
        .map(|c| Rgba(c.color))
        .unwrap_or(Rgba([255, 255, 255, 255]))
}

/// Draw all localized detections onto a copy of the image.
pub fn render_annotations(
    img: &DynamicImage,
    detections: &[Detection],
    taxonomy: &[LitterCategory],
) -> DynamicImage {
    let mut rgba = img.to_rgba8();

    for detection in detections {
        let Some(region) = &detection.region else {
            continue;
        };
        let color = category_color(taxonomy, &detection.category);
        draw_region_box(&mut rgba, region.x, region.y, region.width, region.height, color);
        draw_severity_tick(&mut rgba, region.x, region.y, detection.severity, color);
    }

    DynamicImage::ImageRgba8(rgba)
}

fn draw_region_box(rgba: &mut RgbaImage, x: u32, y: u32, width: u32, height: u32, color: Rgba<u8>) {
    for offset in 0..BOX_THICKNESS {
        let rect = Rect::at(x as i32 - offset, y as i32 - offset)
            .of_size(width + (offset * 2) as u32, height + (offset * 2) as u32);
        draw_hollow_rect_mut(rgba, rect, color);
    }
}

/// Filled bar next to the box corner; taller means more hazardous.
fn draw_severity_tick(rgba: &mut RgbaImage, x: u32, y: u32, severity: u8, color: Rgba<u8>) {
    let tick_height = severity as u32 * 2;
    let rect = Rect::at(x as i32 + BOX_THICKNESS, y as i32 + BOX_THICKNESS)
        .of_size(TICK_WIDTH, tick_height.max(1));
    draw_filled_rect_mut(rgba, rect, color);
}

/// Save an annotated image, converting to RGB for JPEG output while
/// preserving alpha for PNG.
pub fn save_annotated(annotated: &DynamicImage, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let preserve_alpha = output_path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase() == "png")
        .unwrap_or(false);

    if preserve_alpha {
        annotated.save(output_path)?;
    } else {
        DynamicImage::ImageRgb8(annotated.to_rgb8()).save(output_path)?;
    }

    Ok(())
}
