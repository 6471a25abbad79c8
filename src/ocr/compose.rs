//! Region extraction and composition.
//!
//! Cuts the legend name box and each stat block out of a full frame and
//! stacks them into one narrow composite image, so the recognizer sees
//! only the text that matters.

use anyhow::{bail, Result};
use image::{imageops, ImageBuffer, Luma};

use crate::config::RegionLayout;

/// Verifies that a frame of the given dimensions covers every layout
/// rectangle. Failure means the capture resolution does not match the
/// configured layout, which is fatal for the whole run.
pub fn check_fit(width: u32, height: u32, layout: &RegionLayout) -> Result<()> {
    for rect in layout.rects() {
        if rect.x + rect.width > width || rect.y + rect.height > height {
            bail!(
                "frame {}x{} too small for region at ({}, {}) size {}x{}",
                width,
                height,
                rect.x,
                rect.y,
                rect.width,
                rect.height
            );
        }
    }
    Ok(())
}

/// Crops each layout rectangle (name box first, then stat boxes in order)
/// and stacks the crops vertically. No resizing happens; the rectangles
/// are pixel coordinates in the source resolution.
pub fn compose(
    img: &ImageBuffer<Luma<u8>, Vec<u8>>,
    layout: &RegionLayout,
) -> Result<ImageBuffer<Luma<u8>, Vec<u8>>> {
    let (width, height) = img.dimensions();
    check_fit(width, height, layout)?;

    let out_width = layout.name_box.width;
    let out_height: u32 = layout.rects().map(|r| r.height).sum();
    let mut output = ImageBuffer::new(out_width, out_height);

    let mut row = 0u32;
    for rect in layout.rects() {
        let crop = imageops::crop_imm(img, rect.x, rect.y, rect.width, rect.height).to_image();
        imageops::replace(&mut output, &crop, 0, row as i64);
        row += rect.height;
    }

    Ok(output)
}
