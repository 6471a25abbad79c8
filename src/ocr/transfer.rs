//! Piecewise-linear contrast remapping.
//!
//! The stats overlay renders light-gray text on a mid-gray backdrop; a
//! piecewise-linear transfer curve crushes the backdrop toward black and
//! stretches the text toward white, which measurably improves recognition.

use anyhow::{bail, Result};
use image::{ImageBuffer, Luma};

/// A 256-entry intensity lookup table built from piecewise-linear
/// control points.
pub struct TransferFunction {
    table: [u8; 256],
}

impl TransferFunction {
    /// Builds the table from control points sorted ascending by input
    /// intensity. `(0, 0)` and `(255, 255)` are supplied implicitly when
    /// the list does not already start/end at those inputs.
    ///
    /// The table is non-decreasing whenever the control points are; a
    /// non-monotonic point list is accepted but produces a non-monotonic
    /// curve.
    pub fn from_points(points: &[(u8, u8)]) -> Result<Self> {
        if points.windows(2).any(|w| w[0].0 > w[1].0) {
            bail!("transfer control points must be sorted by input intensity");
        }

        let mut pts: Vec<(u8, u8)> = Vec::with_capacity(points.len() + 2);
        if points.first().map(|p| p.0) != Some(0) {
            pts.push((0, 0));
        }
        pts.extend_from_slice(points);
        if pts.last().map(|p| p.0) != Some(255) {
            pts.push((255, 255));
        }

        // Each segment contributes x1-x0+1 values; the shared boundary
        // value is popped first so every index lands exactly once.
        let mut table: Vec<u8> = vec![pts[0].1];
        for pair in pts.windows(2) {
            let (x0, y0) = pair[0];
            let (x1, y1) = pair[1];
            let span = (x1 - x0) as usize;
            table.pop();
            for step in 0..=span {
                let t = if span == 0 {
                    1.0
                } else {
                    step as f64 / span as f64
                };
                let value = y0 as f64 + (y1 as f64 - y0 as f64) * t;
                table.push(value as u8);
            }
        }

        if table.len() != 256 {
            bail!("transfer table has {} entries, expected 256", table.len());
        }
        let mut lut = [0u8; 256];
        lut.copy_from_slice(&table);
        Ok(Self { table: lut })
    }

    /// Remaps every pixel of a grayscale image through the table.
    pub fn apply(&self, img: &ImageBuffer<Luma<u8>, Vec<u8>>) -> ImageBuffer<Luma<u8>, Vec<u8>> {
        let (width, height) = img.dimensions();
        let mut output = ImageBuffer::new(width, height);
        for (x, y, pixel) in img.enumerate_pixels() {
            output.put_pixel(x, y, Luma([self.table[pixel[0] as usize]]));
        }
        output
    }

    pub fn lookup(&self, intensity: u8) -> u8 {
        self.table[intensity as usize]
    }

    pub fn as_table(&self) -> &[u8; 256] {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_curve_shape() {
        let tf = TransferFunction::from_points(&[(0, 0), (87, 9), (182, 237), (255, 255)]).unwrap();
        let table = tf.as_table();

        assert_eq!(table.len(), 256);
        assert_eq!(table[0], 0);
        assert_eq!(table[255], 255);
        // control points are hit exactly
        assert_eq!(table[87], 9);
        assert_eq!(table[182], 237);
        assert!(table.windows(2).all(|w| w[0] <= w[1]), "table must be non-decreasing");
    }

    #[test]
    fn test_no_interior_points_is_identity() {
        let tf = TransferFunction::from_points(&[]).unwrap();
        for i in 0..=255u8 {
            assert_eq!(tf.lookup(i), i);
        }
    }

    #[test]
    fn test_endpoints_inserted_when_missing() {
        let tf = TransferFunction::from_points(&[(128, 64)]).unwrap();
        let table = tf.as_table();
        assert_eq!(table[0], 0);
        assert_eq!(table[128], 64);
        assert_eq!(table[255], 255);
    }

    #[test]
    fn test_unsorted_points_rejected() {
        assert!(TransferFunction::from_points(&[(182, 237), (87, 9)]).is_err());
    }

    #[test]
    fn test_apply_remaps_pixels() {
        let tf = TransferFunction::from_points(&[(0, 0), (100, 200), (255, 255)]).unwrap();
        let img: ImageBuffer<Luma<u8>, Vec<u8>> =
            ImageBuffer::from_fn(4, 1, |x, _| Luma([(x * 50) as u8]));

        let out = tf.apply(&img);

        assert_eq!(out.dimensions(), (4, 1));
        for (x, _, pixel) in out.enumerate_pixels() {
            assert_eq!(pixel[0], tf.lookup((x * 50) as u8));
        }
        // the curve steepens below the first control point
        assert_eq!(out.get_pixel(0, 0)[0], 0);
        assert_eq!(out.get_pixel(2, 0)[0], 200);
    }
}
