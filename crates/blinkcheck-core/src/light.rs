//! Lighting normalization applied before frame differencing.
//!
//! Consecutive frames of consumer webcams drift in exposure; without
//! normalization that drift registers as whole-face motion and inflates
//! the face-remainder baseline. Global histogram equalization maps each
//! frame's intensity distribution onto the full 8-bit range.

use ndarray::Array2;

/// Equalize a frame's histogram in place.
///
/// Standard CDF remapping: `v -> (cdf(v) - cdf_min) / (n - cdf_min) * 255`.
/// A constant frame is left unchanged.
pub fn equalize_histogram(frame: &mut Array2<u8>) {
    let mut histogram = [0u64; 256];
    for &v in frame.iter() {
        histogram[v as usize] += 1;
    }

    let total = frame.len() as u64;
    let mut cdf = [0u64; 256];
    let mut acc = 0u64;
    for (bin, &count) in histogram.iter().enumerate() {
        acc += count;
        cdf[bin] = acc;
    }

    let cdf_min = cdf
        .iter()
        .copied()
        .find(|&c| c > 0)
        .unwrap_or(0);
    if total <= cdf_min {
        // Single-intensity frame: nothing to spread.
        return;
    }

    let scale = 255.0 / (total - cdf_min) as f64;
    let mut lut = [0u8; 256];
    for (bin, entry) in lut.iter_mut().enumerate() {
        let mapped = (cdf[bin].saturating_sub(cdf_min)) as f64 * scale;
        *entry = mapped.round() as u8;
    }

    frame.mapv_inplace(|v| lut[v as usize]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_frame_is_unchanged() {
        let mut frame = Array2::from_elem((8, 8), 37u8);
        equalize_histogram(&mut frame);
        assert!(frame.iter().all(|&v| v == 37));
    }

    #[test]
    fn two_level_frame_spreads_to_full_range() {
        let mut frame = Array2::from_elem((2, 8), 100u8);
        for x in 0..8 {
            frame[[1, x]] = 110;
        }
        equalize_histogram(&mut frame);
        // Half the pixels at each level: the lower maps to 0, the upper to 255.
        assert!(frame.row(0).iter().all(|&v| v == 0));
        assert!(frame.row(1).iter().all(|&v| v == 255));
    }

    #[test]
    fn output_covers_extremes_for_a_ramp() {
        let mut frame =
            Array2::from_shape_fn((16, 16), |(y, x)| ((y * 16 + x) / 2 + 60) as u8);
        equalize_histogram(&mut frame);
        let min = frame.iter().copied().min().unwrap();
        let max = frame.iter().copied().max().unwrap();
        assert_eq!(min, 0);
        assert_eq!(max, 255);
    }
}
