//! Raised-cosine window shared by the spectrum analyzer and the stretcher

use std::f64::consts::PI;

/// Symmetric Hann window: `0.5 * (1 - cos(2*pi*i / (size - 1)))`
pub fn hann_window(size: usize) -> Vec<f32> {
    match size {
        0 => return Vec::new(),
        1 => return vec![1.0],
        _ => {}
    }
    let denom = (size - 1) as f64;
    (0..size)
        .map(|i| (0.5 * (1.0 - (2.0 * PI * i as f64 / denom).cos())) as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hann_endpoints_and_peak() {
        let w = hann_window(9);
        assert!(w[0].abs() < 1e-7);
        assert!(w[8].abs() < 1e-7);
        assert!((w[4] - 1.0).abs() < 1e-7);
    }

    #[test]
    fn test_degenerate_sizes() {
        assert!(hann_window(0).is_empty());
        assert_eq!(hann_window(1), vec![1.0]);
    }
}
