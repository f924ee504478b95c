//! Median filtering for detector jitter suppression.

use swole_core::{Error, Result};

/// Window length used on angle channels
pub const ANGLE_MEDIAN_WINDOW: usize = 5;

/// Number of consecutive median passes applied to angle channels
pub const ANGLE_MEDIAN_PASSES: usize = 2;

/// Sliding-window median filter
///
/// Samples beyond either end of the signal are treated as zero and the
/// output has the same length as the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MedianFilter {
    window_size: usize,
}

impl Default for MedianFilter {
    fn default() -> Self {
        Self {
            window_size: ANGLE_MEDIAN_WINDOW,
        }
    }
}

impl MedianFilter {
    /// Create a filter; the window must be odd so it has a centre sample
    pub fn new(window_size: usize) -> Result<Self> {
        if window_size == 0 || window_size % 2 == 0 {
            return Err(Error::InvalidInput(format!(
                "median window must be odd and positive, got {window_size}"
            )));
        }
        Ok(Self { window_size })
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Filter an entire signal once
    pub fn filter_signal(&self, signal: &[f64]) -> Vec<f64> {
        let half = self.window_size / 2;
        let len = signal.len() as isize;
        let mut window = Vec::with_capacity(self.window_size);

        (0..signal.len())
            .map(|i| {
                window.clear();
                for offset in -(half as isize)..=(half as isize) {
                    let j = i as isize + offset;
                    let sample = if (0..len).contains(&j) {
                        signal[j as usize]
                    } else {
                        0.0
                    };
                    window.push(sample);
                }
                window.sort_by(|a, b| a.total_cmp(b));
                window[half]
            })
            .collect()
    }

    /// Filter a signal `passes` times in sequence
    pub fn filter_repeated(&self, signal: &[f64], passes: usize) -> Vec<f64> {
        let mut out = signal.to_vec();
        for _ in 0..passes {
            out = self.filter_signal(&out);
        }
        out
    }
}

/// Standard smoothing for an angle channel: length-5 window, two passes
pub fn smooth_angle_channel(signal: &[f64]) -> Vec<f64> {
    MedianFilter::default().filter_repeated(signal, ANGLE_MEDIAN_PASSES)
}
