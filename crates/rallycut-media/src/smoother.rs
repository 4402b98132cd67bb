//! Centered moving average over the motion series.

/// Smoothing window in samples for a series sampled at `sample_rate` per
/// second: `window_secs` worth of samples, never fewer than `min_window`.
pub fn smoothing_window(sample_rate: f64, window_secs: f64, min_window: usize) -> usize {
    let samples = (sample_rate * window_secs).round();
    let samples = if samples.is_finite() && samples > 0.0 {
        samples as usize
    } else {
        0
    };
    samples.max(min_window).max(1)
}

/// Apply a centered moving average.
///
/// Edge windows shrink to the neighbours that exist, so the output has the
/// same length as the input and no zero padding biases the ends.
pub fn moving_average(data: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let before = window / 2;
    let after = window - 1 - before;

    // Prefix sums keep this linear in the series length
    let mut prefix = Vec::with_capacity(data.len() + 1);
    prefix.push(0.0);
    for value in data {
        let last = prefix[prefix.len() - 1];
        prefix.push(last + value);
    }

    (0..data.len())
        .map(|i| {
            let start = i.saturating_sub(before);
            let end = (i + after + 1).min(data.len());
            (prefix[end] - prefix[start]) / (end - start) as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_floor() {
        assert_eq!(smoothing_window(5.0, 0.5, 5), 5);
        assert_eq!(smoothing_window(30.0, 0.5, 5), 15);
        assert_eq!(smoothing_window(f64::NAN, 0.5, 5), 5);
    }

    #[test]
    fn test_same_length() {
        let data = vec![1.0, 2.0, 3.0];
        assert_eq!(moving_average(&data, 5).len(), 3);
        assert!(moving_average(&[], 5).is_empty());
    }

    #[test]
    fn test_centered_average() {
        let data = vec![0.0, 0.0, 10.0, 0.0, 0.0];
        let smoothed = moving_average(&data, 3);
        assert_eq!(smoothed, vec![0.0, 10.0 / 3.0, 10.0 / 3.0, 10.0 / 3.0, 0.0]);
    }

    #[test]
    fn test_edges_use_available_neighbours() {
        let data = vec![6.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let smoothed = moving_average(&data, 5);
        // First window covers indices 0..=2 only
        assert!((smoothed[0] - 2.0).abs() < 1e-12);
        assert!((smoothed[1] - 1.5).abs() < 1e-12);
        assert!((smoothed[2] - 1.2).abs() < 1e-12);
        assert_eq!(smoothed[5], 0.0);
    }

    #[test]
    fn test_window_of_one_is_identity() {
        let data = vec![3.0, 1.0, 4.0];
        assert_eq!(moving_average(&data, 1), data);
    }
}
