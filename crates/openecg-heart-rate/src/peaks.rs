//! Peak detection
//!
//! Local-maximum search with optional height, distance and prominence
//! criteria, applied in that order. Flat tops count as one peak located at
//! the midpoint of the plateau (rounded down). The first and last samples
//! are never peaks.

/// Criteria a local maximum must meet to be reported.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PeakCriteria {
    /// Minimum sample value at the peak
    pub height: Option<f32>,
    /// Minimum index separation between reported peaks; when two are closer,
    /// the higher one wins
    pub distance: Option<usize>,
    /// Minimum prominence (height above the higher of the two surrounding
    /// minima)
    pub prominence: Option<f32>,
}

/// Indices of all local maxima, plateaus resolved to their midpoint.
#[allow(clippy::float_cmp)] // plateaus are runs of bit-identical samples
pub fn local_maxima(x: &[f32]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if x.len() < 3 {
        return peaks;
    }
    let last = x.len() - 1;
    let mut i = 1;
    while i < last {
        if x[i - 1] < x[i] {
            let mut ahead = i + 1;
            while ahead < last && x[ahead] == x[i] {
                ahead += 1;
            }
            if x[ahead] < x[i] {
                peaks.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    peaks
}

/// Prominence of the peak at `peak`.
///
/// Each side is scanned outward until a strictly higher sample or the
/// signal boundary; the reference level is the higher of the two minima.
pub fn prominence(x: &[f32], peak: usize) -> f32 {
    let Some(&top) = x.get(peak) else {
        return 0.0;
    };
    let left_min = x[..=peak]
        .iter()
        .rev()
        .take_while(|v| **v <= top)
        .fold(top, |m, v| m.min(*v));
    let right_min = x[peak..]
        .iter()
        .take_while(|v| **v <= top)
        .fold(top, |m, v| m.min(*v));
    top - left_min.max(right_min)
}

/// Drop peaks closer than `distance` samples to a higher peak.
fn select_by_distance(x: &[f32], peaks: &[usize], distance: usize) -> Vec<usize> {
    let mut keep = vec![true; peaks.len()];
    let mut order: Vec<usize> = (0..peaks.len()).collect();
    order.sort_by(|&a, &b| x[peaks[a]].total_cmp(&x[peaks[b]]));

    for &i in order.iter().rev() {
        if !keep[i] {
            continue;
        }
        for j in (0..i).rev() {
            if peaks[i] - peaks[j] >= distance {
                break;
            }
            keep[j] = false;
        }
        for j in i + 1..peaks.len() {
            if peaks[j] - peaks[i] >= distance {
                break;
            }
            keep[j] = false;
        }
    }

    peaks
        .iter()
        .zip(keep)
        .filter_map(|(&p, k)| k.then_some(p))
        .collect()
}

/// Find peaks in `x` that satisfy `criteria`.
///
/// Returned indices are in ascending order.
pub fn find_peaks(x: &[f32], criteria: &PeakCriteria) -> Vec<usize> {
    let mut peaks = local_maxima(x);

    if let Some(height) = criteria.height {
        peaks.retain(|&p| x[p] >= height);
    }
    if let Some(distance) = criteria.distance
        && distance > 1
        && peaks.len() > 1
    {
        peaks = select_by_distance(x, &peaks, distance);
    }
    if let Some(min_prominence) = criteria.prominence {
        peaks.retain(|&p| prominence(x, p) >= min_prominence);
    }
    peaks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_maxima_basic() {
        let x = [0.0, 1.0, 0.0, 2.0, 0.0];
        assert_eq!(local_maxima(&x), vec![1, 3]);
    }

    #[test]
    fn test_edges_are_not_peaks() {
        let x = [5.0, 1.0, 0.0, 1.0, 5.0];
        assert!(local_maxima(&x).is_empty());
    }

    #[test]
    fn test_plateau_midpoint() {
        let x = [0.0, 1.0, 1.0, 1.0, 1.0, 0.0];
        assert_eq!(local_maxima(&x), vec![2]);
        // A plateau that runs into the edge is not a peak.
        let y = [0.0, 1.0, 1.0, 1.0];
        assert!(local_maxima(&y).is_empty());
    }

    #[test]
    fn test_height_filter() {
        let x = [0.0, 0.4, 0.0, 1.0, 0.0];
        let criteria = PeakCriteria {
            height: Some(0.5),
            ..PeakCriteria::default()
        };
        assert_eq!(find_peaks(&x, &criteria), vec![3]);
    }

    #[test]
    fn test_distance_keeps_highest() {
        let x = [0.0, 0.8, 0.0, 1.0, 0.0, 0.9, 0.0, 0.0, 0.0, 0.7, 0.0];
        let criteria = PeakCriteria {
            distance: Some(4),
            ..PeakCriteria::default()
        };
        assert_eq!(find_peaks(&x, &criteria), vec![3, 9]);
    }

    #[test]
    fn test_prominence() {
        let x = [0.0, 1.0, 0.6, 0.8, 0.0];
        assert!((prominence(&x, 1) - 1.0).abs() < 1e-6);
        assert!((prominence(&x, 3) - 0.2).abs() < 1e-6);

        let criteria = PeakCriteria {
            prominence: Some(0.3),
            ..PeakCriteria::default()
        };
        assert_eq!(find_peaks(&x, &criteria), vec![1]);
    }

    #[test]
    fn test_short_input() {
        assert!(find_peaks(&[], &PeakCriteria::default()).is_empty());
        assert!(find_peaks(&[1.0, 2.0], &PeakCriteria::default()).is_empty());
    }
}
