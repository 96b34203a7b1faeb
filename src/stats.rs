//! Descriptive statistics over plain `f64` slices. Every function returns
//! `None` when the input is too small for the statistic to exist.

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1). A single value has zero spread.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let avg = mean(values)?;
    if values.len() == 1 {
        return Some(0.0);
    }
    let squares: f64 = values.iter().map(|v| (v - avg).powi(2)).sum();
    Some((squares / (values.len() - 1) as f64).sqrt())
}

pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut values = values.to_vec();
    values.sort_by(f64::total_cmp);
    values
}

/// Quantile with linear interpolation between closest ranks. `q` in [0, 1].
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// True when every value equals the first; an empty slice counts as constant.
pub fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|pair| pair[0] == pair[1])
}

/// Pearson correlation. `None` for fewer than two pairs, mismatched
/// lengths, or when either side has no variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 || is_constant(xs) || is_constant(ys) {
        return None;
    }
    let mean_x = mean(xs)?;
    let mean_y = mean(ys)?;

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((covariance / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_input_has_no_statistics() {
        assert_eq!(mean(&[]), None);
        assert_eq!(quantile_sorted(&[], 0.5), None);
        assert_eq!(std_dev(&[]), None);
    }

    #[test]
    fn median_of_even_count_interpolates() {
        assert!(approx(quantile_sorted(&sorted(&[4.0, 1.0, 3.0, 2.0]), 0.5).unwrap(), 2.5));
        assert!(approx(quantile_sorted(&sorted(&[5.0, 1.0, 3.0]), 0.5).unwrap(), 3.0));
    }

    #[test]
    fn sample_std_dev_matches_known_value() {
        // 2, 4, 4, 4, 5, 5, 7, 9 has sample variance 32/7
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!(approx(std_dev(&values).unwrap(), (32.0f64 / 7.0).sqrt()));
        assert_eq!(std_dev(&[3.0]), Some(0.0));
    }

    #[test]
    fn quartiles_use_linear_interpolation() {
        let values = sorted(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(approx(quantile_sorted(&values, 0.25).unwrap(), 2.0));
        assert!(approx(quantile_sorted(&values, 0.75).unwrap(), 4.0));

        let values = sorted(&[1.0, 2.0, 3.0, 4.0]);
        assert!(approx(quantile_sorted(&values, 0.25).unwrap(), 1.75));
    }

    #[test]
    fn pearson_detects_perfect_relationships() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert!(approx(pearson(&xs, &[2.0, 4.0, 6.0, 8.0]).unwrap(), 1.0));
        assert!(approx(pearson(&xs, &[8.0, 6.0, 4.0, 2.0]).unwrap(), -1.0));
    }

    #[test]
    fn pearson_undefined_without_variance() {
        assert_eq!(pearson(&[1.0, 2.0], &[3.0, 3.0]), None);
        assert_eq!(pearson(&[0.1, 0.1, 0.1], &[1.0, 2.0, 3.0]), None);
        assert!(is_constant(&[0.1, 0.1, 0.1]));
        assert!(!is_constant(&[0.1, 0.2]));
        assert_eq!(pearson(&[1.0], &[1.0]), None);
    }
}
