//! Utils
//!
//! Small numeric helpers shared across the crate.
use crate::errors::ConformalError;

/// Empirical quantile with linear interpolation between order statistics.
///
/// This is the conventional quantile definition: for a sorted sample of
/// `n` values, the quantile `q` sits at fractional rank `q * (n - 1)` and
/// is interpolated between the two neighbouring order statistics.
///
/// * `values` - The sample to take the quantile of. Does not need to be sorted.
/// * `q` - The quantile to compute, between 0 and 1 inclusive.
pub fn quantile_linear(values: &[f64], q: f64) -> Result<f64, ConformalError> {
    if values.is_empty() {
        return Err(ConformalError::EmptySet("quantile sample".to_string()));
    }
    if !(0.0..=1.0).contains(&q) || q.is_nan() {
        return Err(ConformalError::InvalidParameter(
            "q".to_string(),
            "a value between 0 and 1 inclusive".to_string(),
            q.to_string(),
        ));
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = q * ((sorted.len() - 1) as f64);
    let low = rank.floor() as usize;
    let high = rank.ceil() as usize;
    if low == high {
        return Ok(sorted[low]);
    }
    let frac = rank - (low as f64);
    Ok(sorted[low] + frac * (sorted[high] - sorted[low]))
}

/// Validate that a parameter lies strictly inside the unit interval.
pub fn validate_unit_interval(value: f64, parameter: &str) -> Result<(), ConformalError> {
    if value.is_nan() || value <= 0.0 || value >= 1.0 {
        Err(ConformalError::InvalidParameter(
            parameter.to_string(),
            "a value strictly between 0 and 1".to_string(),
            value.to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Check that two index-aligned slices have the same length.
pub fn validate_same_length(
    a: &[f64],
    a_name: &str,
    b: &[f64],
    b_name: &str,
) -> Result<(), ConformalError> {
    if a.len() != b.len() {
        Err(ConformalError::LengthMismatch(
            a_name.to_string(),
            a.len(),
            b_name.to_string(),
            b.len(),
        ))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_linear_interpolates() {
        let v = vec![0., 1., 2., 3., 4.];
        assert_eq!(quantile_linear(&v, 0.8).unwrap(), 3.2);
        assert_eq!(quantile_linear(&v, 0.0).unwrap(), 0.0);
        assert_eq!(quantile_linear(&v, 1.0).unwrap(), 4.0);
        assert_eq!(quantile_linear(&v, 0.5).unwrap(), 2.0);
    }

    #[test]
    fn test_quantile_linear_unsorted_input() {
        let v = vec![4., 0., 3., 1., 2.];
        assert_eq!(quantile_linear(&v, 0.8).unwrap(), 3.2);
    }

    #[test]
    fn test_quantile_linear_single_value() {
        let v = vec![7.5];
        assert_eq!(quantile_linear(&v, 0.3).unwrap(), 7.5);
    }

    #[test]
    fn test_quantile_linear_rejects_empty() {
        let v: Vec<f64> = Vec::new();
        assert!(quantile_linear(&v, 0.5).is_err());
    }

    #[test]
    fn test_quantile_linear_rejects_out_of_range() {
        let v = vec![1., 2.];
        assert!(quantile_linear(&v, 1.5).is_err());
        assert!(quantile_linear(&v, -0.1).is_err());
    }

    #[test]
    fn test_validate_unit_interval() {
        assert!(validate_unit_interval(0.1, "alpha").is_ok());
        assert!(validate_unit_interval(0.0, "alpha").is_err());
        assert!(validate_unit_interval(1.0, "alpha").is_err());
        assert!(validate_unit_interval(f64::NAN, "alpha").is_err());
    }

    #[test]
    fn test_validate_same_length() {
        let a = vec![1., 2., 3.];
        let b = vec![1., 2.];
        assert!(validate_same_length(&a, "a", &a, "a").is_ok());
        assert!(validate_same_length(&a, "a", &b, "b").is_err());
    }
}
