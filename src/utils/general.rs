use std::cmp::Ordering;

//////////////////
// FLOAT ORDERS //
//////////////////

/// Compare two floats in ascending order with NaN placed last
///
/// NaN is never treated as the greatest value. Two NaNs compare as equal so
/// that stable sorts keep their relative order. `-0.0` and `0.0` are equal.
///
/// ### Params
///
/// * `a` - Left value
/// * `b` - Right value
///
/// ### Returns
///
/// The `Ordering` of `a` relative to `b`
pub fn cmp_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Compare two floats in descending order with NaN placed last
///
/// ### Params
///
/// * `a` - Left value
/// * `b` - Right value
///
/// ### Returns
///
/// The `Ordering` of `a` relative to `b`
pub fn cmp_nan_last_desc(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

//////////////////
// VECTOR STUFF //
//////////////////

/// Drop the NaN values of a slice
///
/// ### Params
///
/// * `x` - The slice of values
///
/// ### Returns
///
/// The non-NaN values in their original order
pub fn drop_nan(x: &[f64]) -> Vec<f64> {
    x.iter().copied().filter(|v| !v.is_nan()).collect()
}

/// Running minimum from the right end of a slice
///
/// Position `i` of the output holds `min(x[i..])`. Used to make a sequence of
/// ratios monotone along an ordering.
///
/// ### Params
///
/// * `x` - The slice of values
///
/// ### Returns
///
/// The suffix minima, same length as `x`
pub fn suffix_min(x: &[f64]) -> Vec<f64> {
    let n = x.len();
    if n == 0 {
        return Vec::new();
    }

    let mut res = vec![0.0; n];
    let mut current_min = x[n - 1];
    res[n - 1] = current_min;

    for i in (0..n - 1).rev() {
        current_min = current_min.min(x[i]);
        res[i] = current_min;
    }

    res
}

/// Ratio of two counts with a fallback for an empty denominator
///
/// ### Params
///
/// * `numerator` - The count on top
/// * `denominator` - The count below
/// * `fallback` - Value to return when the denominator is zero
///
/// ### Returns
///
/// `numerator / denominator` as `f64`, or `fallback`
pub fn count_ratio(numerator: usize, denominator: usize, fallback: f64) -> f64 {
    if denominator == 0 {
        fallback
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmp_nan_last() {
        let mut x = vec![3.0, f64::NAN, -1.0, 2.0];
        x.sort_by(|a, b| cmp_nan_last(*a, *b));
        assert_eq!(&x[..3], &[-1.0, 2.0, 3.0]);
        assert!(x[3].is_nan());

        let mut y = vec![f64::NAN, 3.0, -1.0, 2.0];
        y.sort_by(|a, b| cmp_nan_last_desc(*a, *b));
        assert_eq!(&y[..3], &[3.0, 2.0, -1.0]);
        assert!(y[3].is_nan());
    }

    #[test]
    fn test_signed_zeros_are_equal() {
        assert_eq!(cmp_nan_last(-0.0, 0.0), Ordering::Equal);
        assert_eq!(cmp_nan_last_desc(0.0, -0.0), Ordering::Equal);
    }

    #[test]
    fn test_suffix_min() {
        let x = [0.5, 0.2, 0.9, 0.4, 1.0];
        assert_eq!(suffix_min(&x), vec![0.2, 0.2, 0.4, 0.4, 1.0]);
        assert!(suffix_min(&[]).is_empty());
    }

    #[test]
    fn test_count_ratio() {
        assert_eq!(count_ratio(1, 4, 1.0), 0.25);
        assert_eq!(count_ratio(0, 0, 1.0), 1.0);
    }

    #[test]
    #[should_panic(expected = "Vectors have different lengths")]
    fn test_uniform_len_panics() {
        let vecs = vec![vec![1.0, 2.0], vec![1.0]];
        crate::assert_uniform_len!(vecs);
    }
}
