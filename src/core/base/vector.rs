use crate::assert_uniform_len;
use crate::utils::general::{cmp_nan_last, drop_nan};

////////////////////
// Numeric vector //
////////////////////

/// Fixed length sequence of `f64` values with aggregate operations
///
/// The size is set at construction and never changes. Two families of
/// reductions exist: the plain ones assume a clean vector and propagate NaN,
/// the `*_nan_safe` ones skip NaN entries. `max()` and `min()` are the
/// exception: NaN never wins a comparison against a real value, so they only
/// return NaN when there is nothing else to return.
///
/// ### Fields
///
/// * `values` - The underlying values
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NumericVector {
    values: Vec<f64>,
}

impl From<Vec<f64>> for NumericVector {
    fn from(values: Vec<f64>) -> Self {
        Self { values }
    }
}

impl From<&[f64]> for NumericVector {
    fn from(values: &[f64]) -> Self {
        Self {
            values: values.to_vec(),
        }
    }
}

impl FromIterator<f64> for NumericVector {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl NumericVector {
    /// Create a new vector that takes ownership of the values
    ///
    /// ### Params
    ///
    /// * `values` - The values
    ///
    /// ### Returns
    ///
    /// Initialised structure
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Create a vector of `size` copies of `value`
    pub fn filled(size: usize, value: f64) -> Self {
        Self {
            values: vec![value; size],
        }
    }

    /// Number of elements
    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// Number of elements (alias of `size()` for slice-like call sites)
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Does the vector hold no elements
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Element at position `i`; panics if `i >= size()`
    pub fn get(&self, i: usize) -> f64 {
        self.values[i]
    }

    /// Borrow the values
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Iterate over the values
    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.values.iter()
    }

    /// Consume the vector and return the values
    pub fn into_inner(self) -> Vec<f64> {
        self.values
    }

    /// Number of NaN elements
    pub fn count_nan(&self) -> usize {
        self.values.iter().filter(|v| v.is_nan()).count()
    }

    /// Ascending copy of the vector with NaN placed last
    ///
    /// The vector itself is untouched.
    pub fn sorted(&self) -> NumericVector {
        let mut values = self.values.clone();
        values.sort_by(|a, b| cmp_nan_last(*a, *b));
        Self { values }
    }

    ////////////////
    // Reductions //
    ////////////////

    /// Greatest value
    ///
    /// NaN elements never count as the maximum when a real value is present.
    ///
    /// ### Returns
    ///
    /// The maximum; NaN for an empty or all-NaN vector
    pub fn max(&self) -> f64 {
        self.values.iter().fold(f64::NAN, |acc, &v| acc.max(v))
    }

    /// Smallest value, with the same NaN policy as `max()`
    ///
    /// ### Returns
    ///
    /// The minimum; NaN for an empty or all-NaN vector
    pub fn min(&self) -> f64 {
        self.values.iter().fold(f64::NAN, |acc, &v| acc.min(v))
    }

    /// Sum of all elements; NaN if empty or if any element is NaN
    pub fn sum(&self) -> f64 {
        if self.values.is_empty() {
            return f64::NAN;
        }
        self.values.iter().sum()
    }

    /// Arithmetic mean; NaN if empty or if any element is NaN
    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return f64::NAN;
        }
        self.sum() / self.values.len() as f64
    }

    /// Median of a copy of the vector
    ///
    /// For an even number of elements the lower of the two middle values is
    /// returned, so the median is always an element of the vector.
    ///
    /// ### Returns
    ///
    /// The median; NaN if empty or if any element is NaN
    pub fn median(&self) -> f64 {
        if self.values.is_empty() || self.values.iter().any(|v| v.is_nan()) {
            return f64::NAN;
        }
        lower_median(self.values.clone())
    }

    /// Greatest non-NaN value; identical to `max()`
    pub fn max_nan_safe(&self) -> f64 {
        self.max()
    }

    /// Smallest non-NaN value; identical to `min()`
    pub fn min_nan_safe(&self) -> f64 {
        self.min()
    }

    /// Sum over the non-NaN elements; NaN if there are none
    pub fn sum_nan_safe(&self) -> f64 {
        let clean = drop_nan(&self.values);
        if clean.is_empty() {
            return f64::NAN;
        }
        clean.iter().sum()
    }

    /// Mean over the non-NaN elements; NaN if there are none
    pub fn mean_nan_safe(&self) -> f64 {
        let clean = drop_nan(&self.values);
        if clean.is_empty() {
            return f64::NAN;
        }
        clean.iter().sum::<f64>() / clean.len() as f64
    }

    /// Lower median over the non-NaN elements; NaN if there are none
    pub fn median_nan_safe(&self) -> f64 {
        let clean = drop_nan(&self.values);
        if clean.is_empty() {
            return f64::NAN;
        }
        lower_median(clean)
    }

    ////////////////////////////
    // Elementwise aggregates //
    ////////////////////////////

    /// Elementwise maximum across vectors of identical length
    ///
    /// Position `i` of the result is `max()` over element `i` of every input,
    /// so NaN only survives where every input holds NaN. Panics if the inputs
    /// differ in length.
    ///
    /// ### Params
    ///
    /// * `vectors` - The vectors to aggregate
    ///
    /// ### Returns
    ///
    /// One vector of the shared length (empty for no inputs)
    pub fn max_vector(vectors: &[NumericVector]) -> NumericVector {
        aggregate_positions(vectors, NumericVector::max)
    }

    /// Elementwise minimum across vectors of identical length
    pub fn min_vector(vectors: &[NumericVector]) -> NumericVector {
        aggregate_positions(vectors, NumericVector::min)
    }

    /// Elementwise sum across vectors of identical length
    pub fn sum_vector(vectors: &[NumericVector]) -> NumericVector {
        aggregate_positions(vectors, NumericVector::sum)
    }

    /// Elementwise mean across vectors of identical length
    pub fn mean_vector(vectors: &[NumericVector]) -> NumericVector {
        aggregate_positions(vectors, NumericVector::mean)
    }

    /// Elementwise median across vectors of identical length
    pub fn median_vector(vectors: &[NumericVector]) -> NumericVector {
        aggregate_positions(vectors, NumericVector::median)
    }
}

//////////////////////
// Helper functions //
//////////////////////

/// Lower median of NaN-free values
///
/// ### Params
///
/// * `data` - Owned, non-empty values without NaN
///
/// ### Returns
///
/// Element `(n - 1) / 2` of the sorted values
fn lower_median(mut data: Vec<f64>) -> f64 {
    let mid = (data.len() - 1) / 2;
    let (_, median, _) = data.select_nth_unstable_by(mid, |a, b| cmp_nan_last(*a, *b));
    *median
}

/// Apply a reduction to each position across a set of equal-length vectors
///
/// ### Params
///
/// * `vectors` - The vectors to aggregate
/// * `reduce` - The reduction applied to the values found at one position
///
/// ### Returns
///
/// The aggregated vector
fn aggregate_positions<F>(vectors: &[NumericVector], reduce: F) -> NumericVector
where
    F: Fn(&NumericVector) -> f64,
{
    assert_uniform_len!(vectors);

    let size = match vectors.first() {
        Some(v) => v.size(),
        None => return NumericVector::default(),
    };

    (0..size)
        .map(|i| {
            let column: NumericVector = vectors.iter().map(|v| v.get(i)).collect();
            reduce(&column)
        })
        .collect()
}
