use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::utils::general::{cmp_nan_last, cmp_nan_last_desc};

///////////
// Enums //
///////////

/// Which value a ranking is built on
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Sort on the signed score
    #[default]
    Real,
    /// Sort on the absolute score
    Abs,
}

/// Direction of a ranking
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    /// Smallest first
    Ascending,
    /// Largest first
    #[default]
    Descending,
}

impl SortMode {
    /// The value a score is ranked by under this mode
    #[inline]
    pub fn key(&self, score: f64) -> f64 {
        match self {
            SortMode::Real => score,
            SortMode::Abs => score.abs(),
        }
    }
}

/// Helper function to get the sort mode
///
/// ### Params
///
/// * `s` - String, type of sort mode.
///
/// ### Returns
///
/// Option of the `SortMode`
pub fn parse_sort_mode(s: &str) -> Option<SortMode> {
    match s.to_lowercase().as_str() {
        "real" => Some(SortMode::Real),
        "abs" | "absolute" => Some(SortMode::Abs),
        _ => None,
    }
}

/// Helper function to get the sort order
///
/// ### Params
///
/// * `s` - String, the order.
///
/// ### Returns
///
/// Option of the `Order`
pub fn parse_order(s: &str) -> Option<Order> {
    match s.to_lowercase().as_str() {
        "asc" | "ascending" => Some(Order::Ascending),
        "desc" | "descending" => Some(Order::Descending),
        _ => None,
    }
}

///////////////
// Functions //
///////////////

/// Compare two scores under a sort mode and order
///
/// NaN scores sort after every other score in both orders.
///
/// ### Params
///
/// * `a` - Left score
/// * `b` - Right score
/// * `mode` - The `SortMode`
/// * `order` - The `Order`
///
/// ### Returns
///
/// The `Ordering` of `a` relative to `b`
pub fn compare_scores(a: f64, b: f64, mode: SortMode, order: Order) -> Ordering {
    let (ka, kb) = (mode.key(a), mode.key(b));
    match order {
        Order::Ascending => cmp_nan_last(ka, kb),
        Order::Descending => cmp_nan_last_desc(ka, kb),
    }
}

/// Stable sort permutation of a score slice
///
/// ### Params
///
/// * `scores` - The scores
/// * `mode` - The `SortMode`
/// * `order` - The `Order`
///
/// ### Returns
///
/// Original indices in sorted order; equal scores keep their input order
pub fn sort_indices(scores: &[f64], mode: SortMode, order: Order) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..scores.len()).collect();
    indices.sort_by(|&a, &b| compare_scores(scores[a], scores[b], mode, order));
    indices
}
