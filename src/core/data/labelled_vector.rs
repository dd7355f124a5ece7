use crate::core::base::vector::NumericVector;
use crate::core::data::ranked_list::RankedList;
use crate::core::data::sorting::{sort_indices, Order, SortMode};
use crate::error::{FdrError, Result};

/// One score per named entity
///
/// Labels and scores are index-aligned. Reordering always moves a label
/// together with its score.
///
/// ### Fields
///
/// * `labels` - Entity names
/// * `scores` - Score per entity
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LabelledVector {
    labels: Vec<String>,
    scores: Vec<f64>,
}

impl LabelledVector {
    /// Generate a new labelled vector
    ///
    /// ### Params
    ///
    /// * `labels` - Entity names
    /// * `scores` - Scores, index-aligned with `labels`
    ///
    /// ### Returns
    ///
    /// The structure, or `SizeMismatch` if the lengths differ
    pub fn new(labels: Vec<String>, scores: Vec<f64>) -> Result<Self> {
        if labels.len() != scores.len() {
            return Err(FdrError::SizeMismatch {
                what: "labels vs scores",
                expected: labels.len(),
                found: scores.len(),
            });
        }
        Ok(Self { labels, scores })
    }

    /// Generate a labelled vector from `(name, score)` pairs
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let (labels, scores) = pairs.into_iter().map(|(l, s)| (l.into(), s)).unzip();
        Self { labels, scores }
    }

    /// Number of entities
    pub fn size(&self) -> usize {
        self.labels.len()
    }

    /// Is the vector empty
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Name at position `i`; panics if out of range
    pub fn get_label(&self, i: usize) -> &str {
        &self.labels[i]
    }

    /// Score at position `i`; panics if out of range
    pub fn get_score(&self, i: usize) -> f64 {
        self.scores[i]
    }

    /// All names in the current order
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// All scores in the current order
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Scores as a `NumericVector`
    pub fn as_vector(&self) -> NumericVector {
        NumericVector::from(self.scores.as_slice())
    }

    /// Reordered copy of the vector
    ///
    /// ### Params
    ///
    /// * `mode` - Rank on the signed or the absolute score
    /// * `order` - Ascending or descending
    ///
    /// ### Returns
    ///
    /// A new `LabelledVector`; `self` is untouched
    pub fn sorted(&self, mode: SortMode, order: Order) -> LabelledVector {
        let indices = sort_indices(&self.scores, mode, order);
        LabelledVector {
            labels: indices.iter().map(|&i| self.labels[i].clone()).collect(),
            scores: indices.iter().map(|&i| self.scores[i]).collect(),
        }
    }

    /// Build a sorted, name-indexed ranking of this vector
    ///
    /// ### Params
    ///
    /// * `mode` - Rank on the signed or the absolute score
    /// * `order` - Ascending or descending
    ///
    /// ### Returns
    ///
    /// The `RankedList`
    pub fn to_ranked_list(&self, mode: SortMode, order: Order) -> RankedList {
        RankedList::from_labelled(self).sort(mode, order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_lengths() {
        let res = LabelledVector::new(vec!["a".into(), "b".into()], vec![1.0]);
        assert!(matches!(
            res,
            Err(FdrError::SizeMismatch {
                expected: 2,
                found: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_sorted_keeps_pairs() {
        let v = LabelledVector::from_pairs([("a", 0.1), ("b", -3.0), ("c", 2.0)]);
        let s = v.sorted(SortMode::Real, Order::Descending);

        assert_eq!(s.labels(), &["c", "a", "b"]);
        assert_eq!(s.scores(), &[2.0, 0.1, -3.0]);
        // original order untouched
        assert_eq!(v.get_label(0), "a");

        let a = v.sorted(SortMode::Abs, Order::Descending);
        assert_eq!(a.labels(), &["b", "c", "a"]);
    }

    #[test]
    fn test_positional_accessors() {
        let v = LabelledVector::from_pairs([("g1", 2.0), ("g2", -1.5)]);
        assert_eq!(v.size(), 2);
        assert_eq!(v.get_label(1), "g2");
        assert_eq!(v.get_score(1), -1.5);
        assert_eq!(v.as_vector().sum(), 0.5);
    }
}
