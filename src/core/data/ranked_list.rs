use rustc_hash::{FxBuildHasher, FxHashMap};

use crate::core::base::vector::NumericVector;
use crate::core::data::labelled_vector::LabelledVector;
use crate::core::data::sorting::{sort_indices, Order, SortMode};
use crate::error::{FdrError, Result};

/// Immutable, name-indexed ranking of scores
///
/// The position of an entry is its rank under the sort last applied. A name
/// to rank side table is built once per instance so that lookups by name do
/// not scan the list. If a name occurs twice, lookups resolve to its first
/// (best ranked) occurrence.
///
/// ### Fields
///
/// * `names` - Entity names in rank order
/// * `scores` - Scores in rank order
/// * `rank_of` - Name to rank lookup
/// * `sorted_by` - The sort that produced this order, if any
#[derive(Clone, Debug)]
pub struct RankedList {
    names: Vec<String>,
    scores: Vec<f64>,
    rank_of: FxHashMap<String, usize>,
    sorted_by: Option<(SortMode, Order)>,
}

impl RankedList {
    /// Generate a ranked list in the given order
    ///
    /// ### Params
    ///
    /// * `names` - Entity names
    /// * `scores` - Scores, index-aligned with `names`
    ///
    /// ### Returns
    ///
    /// The structure, or `SizeMismatch` if the lengths differ
    pub fn new(names: Vec<String>, scores: Vec<f64>) -> Result<Self> {
        if names.len() != scores.len() {
            return Err(FdrError::SizeMismatch {
                what: "names vs scores",
                expected: names.len(),
                found: scores.len(),
            });
        }
        Ok(Self::assemble(names, scores, None))
    }

    /// Generate a ranked list in the order of a labelled vector
    pub fn from_labelled(vector: &LabelledVector) -> Self {
        Self::assemble(vector.labels().to_vec(), vector.scores().to_vec(), None)
    }

    fn assemble(
        names: Vec<String>,
        scores: Vec<f64>,
        sorted_by: Option<(SortMode, Order)>,
    ) -> Self {
        let mut rank_of = FxHashMap::with_capacity_and_hasher(names.len(), FxBuildHasher);
        for (rank, name) in names.iter().enumerate() {
            rank_of.entry(name.clone()).or_insert(rank);
        }

        Self {
            names,
            scores,
            rank_of,
            sorted_by,
        }
    }

    /// Sorted copy of the list
    ///
    /// The sort is stable and NaN scores go last in both orders. `self` is
    /// never modified.
    ///
    /// ### Params
    ///
    /// * `mode` - Rank on the signed or the absolute score
    /// * `order` - Ascending or descending
    ///
    /// ### Returns
    ///
    /// A new `RankedList`
    pub fn sort(&self, mode: SortMode, order: Order) -> RankedList {
        let indices = sort_indices(&self.scores, mode, order);
        let names = indices.iter().map(|&i| self.names[i].clone()).collect();
        let scores = indices.iter().map(|&i| self.scores[i]).collect();

        Self::assemble(names, scores, Some((mode, order)))
    }

    /// Number of entries
    pub fn size(&self) -> usize {
        self.names.len()
    }

    /// Is the list empty
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The sort that produced the current order
    pub fn sorted_by(&self) -> Option<(SortMode, Order)> {
        self.sorted_by
    }

    /// Is `name` in the list
    pub fn contains(&self, name: &str) -> bool {
        self.rank_of.contains_key(name)
    }

    /// Rank (0-based position) of an entity
    ///
    /// ### Params
    ///
    /// * `name` - The entity name
    ///
    /// ### Returns
    ///
    /// The rank, or `NameNotFound`
    pub fn get_rank(&self, name: &str) -> Result<usize> {
        self.rank_of
            .get(name)
            .copied()
            .ok_or_else(|| FdrError::NameNotFound {
                name: name.to_string(),
                context: "ranked list",
            })
    }

    /// Score of an entity, or `NameNotFound`
    pub fn get_score(&self, name: &str) -> Result<f64> {
        self.get_rank(name).map(|rank| self.scores[rank])
    }

    /// Name at a rank; panics if out of range
    pub fn get_name(&self, rank: usize) -> &str {
        &self.names[rank]
    }

    /// Score at a rank; panics if out of range
    pub fn get_score_at(&self, rank: usize) -> f64 {
        self.scores[rank]
    }

    /// Names in rank order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Scores in rank order
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Scores in rank order as a `NumericVector`
    pub fn scores_vector(&self) -> NumericVector {
        NumericVector::from(self.scores.as_slice())
    }

    /// Names of the first `n` entries (fewer if the list is shorter)
    pub fn top(&self, n: usize) -> &[String] {
        &self.names[..n.min(self.names.len())]
    }
}
