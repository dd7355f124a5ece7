use std::cmp::Ordering;

use crate::core::base::vector::NumericVector;
use crate::core::data::dataset::{DatasetModed, Mode};
use crate::core::data::ranked_list::RankedList;
use crate::error::{FdrError, Result};
use crate::utils::general::{count_ratio, suffix_min};

//////////
// Tail //
//////////

/// Side of the score distribution an entity is tested on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tail {
    /// Enriched side, larger scores are more extreme
    Positive,
    /// Depleted side, smaller scores are more extreme
    Negative,
}

impl Tail {
    /// Tail of a real score: strictly positive or strictly negative
    ///
    /// ### Params
    ///
    /// * `score` - The raw real score
    ///
    /// ### Returns
    ///
    /// `None` for zero and NaN
    pub fn of_score(score: f64) -> Option<Tail> {
        if score > 0.0 {
            Some(Tail::Positive)
        } else if score < 0.0 {
            Some(Tail::Negative)
        } else {
            None
        }
    }

    /// The moded dataset sign that feeds this tail
    pub fn mode(&self) -> Mode {
        match self {
            Tail::Positive => Mode::Positive,
            Tail::Negative => Mode::Negative,
        }
    }

    /// Does `value` belong to this tail's half of the distribution
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        self.mode().keeps(value)
    }

    /// Is `value` at least as extreme as `threshold` in this tail
    #[inline]
    pub fn at_least_as_extreme(&self, value: f64, threshold: f64) -> bool {
        match self {
            Tail::Positive => value >= threshold,
            Tail::Negative => value <= threshold,
        }
    }

    /// Ordering that puts the most extreme value first
    fn cmp_extreme_first(&self, a: f64, b: f64) -> Ordering {
        match self {
            Tail::Positive => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
            Tail::Negative => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        }
    }

    /// Keep the in-tail values and order them most extreme first
    fn extreme_first(&self, values: impl IntoIterator<Item = f64>) -> Vec<f64> {
        let mut res: Vec<f64> = values.into_iter().filter(|&v| self.contains(v)).collect();
        res.sort_by(|a, b| self.cmp_extreme_first(*a, *b));
        res
    }

    /// Number of entries of an extreme-first slice at least as extreme as `x`
    #[inline]
    fn count_extreme(&self, sorted: &[f64], x: f64) -> usize {
        sorted.partition_point(|&v| self.at_least_as_extreme(v, x))
    }
}

//////////////
// TailNull //
//////////////

/// Shared, read-only null model for one tail
///
/// Built once per run and per tail. Holds the observed normalised scores and
/// the pooled null scores of the tail, both ordered most extreme first, and
/// the q-value table derived from them. Every entity of the tail reads from
/// the same instance.
///
/// ### Fields
///
/// * `tail` - The tail this model serves
/// * `ranking` - The sorted normalised real scores of all entities
/// * `observed` - In-tail normalised real scores, most extreme first
/// * `pool` - In-tail pooled null scores, most extreme first
/// * `extremes` - In-tail per-permutation extremes, most extreme first
/// * `n_permutations` - All permutations, with or without an in-tail value
/// * `q_values` - Monotone FDR per position of `observed`
#[derive(Clone, Debug)]
pub struct TailNull {
    tail: Tail,
    ranking: RankedList,
    observed: Vec<f64>,
    pool: Vec<f64>,
    extremes: Vec<f64>,
    n_permutations: usize,
    q_values: Vec<f64>,
}

impl TailNull {
    /// Generate the null model of a tail
    ///
    /// ### Params
    ///
    /// * `tail` - The tail
    /// * `ranking` - Normalised real scores of all entities, sorted
    /// * `moded` - The moded null distribution matching `tail`
    ///
    /// ### Returns
    ///
    /// The null model, or `ModeMismatch` if `moded` holds the other sign
    pub fn new(tail: Tail, ranking: RankedList, moded: &DatasetModed) -> Result<Self> {
        if moded.mode() != tail.mode() {
            return Err(FdrError::ModeMismatch {
                expected: tail.mode(),
                found: moded.mode(),
            });
        }

        let observed = tail.extreme_first(ranking.scores().iter().copied());
        let pool = tail.extreme_first(moded.pooled());

        // a permutation without any value of this sign has a NaN extreme; it
        // stays in the denominator and never reaches a threshold
        let column_extremes = moded.column_extremes();
        let n_permutations = column_extremes.size();
        let extremes = tail.extreme_first(column_extremes.into_inner());

        let raw: Vec<f64> = observed
            .iter()
            .map(|&x| raw_fdr(tail, &observed, &pool, x))
            .collect();
        let q_values = suffix_min(&raw);

        tracing::debug!(
            tail = ?tail,
            n_observed = observed.len(),
            n_pool = pool.len(),
            n_permutations,
            n_permutations_with_extreme = extremes.len(),
            "tail null model built"
        );

        Ok(Self {
            tail,
            ranking,
            observed,
            pool,
            extremes,
            n_permutations,
            q_values,
        })
    }

    /// The tail this model serves
    pub fn tail(&self) -> Tail {
        self.tail
    }

    /// The sorted normalised real-score ranking
    pub fn ranking(&self) -> &RankedList {
        &self.ranking
    }

    /// Number of observed normalised scores in this tail
    pub fn n_observed(&self) -> usize {
        self.observed.len()
    }

    /// Number of pooled null scores in this tail
    pub fn n_pool(&self) -> usize {
        self.pool.len()
    }

    /// Monotone FDR of a normalised score inside this tail
    fn q_value(&self, x: f64) -> f64 {
        let n_real = self.tail.count_extreme(&self.observed, x);
        if n_real == 0 {
            return raw_fdr(self.tail, &self.observed, &self.pool, x);
        }
        self.q_values[n_real - 1]
    }

    /// Fraction of permutations whose extreme is at least as extreme as `x`
    fn fwer(&self, x: f64) -> f64 {
        count_ratio(
            self.tail.count_extreme(&self.extremes, x),
            self.n_permutations,
            1.0,
        )
    }
}

/// Ratio of null to observed tail fractions at threshold `x`, clamped to [0, 1]
///
/// Each side is normalised by its own tail size, which corrects for a null
/// distribution that is skewed towards one sign.
fn raw_fdr(tail: Tail, observed: &[f64], pool: &[f64], x: f64) -> f64 {
    if pool.is_empty() {
        return 1.0;
    }
    let pi_null = count_ratio(tail.count_extreme(pool, x), pool.len(), 1.0);
    let pi_obs = count_ratio(tail.count_extreme(observed, x), observed.len(), 0.0);
    if pi_obs == 0.0 {
        return 1.0;
    }
    (pi_null / pi_obs).clamp(0.0, 1.0)
}

//////////////////////
// SkewCorrectedFdr //
//////////////////////

/// FDR estimate for a single entity
///
/// Computed eagerly from immutable inputs. All probabilities are in `[0, 1]`.
///
/// ### Fields
///
/// * `name` - Entity name
/// * `tail` - Tail the entity was tested on
/// * `real_score` - The raw real score
/// * `norm_score` - The normalised real score
/// * `rank` - Position in the tail's sorted normalised ranking
/// * `nominal_p` - Fraction of the entity's own permutations that are at
///   least as extreme, among those of the same sign
/// * `raw_fdr` - Null fraction over observed fraction at the normalised score
/// * `fdr` - `raw_fdr` made monotone along the tail (the reported q-value)
/// * `fwer` - Fraction of permutation extremes at least as extreme
#[derive(Clone, Debug, PartialEq)]
pub struct SkewCorrectedFdr {
    name: String,
    tail: Tail,
    real_score: f64,
    norm_score: f64,
    rank: usize,
    nominal_p: f64,
    raw_fdr: f64,
    fdr: f64,
    fwer: f64,
}

impl SkewCorrectedFdr {
    /// Estimate the FDR of one entity
    ///
    /// ### Params
    ///
    /// * `name` - Entity name
    /// * `real_score` - The raw real score
    /// * `null` - The null model of the tail the entity is tested on
    /// * `rnd_row` - The entity's raw scores across permutations
    ///
    /// ### Returns
    ///
    /// The estimate, or `NameNotFound` if `name` is missing from the ranking
    pub fn new(
        name: &str,
        real_score: f64,
        null: &TailNull,
        rnd_row: &NumericVector,
    ) -> Result<Self> {
        let tail = null.tail();
        let rank = null.ranking().get_rank(name)?;
        let norm_score = null.ranking().get_score_at(rank);

        let nominal_p = nominal_pval(tail, real_score, rnd_row);

        let (raw_fdr_val, fdr, fwer) = if tail.contains(norm_score) {
            (
                raw_fdr(tail, &null.observed, &null.pool, norm_score),
                null.q_value(norm_score),
                null.fwer(norm_score),
            )
        } else {
            // NaN or a normalised score on the other side of zero
            (1.0, 1.0, 1.0)
        };

        Ok(Self {
            name: name.to_string(),
            tail,
            real_score,
            norm_score,
            rank,
            nominal_p,
            raw_fdr: raw_fdr_val,
            fdr,
            fwer,
        })
    }

    /// Entity name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tail the entity was tested on
    pub fn tail(&self) -> Tail {
        self.tail
    }

    /// Was the entity tested on the positive tail
    pub fn is_positive_tail(&self) -> bool {
        self.tail == Tail::Positive
    }

    /// The raw real score
    pub fn real_score(&self) -> f64 {
        self.real_score
    }

    /// The normalised real score
    pub fn norm_score(&self) -> f64 {
        self.norm_score
    }

    /// Position in the tail's sorted normalised ranking (0-based)
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Nominal p-value
    pub fn nominal_p(&self) -> f64 {
        self.nominal_p
    }

    /// Unadjusted FDR ratio
    pub fn raw_fdr(&self) -> f64 {
        self.raw_fdr
    }

    /// FDR q-value, monotone along the tail
    pub fn fdr(&self) -> f64 {
        self.fdr
    }

    /// Family-wise error rate p-value
    pub fn fwer(&self) -> f64 {
        self.fwer
    }
}

/// Nominal p-value of a raw score against its own permutation row
///
/// NaN entries of the row are ignored. Without any same-signed permutation
/// score the p-value is 1.0.
fn nominal_pval(tail: Tail, real_score: f64, rnd_row: &NumericVector) -> f64 {
    let mut n_tail = 0;
    let mut n_extreme = 0;
    for &v in rnd_row.iter() {
        if tail.contains(v) {
            n_tail += 1;
            if tail.at_least_as_extreme(v, real_score) {
                n_extreme += 1;
            }
        }
    }
    count_ratio(n_extreme, n_tail, 1.0)
}
