use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::core::data::dataset::{Dataset, DatasetModed};
use crate::core::data::labelled_vector::LabelledVector;
use crate::core::data::sorting::{Order, SortMode};
use crate::core::enrichment::fdr::{SkewCorrectedFdr, Tail, TailNull};
use crate::error::{FdrError, Result};

////////////
// Params //
////////////

/// Structure to store the FDR run parameters
///
/// ### Fields
///
/// * `sort_mode` - Ranking mode for the normalised real scores
/// * `parallel` - Estimate entities in parallel with rayon
/// * `verbose` - Report the run summary at info instead of debug level
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FdrParams {
    pub sort_mode: SortMode,
    pub parallel: bool,
    pub verbose: bool,
}

impl Default for FdrParams {
    fn default() -> Self {
        Self {
            sort_mode: SortMode::Real,
            parallel: true,
            verbose: false,
        }
    }
}

impl FdrParams {
    /// Prepare FDR parameters from a JSON object
    ///
    /// ### Params
    ///
    /// * `json` - JSON object; missing keys take their defaults
    ///
    /// ### Returns
    ///
    /// `FdrParams` (defaults: sort_mode = "real", parallel = true,
    /// verbose = false), or `InvalidParam`
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| FdrError::InvalidParam(e.to_string()))
    }
}

////////////
// FdrMap //
////////////

/// Per-entity FDR results, keyed by entity name
///
/// Positive and negative tail entries share one namespace. Entities with a
/// zero or NaN real score have no entry.
#[derive(Clone, Debug, Default)]
pub struct FdrMap {
    entries: FxHashMap<String, SkewCorrectedFdr>,
}

impl FdrMap {
    /// Generate an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the result of an entity
    ///
    /// ### Params
    ///
    /// * `name` - Entity name
    /// * `fdr` - The entity's result
    ///
    /// ### Returns
    ///
    /// `DuplicateEntry` if `name` already has an entry
    pub fn add(&mut self, name: &str, fdr: SkewCorrectedFdr) -> Result<()> {
        if self.entries.contains_key(name) {
            return Err(FdrError::DuplicateEntry(name.to_string()));
        }
        self.entries.insert(name.to_string(), fdr);
        Ok(())
    }

    /// Result of an entity, or `NoFdrData`
    pub fn get_fdr(&self, name: &str) -> Result<&SkewCorrectedFdr> {
        self.entries
            .get(name)
            .ok_or_else(|| FdrError::NoFdrData(name.to_string()))
    }

    /// Does `name` have an entry
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Is the map empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entity names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Iterate over all entries in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SkewCorrectedFdr)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entries of one tail, in arbitrary order
    pub fn tail_entries(&self, tail: Tail) -> impl Iterator<Item = &SkewCorrectedFdr> {
        self.entries.values().filter(move |f| f.tail() == tail)
    }

    /// Move all entries of `other` into this map
    ///
    /// ### Params
    ///
    /// * `other` - The map to absorb
    ///
    /// ### Returns
    ///
    /// The merged map, or `DuplicateEntry` on the first shared name
    pub fn merge(mut self, other: FdrMap) -> Result<FdrMap> {
        if other.len() > self.len() {
            return other.merge(self);
        }
        self.entries.reserve(other.len());
        for (name, fdr) in other.entries {
            self.add(&name, fdr)?;
        }
        Ok(self)
    }
}

////////////////////
// Main functions //
////////////////////

/// Estimate the skew-corrected FDR of every entity with a signed real score
///
/// Uses `FdrParams::default()` with the given sort mode.
///
/// ### Params
///
/// * `real_scores` - Raw real score per entity
/// * `rnd_scores_by_row_full` - Raw permutation scores, one row per entity;
///   may hold rows for entities not in `real_scores`
/// * `real_scores_norm` - Normalised real scores, index-aligned with
///   `real_scores`
/// * `pos_moded` - Positive-mode pooled null distribution
/// * `neg_moded` - Negative-mode pooled null distribution
/// * `sort` - Ranking mode for the normalised real scores
///
/// ### Returns
///
/// The `FdrMap`
pub fn calc_fdrs_skewed(
    real_scores: &LabelledVector,
    rnd_scores_by_row_full: &Dataset,
    real_scores_norm: &LabelledVector,
    pos_moded: &DatasetModed,
    neg_moded: &DatasetModed,
    sort: SortMode,
) -> Result<FdrMap> {
    let params = FdrParams {
        sort_mode: sort,
        ..FdrParams::default()
    };
    calc_fdrs_skewed_with_params(
        real_scores,
        rnd_scores_by_row_full,
        real_scores_norm,
        pos_moded,
        neg_moded,
        &params,
    )
}

/// Estimate the skew-corrected FDR of every entity, with explicit parameters
///
/// Entities with a strictly positive real score are tested on the positive
/// tail against the descending normalised ranking; strictly negative ones on
/// the negative tail against the ascending ranking. Zero and NaN scores are
/// skipped. Randomised rows are matched by name.
///
/// ### Params
///
/// * `real_scores` - Raw real score per entity
/// * `rnd_scores_by_row_full` - Raw permutation scores, one row per entity
/// * `real_scores_norm` - Normalised real scores, index-aligned with
///   `real_scores`
/// * `pos_moded` - Positive-mode pooled null distribution
/// * `neg_moded` - Negative-mode pooled null distribution
/// * `params` - The `FdrParams`
///
/// ### Returns
///
/// The `FdrMap`, or the first error encountered
pub fn calc_fdrs_skewed_with_params(
    real_scores: &LabelledVector,
    rnd_scores_by_row_full: &Dataset,
    real_scores_norm: &LabelledVector,
    pos_moded: &DatasetModed,
    neg_moded: &DatasetModed,
    params: &FdrParams,
) -> Result<FdrMap> {
    let start = Instant::now();

    if real_scores.size() != real_scores_norm.size() {
        return Err(FdrError::SizeMismatch {
            what: "real scores vs normalised real scores",
            expected: real_scores.size(),
            found: real_scores_norm.size(),
        });
    }
    if rnd_scores_by_row_full.ncols() == 0 {
        return Err(FdrError::EmptyInput(
            "randomised score matrix has no permutation columns",
        ));
    }

    let sorted_desc = real_scores_norm.to_ranked_list(params.sort_mode, Order::Descending);
    let sorted_asc = real_scores_norm.to_ranked_list(params.sort_mode, Order::Ascending);

    let pos_null = TailNull::new(Tail::Positive, sorted_desc, pos_moded)?;
    let neg_null = TailNull::new(Tail::Negative, sorted_asc, neg_moded)?;

    let estimate = |r: usize| -> Result<Option<SkewCorrectedFdr>> {
        let name = real_scores.get_label(r);
        let score = real_scores.get_score(r);

        let null = match Tail::of_score(score) {
            Some(Tail::Positive) => &pos_null,
            Some(Tail::Negative) => &neg_null,
            None => {
                if score.is_nan() {
                    tracing::warn!(entity = name, "NaN real score, no FDR estimated");
                }
                return Ok(None);
            }
        };

        let rnd_row = rnd_scores_by_row_full.row(name)?;
        SkewCorrectedFdr::new(name, score, null, &rnd_row).map(Some)
    };

    let n = real_scores.size();
    let fdr_map = if params.parallel {
        (0..n)
            .into_par_iter()
            .try_fold(FdrMap::new, |mut map, r| -> Result<FdrMap> {
                if let Some(fdr) = estimate(r)? {
                    map.add(real_scores.get_label(r), fdr)?;
                }
                Ok(map)
            })
            .try_reduce(FdrMap::new, |a, b| a.merge(b))?
    } else {
        let mut map = FdrMap::new();
        for r in 0..n {
            if let Some(fdr) = estimate(r)? {
                map.add(real_scores.get_label(r), fdr)?;
            }
        }
        map
    };

    let n_positive = fdr_map.tail_entries(Tail::Positive).count();
    let n_negative = fdr_map.len() - n_positive;
    let n_skipped = n - fdr_map.len();
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    if params.verbose {
        tracing::info!(
            n_entities = n,
            n_positive,
            n_negative,
            n_skipped,
            elapsed_ms,
            "skew corrected fdr estimation complete"
        );
    } else {
        tracing::debug!(
            n_entities = n,
            n_positive,
            n_negative,
            n_skipped,
            elapsed_ms,
            "skew corrected fdr estimation complete"
        );
    }

    Ok(fdr_map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::dataset::Mode;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "Expected {}, got {}", b, a);
    }

    struct Inputs {
        real: LabelledVector,
        rnd: Dataset,
        norm: LabelledVector,
        pos: DatasetModed,
        neg: DatasetModed,
    }

    fn scenario() -> Inputs {
        let real = LabelledVector::from_pairs([("g1", 2.0), ("g2", -1.5), ("g3", 0.0)]);
        let norm = LabelledVector::from_pairs([("g1", 1.0), ("g2", -0.8), ("g3", 0.0)]);
        // g3 has no row; g4 is an extra row
        let rnd = Dataset::from_rows(
            vec!["g1".into(), "g2".into(), "g4".into()],
            vec![
                vec![0.5, 2.5, -0.3, 1.0],
                vec![-2.0, 0.4, -1.0, -0.2],
                vec![9.0, -9.0, 9.0, -9.0],
            ],
        )
        .unwrap();
        let null_norm = Dataset::from_rows(
            vec!["g1".into(), "g2".into()],
            vec![vec![0.4, 1.2, -0.3, 0.9], vec![-1.1, 0.3, -0.5, -0.9]],
        )
        .unwrap();

        Inputs {
            real,
            rnd,
            norm,
            pos: DatasetModed::from_dataset(&null_norm, Mode::Positive),
            neg: DatasetModed::from_dataset(&null_norm, Mode::Negative),
        }
    }

    fn run(inp: &Inputs, params: &FdrParams) -> Result<FdrMap> {
        calc_fdrs_skewed_with_params(&inp.real, &inp.rnd, &inp.norm, &inp.pos, &inp.neg, params)
    }

    #[test]
    fn test_concrete_scenario() {
        let inp = scenario();
        let map = calc_fdrs_skewed(
            &inp.real,
            &inp.rnd,
            &inp.norm,
            &inp.pos,
            &inp.neg,
            SortMode::Real,
        )
        .unwrap();

        assert_eq!(map.names(), vec!["g1", "g2"]);

        let g1 = map.get_fdr("g1").unwrap();
        assert!(g1.is_positive_tail());
        assert!((0.0..=1.0).contains(&g1.fdr()));
        assert_close(g1.fdr(), 0.25);
        assert_close(g1.nominal_p(), 1.0 / 3.0);
        assert_close(g1.fwer(), 0.25);

        let g2 = map.get_fdr("g2").unwrap();
        assert_eq!(g2.tail(), Tail::Negative);
        assert_close(g2.fdr(), 0.5);
        assert_close(g2.nominal_p(), 1.0 / 3.0);
        assert_close(g2.fwer(), 0.5);

        let err = map.get_fdr("g3").unwrap_err();
        assert_eq!(err.to_string(), "no fdr data for: g3");
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let inp = scenario();
        let par = run(&inp, &FdrParams::default()).unwrap();
        let seq = run(
            &inp,
            &FdrParams {
                parallel: false,
                ..FdrParams::default()
            },
        )
        .unwrap();

        assert_eq!(par.names(), seq.names());
        for name in par.names() {
            assert_eq!(par.get_fdr(name).unwrap(), seq.get_fdr(name).unwrap());
        }
    }

    #[test]
    fn test_size_mismatch() {
        let mut inp = scenario();
        inp.norm = LabelledVector::from_pairs([("g1", 1.0), ("g2", -0.8)]);
        let err = run(&inp, &FdrParams::default()).unwrap_err();
        assert!(matches!(
            err,
            FdrError::SizeMismatch {
                expected: 3,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_randomised_row() {
        let mut inp = scenario();
        inp.rnd = Dataset::from_rows(vec!["g1".into()], vec![vec![0.5, 2.5, -0.3, 1.0]]).unwrap();
        let err = run(&inp, &FdrParams::default()).unwrap_err();
        assert_eq!(err.to_string(), "g2 not found in dataset rows");
    }

    #[test]
    fn test_no_permutation_columns() {
        let mut inp = scenario();
        inp.rnd = Dataset::from_rows(vec!["g1".into()], vec![vec![]]).unwrap();
        let err = run(&inp, &FdrParams::default()).unwrap_err();
        assert!(matches!(err, FdrError::EmptyInput(_)));
    }

    #[test]
    fn test_nan_score_is_skipped() {
        let mut inp = scenario();
        inp.real = LabelledVector::from_pairs([("g1", 2.0), ("g2", f64::NAN), ("g3", 0.0)]);
        let map = run(&inp, &FdrParams::default()).unwrap();
        assert_eq!(map.names(), vec!["g1"]);
        assert!(!map.contains("g2"));
    }

    #[test]
    fn test_swapped_moded_inputs() {
        let mut inp = scenario();
        std::mem::swap(&mut inp.pos, &mut inp.neg);
        let err = run(&inp, &FdrParams::default()).unwrap_err();
        assert!(matches!(err, FdrError::ModeMismatch { .. }));
    }

    #[test]
    fn test_fdr_map_duplicates() {
        let inp = scenario();
        let map = run(&inp, &FdrParams::default()).unwrap();
        let g1 = map.get_fdr("g1").unwrap().clone();

        let mut other = FdrMap::new();
        other.add("g1", g1.clone()).unwrap();
        let err = other.add("g1", g1.clone()).unwrap_err();
        assert_eq!(err.to_string(), "already have fdr entry for g1");

        let merged = map.clone().merge(other);
        assert!(matches!(merged, Err(FdrError::DuplicateEntry(_))));

        let mut extra = FdrMap::new();
        extra.add("g9", g1).unwrap();
        let merged = map.merge(extra).unwrap();
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_params_from_json() {
        let params = FdrParams::from_json(r#"{"sort_mode": "abs", "verbose": true}"#).unwrap();
        assert_eq!(params.sort_mode, SortMode::Abs);
        assert!(params.parallel);
        assert!(params.verbose);

        assert_eq!(FdrParams::from_json("{}").unwrap(), FdrParams::default());
        assert!(matches!(
            FdrParams::from_json(r#"{"sort_mode": "weighted"}"#),
            Err(FdrError::InvalidParam(_))
        ));
    }

    #[test]
    fn test_abs_sort_mode_keeps_tail_semantics() {
        let inp = scenario();
        let params = FdrParams {
            sort_mode: SortMode::Abs,
            ..FdrParams::default()
        };
        let map = run(&inp, &params).unwrap();
        assert_close(map.get_fdr("g1").unwrap().fdr(), 0.25);
        assert_close(map.get_fdr("g2").unwrap().fdr(), 0.5);
    }

    #[test]
    fn test_non_finite_normalised_scores() {
        let mut inp = scenario();
        inp.norm = LabelledVector::from_pairs([
            ("g1", f64::NAN),
            ("g2", f64::NEG_INFINITY),
            ("g3", 0.0),
        ]);
        let map = calc_fdrs_skewed(
            &inp.real,
            &inp.rnd,
            &inp.norm,
            &inp.pos,
            &inp.neg,
            SortMode::Real,
        )
        .unwrap();

        // NaN: no estimate, the nominal p-value still comes from the raw row
        let g1 = map.get_fdr("g1").unwrap();
        assert_eq!(g1.raw_fdr(), 1.0);
        assert_eq!(g1.fdr(), 1.0);
        assert_eq!(g1.fwer(), 1.0);
        assert_close(g1.nominal_p(), 1.0 / 3.0);

        // same-signed infinity is more extreme than every null value
        let g2 = map.get_fdr("g2").unwrap();
        assert_eq!(g2.raw_fdr(), 0.0);
        assert_eq!(g2.fdr(), 0.0);
        assert_eq!(g2.fwer(), 0.0);
        assert_close(g2.nominal_p(), 1.0 / 3.0);
    }

    fn mirrored(
        real: &[(&str, f64)],
        norm: &[(&str, f64)],
        rnd: &[Vec<f64>],
        null: &[Vec<f64>],
        sign: f64,
    ) -> FdrMap {
        let flip = |rows: &[Vec<f64>]| -> Vec<Vec<f64>> {
            rows.iter()
                .map(|r| r.iter().map(|v| v * sign).collect())
                .collect()
        };
        let real = LabelledVector::from_pairs(real.iter().map(|&(n, v)| (n, v * sign)));
        let norm = LabelledVector::from_pairs(norm.iter().map(|&(n, v)| (n, v * sign)));
        let rnd = Dataset::from_rows(vec!["g1".into(), "g2".into()], flip(rnd)).unwrap();
        let null = Dataset::from_rows(vec!["n1".into(), "n2".into(), "n3".into()], flip(null))
            .unwrap();
        calc_fdrs_skewed(
            &real,
            &rnd,
            &norm,
            &DatasetModed::from_dataset(&null, Mode::Positive),
            &DatasetModed::from_dataset(&null, Mode::Negative),
            SortMode::Real,
        )
        .unwrap()
    }

    #[test]
    fn test_mirrored_inputs_give_mirrored_results() {
        let real = [("g1", 2.0), ("g2", 1.0), ("g3", 0.0)];
        let norm = [("g1", 1.0), ("g2", 0.5), ("g3", 0.0)];
        let rnd = vec![vec![0.5, 0.0, -1.0], vec![1.5, 0.2, 0.0]];
        let null = vec![
            vec![0.0, 0.6, -0.4],
            vec![0.3, 0.0, 1.1],
            vec![-0.2, 0.0, 0.0],
        ];

        let pos = mirrored(&real, &norm, &rnd, &null, 1.0);
        let neg = mirrored(&real, &norm, &rnd, &null, -1.0);

        assert_eq!(pos.names(), vec!["g1", "g2"]);
        assert_eq!(pos.names(), neg.names());
        for name in pos.names() {
            let a = pos.get_fdr(name).unwrap();
            let b = neg.get_fdr(name).unwrap();
            assert_eq!(a.tail(), Tail::Positive);
            assert_eq!(b.tail(), Tail::Negative);
            assert_eq!(a.rank(), b.rank());
            assert_eq!(a.nominal_p(), b.nominal_p());
            assert_eq!(a.raw_fdr(), b.raw_fdr());
            assert_eq!(a.fdr(), b.fdr());
            assert_eq!(a.fwer(), b.fwer());
        }

        // g2 at 0.5: pool 0.6, 0.3, 1.1 gives 2/3 over 2/2 observed;
        // column maxima 0.3, 0.6, 1.1 with 2 of 3 at least 0.5
        let g2 = pos.get_fdr("g2").unwrap();
        assert_close(g2.raw_fdr(), 2.0 / 3.0);
        assert_close(g2.fwer(), 2.0 / 3.0);
        // row 1.5, 0.2 with 0.2 < 1.0
        assert_close(g2.nominal_p(), 0.5);
    }
}
