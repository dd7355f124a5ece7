//! Skew-corrected false discovery rate estimation for gene set enrichment
//! analysis.
//!
//! The entry point is [`calc_fdrs_skewed`]: it takes the real enrichment
//! scores, their normalised counterparts, the per-entity permutation scores
//! and the sign-separated null distributions, and returns an [`FdrMap`] with
//! one [`SkewCorrectedFdr`] per entity with a signed score.

pub mod core;
pub mod error;
pub mod utils;

pub use crate::core::base::vector::NumericVector;
pub use crate::core::data::dataset::{Dataset, DatasetModed, Mode};
pub use crate::core::data::labelled_vector::LabelledVector;
pub use crate::core::data::ranked_list::RankedList;
pub use crate::core::data::sorting::{parse_order, parse_sort_mode, Order, SortMode};
pub use crate::core::enrichment::fdr::{SkewCorrectedFdr, Tail, TailNull};
pub use crate::core::enrichment::fdr_algs::{
    calc_fdrs_skewed, calc_fdrs_skewed_with_params, FdrMap, FdrParams,
};
pub use crate::error::{FdrError, Result};
