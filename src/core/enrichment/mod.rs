//! Module contains the skew-corrected false discovery rate estimation used
//! to report gene set enrichment results

pub mod fdr;
pub mod fdr_algs;
