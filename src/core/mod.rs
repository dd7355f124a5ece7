//! Core numerics: vector primitives, ranked and labelled data, and the FDR
//! estimation engine

pub mod base;
pub mod data;
pub mod enrichment;
