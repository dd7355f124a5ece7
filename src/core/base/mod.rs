//! Module containing the numeric vector primitive and its NaN-aware
//! reductions.

pub mod vector;
