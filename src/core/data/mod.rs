//! Module containing the data structures the FDR engine consumes: labelled
//! scores, name-indexed rankings and permutation matrices.

pub mod dataset;
pub mod labelled_vector;
pub mod ranked_list;
pub mod sorting;
