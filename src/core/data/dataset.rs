use faer::Mat;
use rustc_hash::{FxBuildHasher, FxHashMap};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::base::vector::NumericVector;
use crate::error::{FdrError, Result};

/////////////
// Dataset //
/////////////

/// Named numeric matrix, rows = entities and columns = permutations
///
/// Rows are fetched by name through a side table that is built once when the
/// dataset is constructed.
///
/// ### Fields
///
/// * `values` - The underlying matrix
/// * `row_names` - Entity name per row
/// * `col_names` - Permutation name per column
/// * `row_index` - Row name to row index lookup
#[derive(Clone, Debug)]
pub struct Dataset {
    values: Mat<f64>,
    row_names: Vec<String>,
    col_names: Vec<String>,
    row_index: FxHashMap<String, usize>,
}

impl Dataset {
    /// Generate a new dataset
    ///
    /// ### Params
    ///
    /// * `values` - Matrix of shape `row_names.len() x col_names.len()`
    /// * `row_names` - Unique entity names
    /// * `col_names` - Column names
    ///
    /// ### Returns
    ///
    /// The dataset, `SizeMismatch` if the names do not fit the matrix or
    /// `DuplicateName` if a row name repeats
    pub fn new(values: Mat<f64>, row_names: Vec<String>, col_names: Vec<String>) -> Result<Self> {
        if values.nrows() != row_names.len() {
            return Err(FdrError::SizeMismatch {
                what: "dataset rows vs row names",
                expected: values.nrows(),
                found: row_names.len(),
            });
        }
        if values.ncols() != col_names.len() {
            return Err(FdrError::SizeMismatch {
                what: "dataset columns vs column names",
                expected: values.ncols(),
                found: col_names.len(),
            });
        }

        let mut row_index = FxHashMap::with_capacity_and_hasher(row_names.len(), FxBuildHasher);
        for (i, name) in row_names.iter().enumerate() {
            if row_index.insert(name.clone(), i).is_some() {
                return Err(FdrError::DuplicateName {
                    name: name.clone(),
                    context: "dataset rows",
                });
            }
        }

        Ok(Self {
            values,
            row_names,
            col_names,
            row_index,
        })
    }

    /// Generate a dataset from row vectors
    ///
    /// Columns are named `perm_0`, `perm_1`, ...
    ///
    /// ### Params
    ///
    /// * `row_names` - Unique entity names
    /// * `rows` - One vector per entity, all of the same length
    ///
    /// ### Returns
    ///
    /// The dataset or an error as in `new()`
    pub fn from_rows(row_names: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        if row_names.len() != rows.len() {
            return Err(FdrError::SizeMismatch {
                what: "row names vs rows",
                expected: row_names.len(),
                found: rows.len(),
            });
        }

        let ncol = rows.first().map_or(0, |r| r.len());
        if let Some(bad) = rows.iter().find(|r| r.len() != ncol) {
            return Err(FdrError::SizeMismatch {
                what: "dataset row length",
                expected: ncol,
                found: bad.len(),
            });
        }

        let values = Mat::from_fn(rows.len(), ncol, |i, j| rows[i][j]);
        let col_names = (0..ncol).map(|j| format!("perm_{}", j)).collect();

        Self::new(values, row_names, col_names)
    }

    /// Number of rows (entities)
    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    /// Number of columns (permutations)
    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    /// Row names in row order
    pub fn row_names(&self) -> &[String] {
        &self.row_names
    }

    /// Column names in column order
    pub fn col_names(&self) -> &[String] {
        &self.col_names
    }

    /// Is there a row for `name`
    pub fn has_row(&self, name: &str) -> bool {
        self.row_index.contains_key(name)
    }

    /// Value at `(row, col)`; panics if out of range
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[(row, col)]
    }

    /// Index of the row for `name`, or `NameNotFound`
    pub fn row_index(&self, name: &str) -> Result<usize> {
        self.row_index
            .get(name)
            .copied()
            .ok_or_else(|| FdrError::NameNotFound {
                name: name.to_string(),
                context: "dataset rows",
            })
    }

    /// Row for an entity, looked up by name
    ///
    /// ### Params
    ///
    /// * `name` - The entity name
    ///
    /// ### Returns
    ///
    /// The row as a `NumericVector`, or `NameNotFound`
    pub fn row(&self, name: &str) -> Result<NumericVector> {
        self.row_index(name).map(|i| self.row_at(i))
    }

    /// Row at an index; panics if out of range
    pub fn row_at(&self, i: usize) -> NumericVector {
        (0..self.ncols()).map(|j| self.values[(i, j)]).collect()
    }

    /// Column at an index; panics if out of range
    pub fn column(&self, j: usize) -> NumericVector {
        (0..self.nrows()).map(|i| self.values[(i, j)]).collect()
    }

    /// All rows as vectors, in row order
    pub fn rows(&self) -> Vec<NumericVector> {
        (0..self.nrows()).map(|i| self.row_at(i)).collect()
    }
}

//////////
// Mode //
//////////

/// Sign retained by a moded dataset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Keeps values `> 0`
    Positive,
    /// Keeps values `< 0`
    Negative,
}

impl Mode {
    /// Does this mode keep `value`; zero and NaN are never kept
    #[inline]
    pub fn keeps(&self, value: f64) -> bool {
        match self {
            Mode::Positive => value > 0.0,
            Mode::Negative => value < 0.0,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Mode::Positive => write!(f, "positive"),
            Mode::Negative => write!(f, "negative"),
        }
    }
}

//////////////////
// DatasetModed //
//////////////////

/// Dataset restricted to the values of one sign
///
/// Values of the other sign and zeros are replaced by NaN, the missing
/// marker. Each column is one permutation run. Read-only once built.
///
/// ### Fields
///
/// * `data` - The filtered dataset
/// * `mode` - The retained sign
#[derive(Clone, Debug)]
pub struct DatasetModed {
    data: Dataset,
    mode: Mode,
}

impl DatasetModed {
    /// Filter a dataset down to one sign
    ///
    /// ### Params
    ///
    /// * `data` - The unfiltered dataset
    /// * `mode` - The sign to keep
    ///
    /// ### Returns
    ///
    /// The moded dataset
    pub fn from_dataset(data: &Dataset, mode: Mode) -> Self {
        let values = Mat::from_fn(data.nrows(), data.ncols(), |i, j| {
            let v = data.get(i, j);
            if mode.keeps(v) {
                v
            } else {
                f64::NAN
            }
        });

        Self {
            data: Dataset {
                values,
                row_names: data.row_names.clone(),
                col_names: data.col_names.clone(),
                row_index: data.row_index.clone(),
            },
            mode,
        }
    }

    /// Wrap a dataset that was already filtered upstream
    ///
    /// ### Params
    ///
    /// * `data` - Dataset holding only values of `mode`, zeros or NaN
    /// * `mode` - The sign the data was filtered to
    ///
    /// ### Returns
    ///
    /// The moded dataset with zeros marked as missing, or `ModeViolation` at
    /// the first wrong-signed value
    pub fn from_filtered(data: Dataset, mode: Mode) -> Result<Self> {
        for j in 0..data.ncols() {
            for i in 0..data.nrows() {
                let value = data.get(i, j);
                if !value.is_nan() && value != 0.0 && !mode.keeps(value) {
                    return Err(FdrError::ModeViolation {
                        row: i,
                        col: j,
                        value,
                        mode,
                    });
                }
            }
        }
        Ok(Self::from_dataset(&data, mode))
    }

    /// The retained sign
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The filtered dataset
    pub fn dataset(&self) -> &Dataset {
        &self.data
    }

    /// Number of permutation columns
    pub fn ncols(&self) -> usize {
        self.data.ncols()
    }

    /// All retained (non-missing) values, column by column
    pub fn pooled(&self) -> Vec<f64> {
        let mut res = Vec::with_capacity(self.data.nrows() * self.data.ncols());
        for j in 0..self.data.ncols() {
            for i in 0..self.data.nrows() {
                let v = self.data.get(i, j);
                if !v.is_nan() {
                    res.push(v);
                }
            }
        }
        res
    }

    /// Number of retained (non-missing) values
    pub fn n_present(&self) -> usize {
        let mut n = 0;
        for j in 0..self.data.ncols() {
            for i in 0..self.data.nrows() {
                if !self.data.get(i, j).is_nan() {
                    n += 1;
                }
            }
        }
        n
    }

    /// The most extreme retained value of every permutation
    ///
    /// Maximum per column for positive mode, minimum for negative mode. A
    /// column without any retained value yields NaN.
    ///
    /// ### Returns
    ///
    /// One value per column
    pub fn column_extremes(&self) -> NumericVector {
        let rows = self.data.rows();
        if rows.is_empty() {
            return NumericVector::filled(self.data.ncols(), f64::NAN);
        }
        match self.mode {
            Mode::Positive => NumericVector::max_vector(&rows),
            Mode::Negative => NumericVector::min_vector(&rows),
        }
    }
}
