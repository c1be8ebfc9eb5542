//! Numeric Table Loader Module
//! Reads headerless delimited solver-output files into f64 matrices using Polars.

use ndarray::Array2;
use polars::prelude::*;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("failed to read table: {0}")]
    Csv(#[from] PolarsError),
    #[error("no rows in table")]
    Empty,
    #[error("expected a single column, found {0}")]
    NotAVector(usize),
    #[error("missing or malformed value at row {row}, column {column}")]
    Malformed { row: usize, column: usize },
}

/// Loads delimited plain-text numeric tables with Polars.
///
/// Solver output files carry no header row and a uniform column count;
/// every cell must parse as a floating-point number.
pub struct TableLoader {
    separator: u8,
}

impl Default for TableLoader {
    fn default() -> Self {
        Self::new(b'\t')
    }
}

impl TableLoader {
    pub fn new(separator: u8) -> Self {
        Self { separator }
    }

    /// Load a delimited file as an N x M matrix (rows x state components).
    pub fn load_matrix(&self, file_path: &Path) -> Result<Array2<f64>, LoaderError> {
        let df = self.read_frame(file_path)?;

        let nrows = df.height();
        let ncols = df.width();
        if nrows == 0 || ncols == 0 {
            return Err(LoaderError::Empty);
        }

        let mut matrix = Array2::<f64>::zeros((nrows, ncols));
        for (j, column) in df.get_columns().iter().enumerate() {
            // non-numeric cells survive the cast as nulls and are caught below
            let cast = column.cast(&DataType::Float64)?;
            let values = cast.f64()?;

            for (i, value) in values.into_iter().enumerate() {
                match value {
                    Some(v) => matrix[[i, j]] = v,
                    None => return Err(LoaderError::Malformed { row: i, column: j }),
                }
            }
        }

        debug!(
            rows = nrows,
            columns = ncols,
            path = %file_path.display(),
            "loaded numeric table"
        );
        Ok(matrix)
    }

    /// Load a single-column file as a flat vector. Wider tables are
    /// rejected rather than silently truncated.
    pub fn load_vector(&self, file_path: &Path) -> Result<Vec<f64>, LoaderError> {
        let matrix = self.load_matrix(file_path)?;
        if matrix.ncols() != 1 {
            return Err(LoaderError::NotAVector(matrix.ncols()));
        }
        Ok(matrix.column(0).to_vec())
    }

    fn read_frame(&self, file_path: &Path) -> Result<DataFrame, LoaderError> {
        // Use lazy evaluation for memory efficiency, then collect
        let df = LazyCsvReader::new(file_path.to_string_lossy().as_ref())
            .with_has_header(false)
            .with_separator(self.separator)
            .with_infer_schema_length(Some(10000))
            .finish()?
            .collect()?;

        Ok(df)
    }
}
