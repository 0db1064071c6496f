//! Submodule providing [`NamedMatrix`], the dense row-major 2-D container
//! used for adjacency, observation counts and conditional probability
//! tables, with independent row-name and column-name axes.

use std::io::BufRead;

use num_traits::Zero;

use crate::errors::ParseError;

/// Sentinel label marking a missing observation.
pub const NA: &str = "NA";

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
/// Errors raised when attaching names to a matrix axis.
pub enum MatrixError {
    /// The number of names differs from the axis length.
    #[error("Expected {expected} names for the {axis} axis, got {actual}")]
    NameCountMismatch {
        /// The axis the names were meant for.
        axis: &'static str,
        /// Length of the axis.
        expected: usize,
        /// Number of names provided.
        actual: usize,
    },
    /// The same name appeared twice on one axis.
    #[error("Duplicate name `{0}` within one axis")]
    DuplicateName(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
/// A row-major 2-D array with optional row and column names. Lookup by name
/// returns the corresponding index; names are unique within their axis.
pub struct NamedMatrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
    row_names: Vec<String>,
    col_names: Vec<String>,
}

impl<T: Clone> NamedMatrix<T> {
    /// Creates a `rows x cols` matrix with every cell set to `fill` and no
    /// axis names.
    pub fn new(rows: usize, cols: usize, fill: T) -> Self {
        Self {
            rows,
            cols,
            data: vec![fill; rows * cols],
            row_names: Vec::new(),
            col_names: Vec::new(),
        }
    }

    /// Drops all cells and names, then re-shapes the matrix to
    /// `rows x cols` filled with `fill`.
    pub fn resize(&mut self, rows: usize, cols: usize, fill: T) {
        self.rows = rows;
        self.cols = cols;
        self.data = vec![fill; rows * cols];
        self.row_names.clear();
        self.col_names.clear();
    }
}

impl<T> NamedMatrix<T> {
    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn col_count(&self) -> usize {
        self.cols
    }

    /// Immutable access to the cell at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is out of bounds.
    pub fn get(&self, row: usize, col: usize) -> &T {
        assert!(row < self.rows && col < self.cols, "matrix index out of bounds");
        &self.data[row * self.cols + col]
    }

    /// Overwrites the cell at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is out of bounds.
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        assert!(row < self.rows && col < self.cols, "matrix index out of bounds");
        self.data[row * self.cols + col] = value;
    }

    /// The `row`-th row as a contiguous slice.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    pub fn row(&self, row: usize) -> &[T] {
        assert!(row < self.rows, "matrix row out of bounds");
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Row names, empty when none were attached.
    pub fn row_names(&self) -> &[String] {
        &self.row_names
    }

    /// Column names, empty when none were attached.
    pub fn col_names(&self) -> &[String] {
        &self.col_names
    }

    /// Index of the row with the given name.
    pub fn row_index(&self, name: &str) -> Option<usize> {
        self.row_names.iter().position(|n| n == name)
    }

    /// Index of the column with the given name.
    pub fn col_index(&self, name: &str) -> Option<usize> {
        self.col_names.iter().position(|n| n == name)
    }

    /// Attaches row names.
    ///
    /// # Errors
    ///
    /// * If the number of names differs from the row count.
    /// * If a name appears twice.
    pub fn set_row_names(&mut self, names: Vec<String>) -> Result<(), MatrixError> {
        check_names("row", self.rows, &names)?;
        self.row_names = names;
        Ok(())
    }

    /// Attaches column names.
    ///
    /// # Errors
    ///
    /// * If the number of names differs from the column count.
    /// * If a name appears twice.
    pub fn set_col_names(&mut self, names: Vec<String>) -> Result<(), MatrixError> {
        check_names("column", self.cols, &names)?;
        self.col_names = names;
        Ok(())
    }
}

impl<T: Zero + Copy> NamedMatrix<T> {
    /// Sum of the `row`-th row.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    pub fn row_sum(&self, row: usize) -> T {
        self.row(row).iter().fold(T::zero(), |acc, &value| acc + value)
    }
}

fn check_names(axis: &'static str, expected: usize, names: &[String]) -> Result<(), MatrixError> {
    if names.len() != expected {
        return Err(MatrixError::NameCountMismatch { axis, expected, actual: names.len() });
    }
    for (position, name) in names.iter().enumerate() {
        if names[..position].contains(name) {
            return Err(MatrixError::DuplicateName(name.clone()));
        }
    }
    Ok(())
}

impl NamedMatrix<String> {
    /// Parses a sample matrix: the first line holds the whitespace-separated
    /// column (sample) names, every following line a row (variable) name and
    /// one cell per column. The literal cell `NA` encodes a missing
    /// observation.
    ///
    /// # Errors
    ///
    /// * If the reader fails.
    /// * If a body line has the wrong number of cells or duplicates a name.
    pub fn from_reader<R: BufRead>(reader: R, path: &str) -> Result<Self, ParseError> {
        let io_error = |source| ParseError::Io { path: path.to_owned(), source };
        let mut lines = reader.lines();

        let header = match lines.next() {
            Some(line) => line.map_err(io_error)?,
            None => String::new(),
        };
        let col_names: Vec<String> = header.split_whitespace().map(str::to_owned).collect();
        let cols = col_names.len();

        let mut row_names = Vec::new();
        let mut data = Vec::new();
        for (index, line) in lines.enumerate() {
            let line = line.map_err(io_error)?;
            if line.trim().is_empty() {
                continue;
            }
            let mut cells = line.split_whitespace();
            let name = cells
                .next()
                .ok_or_else(|| malformed_sample_line(index, &line))?
                .to_owned();
            let values: Vec<String> = cells.map(str::to_owned).collect();
            if values.len() != cols {
                return Err(malformed_sample_line(index, &line));
            }
            row_names.push(name);
            data.extend(values);
        }

        let mut matrix =
            Self { rows: row_names.len(), cols, data, row_names: Vec::new(), col_names: Vec::new() };
        matrix
            .set_row_names(row_names)
            .map_err(|error| duplicate_name_error(error, path))?;
        matrix
            .set_col_names(col_names)
            .map_err(|error| duplicate_name_error(error, path))?;
        Ok(matrix)
    }

    /// Reads a sample matrix from a file, see [`NamedMatrix::from_reader`].
    ///
    /// # Errors
    ///
    /// * If the file cannot be opened or parsed.
    pub fn from_path(path: &std::path::Path) -> Result<Self, ParseError> {
        let display = path.display().to_string();
        let file = std::fs::File::open(path)
            .map_err(|source| ParseError::Io { path: display.clone(), source })?;
        Self::from_reader(std::io::BufReader::new(file), &display)
    }
}

fn malformed_sample_line(index: usize, line: &str) -> ParseError {
    // +2: one-based numbering plus the header line.
    ParseError::MalformedLine { kind: "sample", line: index + 2, content: line.to_owned() }
}

fn duplicate_name_error(error: MatrixError, path: &str) -> ParseError {
    ParseError::MalformedLine { kind: "sample", line: 1, content: format!("{error} in `{path}`") }
}
