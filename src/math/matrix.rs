use rand::Rng;
use serde::{Deserialize, Serialize};

/// Errors produced by matrix construction and algebra.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MatrixError {
    #[error("invalid dimensions {rows}x{cols}: both must be positive")]
    InvalidDimensions { rows: usize, cols: usize },
    #[error("shape mismatch: {left_rows}x{left_cols} vs {right_rows}x{right_cols}")]
    ShapeMismatch {
        left_rows: usize,
        left_cols: usize,
        right_rows: usize,
        right_cols: usize,
    },
    #[error("dot product shape error: left has {left_cols} cols, right has {right_rows} rows")]
    DotProductShape { left_cols: usize, right_rows: usize },
    #[error("ragged data: row {row} has {actual} values, expected {expected}")]
    RaggedRows { row: usize, expected: usize, actual: usize },
    #[error("length mismatch: expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("index ({row}, {col}) out of bounds")]
    OutOfBounds { row: usize, col: usize },
}

pub type MatrixResult<T> = Result<T, MatrixError>;

/// Dense row-major matrix of `f64`.
///
/// Every operation returns a freshly allocated matrix; nothing hands out
/// shared row storage. `Clone` is a deep copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MatrixRecord", into = "MatrixRecord")]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<Vec<f64>>,
}

/// Wire form: shape plus the row-major `flatten()` output.
#[derive(Serialize, Deserialize)]
struct MatrixRecord {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl TryFrom<MatrixRecord> for Matrix {
    type Error = MatrixError;

    fn try_from(record: MatrixRecord) -> MatrixResult<Matrix> {
        Matrix::from_flat(record.rows, record.cols, &record.values)
    }
}

impl From<Matrix> for MatrixRecord {
    fn from(m: Matrix) -> MatrixRecord {
        MatrixRecord {
            rows: m.rows,
            cols: m.cols,
            values: m.flatten(),
        }
    }
}

impl Matrix {
    /// Zero-filled `rows x cols` matrix.
    pub fn zeros(rows: usize, cols: usize) -> MatrixResult<Matrix> {
        if rows == 0 || cols == 0 {
            return Err(MatrixError::InvalidDimensions { rows, cols });
        }
        Ok(Matrix {
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows],
        })
    }

    /// Column vector with `values[i]` in row `i`.
    pub fn from_array(values: &[f64]) -> MatrixResult<Matrix> {
        if values.is_empty() {
            return Err(MatrixError::InvalidDimensions { rows: 0, cols: 1 });
        }
        Ok(Matrix {
            rows: values.len(),
            cols: 1,
            data: values.iter().map(|&v| vec![v]).collect(),
        })
    }

    /// Builds a matrix from explicit rows. Rejects empty and ragged input.
    pub fn from_rows(data: Vec<Vec<f64>>) -> MatrixResult<Matrix> {
        let rows = data.len();
        let cols = data.first().map_or(0, Vec::len);
        if rows == 0 || cols == 0 {
            return Err(MatrixError::InvalidDimensions { rows, cols });
        }
        if let Some((row, r)) = data.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(MatrixError::RaggedRows {
                row,
                expected: cols,
                actual: r.len(),
            });
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Inverse of [`Matrix::flatten`].
    pub fn from_flat(rows: usize, cols: usize, values: &[f64]) -> MatrixResult<Matrix> {
        if rows == 0 || cols == 0 {
            return Err(MatrixError::InvalidDimensions { rows, cols });
        }
        let expected = rows
            .checked_mul(cols)
            .ok_or(MatrixError::InvalidDimensions { rows, cols })?;
        if values.len() != expected {
            return Err(MatrixError::LengthMismatch {
                expected,
                actual: values.len(),
            });
        }
        Ok(Matrix {
            rows,
            cols,
            data: values.chunks(cols).map(<[f64]>::to_vec).collect(),
        })
    }

    /// `rows x cols` matrix filled uniformly from [-1, 1).
    pub fn random<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> MatrixResult<Matrix> {
        Ok(Matrix::zeros(rows, cols)?.randomize(rng))
    }

    /// Same shape, every entry drawn independently and uniformly from [-1, 1).
    pub fn randomize<R: Rng + ?Sized>(&self, rng: &mut R) -> Matrix {
        self.map(|_| rng.gen_range(-1.0..1.0))
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Entry at `(row, col)`, or `None` when out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.data.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Sets an entry on a matrix the caller owns outright.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> MatrixResult<()> {
        let slot = self
            .data
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or(MatrixError::OutOfBounds { row, col })?;
        *slot = value;
        Ok(())
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data.clone()
    }

    /// Row-major linearisation.
    pub fn flatten(&self) -> Vec<f64> {
        self.data.iter().flatten().copied().collect()
    }

    pub fn map<F>(&self, mut functor: F) -> Matrix
    where
        F: FnMut(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        }
    }

    pub fn add(&self, other: &Matrix) -> MatrixResult<Matrix> {
        self.zip_with(other, |a, b| a + b)
    }

    pub fn subtract(&self, other: &Matrix) -> MatrixResult<Matrix> {
        self.zip_with(other, |a, b| a - b)
    }

    /// Element-wise (Hadamard) product of two same-shape matrices.
    pub fn hadamard(&self, other: &Matrix) -> MatrixResult<Matrix> {
        self.zip_with(other, |a, b| a * b)
    }

    pub fn scale(&self, k: f64) -> Matrix {
        self.map(|x| x * k)
    }

    /// Standard matrix product; `self.cols` must equal `other.rows`.
    pub fn dot(&self, other: &Matrix) -> MatrixResult<Matrix> {
        if self.cols != other.rows {
            return Err(MatrixError::DotProductShape {
                left_cols: self.cols,
                right_rows: other.rows,
            });
        }

        let data: Vec<Vec<f64>> = self
            .data
            .iter()
            .map(|row| {
                (0..other.cols)
                    .map(|j| {
                        row.iter()
                            .zip(other.data.iter())
                            .map(|(a, other_row)| a * other_row[j])
                            .sum::<f64>()
                    })
                    .collect()
            })
            .collect();

        Ok(Matrix {
            rows: self.rows,
            cols: other.cols,
            data,
        })
    }

    pub fn transpose(&self) -> Matrix {
        let data: Vec<Vec<f64>> = (0..self.cols)
            .map(|j| self.data.iter().map(|row| row[j]).collect())
            .collect();

        Matrix {
            rows: self.cols,
            cols: self.rows,
            data,
        }
    }

    fn zip_with<F>(&self, other: &Matrix, f: F) -> MatrixResult<Matrix>
    where
        F: Fn(f64, f64) -> f64,
    {
        if self.shape() != other.shape() {
            return Err(MatrixError::ShapeMismatch {
                left_rows: self.rows,
                left_cols: self.cols,
                right_rows: other.rows,
                right_cols: other.cols,
            });
        }

        let data: Vec<Vec<f64>> = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(row_a, row_b)| row_a.iter().zip(row_b.iter()).map(|(&a, &b)| f(a, b)).collect())
            .collect();

        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data,
        })
    }
}
