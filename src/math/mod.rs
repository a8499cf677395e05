pub mod matrix;

pub use matrix::{Matrix, MatrixError, MatrixResult};
