use crate::math::matrix::MatrixError;

/// Errors surfaced by network construction, inference, training and
/// persistence.
#[derive(thiserror::Error, Debug)]
pub enum NetworkError {
    #[error("invalid topology {input}-{hidden}-{output}: every layer needs at least one node")]
    InvalidTopology { input: usize, hidden: usize, output: usize },
    #[error("invalid learning rate {0}: must be finite and positive")]
    InvalidLearningRate(f64),
    #[error("input size mismatch: network expects {expected} values, got {actual}")]
    InputSize { expected: usize, actual: usize },
    #[error("output size mismatch: network produces {expected} values, target has {actual}")]
    OutputSize { expected: usize, actual: usize },
    #[error("empty dataset: inputs and targets must both be non-empty")]
    EmptyDataset,
    #[error("dataset length mismatch: {inputs} inputs vs {targets} targets")]
    DatasetLengthMismatch { inputs: usize, targets: usize },
    #[error("input row {row} has {actual} values, network expects {expected}")]
    InputRowSize { row: usize, expected: usize, actual: usize },
    #[error("target row {row} has {actual} values, network produces {expected}")]
    TargetRowSize { row: usize, expected: usize, actual: usize },
    #[error("inconsistent parameters: {0}")]
    InconsistentParameters(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// Internal shape invariant broken; indicates a defect, not bad input.
    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

pub type NetworkResult<T> = Result<T, NetworkError>;

impl From<serde_json::Error> for NetworkError {
    fn from(e: serde_json::Error) -> Self {
        NetworkError::Serialization(e.to_string())
    }
}
