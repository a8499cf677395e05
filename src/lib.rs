pub mod math;
pub mod activation;
pub mod loss;
pub mod network;
pub mod train;
pub mod features;

// Convenience re-exports
pub use math::matrix::{Matrix, MatrixError};
pub use activation::activation::{sigmoid, dsigmoid};
pub use network::{Network, NetworkError, NetworkResult, NetworkSpec, DEFAULT_LEARNING_RATE};
pub use train::{train_loop, EpochStats, TrainConfig};
