pub mod error;
pub mod network;
pub mod persist;
pub mod spec;

pub use error::{NetworkError, NetworkResult};
pub use network::{Network, DEFAULT_LEARNING_RATE};
pub use spec::NetworkSpec;
