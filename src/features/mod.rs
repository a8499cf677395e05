//! Data preparation: image → flat feature vector.
//!
//! Nothing in the learning core depends on this module; it only produces
//! `Vec<f64>` inputs sized by [`feature_len`].

pub mod error;
pub mod kernel;
pub mod pipeline;

pub use self::error::{FeatureError, FeatureResult};
pub use self::pipeline::{feature_len, image_bytes_features, image_features, image_file_features};
pub use self::kernel::{max_pool, Kernel};
