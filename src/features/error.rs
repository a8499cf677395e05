use crate::math::matrix::MatrixError;

/// Errors produced while turning an image into a feature vector.
#[derive(thiserror::Error, Debug)]
pub enum FeatureError {
    #[error("could not decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("image {width}x{height} is too small for the feature pipeline")]
    TooSmall { width: usize, height: usize },
    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

pub type FeatureResult<T> = Result<T, FeatureError>;
