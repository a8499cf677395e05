use std::path::Path;

use image::imageops::FilterType;
use image::DynamicImage;
use log::debug;

use crate::features::error::{FeatureError, FeatureResult};
use crate::features::kernel::{max_pool, Kernel, EDGE_KERNELS, GAUSSIAN_BLUR};
use crate::math::matrix::Matrix;

/// Rounds of (edge kernel, 2x2 max pool) applied after blurring.
const POOL_ROUNDS: usize = 3;

/// Number of features `image_features` yields for a `width x height` target.
pub fn feature_len(width: u32, height: u32) -> FeatureResult<usize> {
    let too_small = || FeatureError::TooSmall {
        width: width as usize,
        height: height as usize,
    };

    let (mut rows, mut cols) = GAUSSIAN_BLUR
        .output_shape(height as usize, width as usize)
        .ok_or_else(too_small)?;
    // Every edge kernel shrinks the plane identically.
    let kernel = EDGE_KERNELS[0];
    for _ in 0..POOL_ROUNDS {
        (rows, cols) = kernel.output_shape(rows, cols).ok_or_else(too_small)?;
        if rows < 2 || cols < 2 {
            return Err(too_small());
        }
        (rows, cols) = (rows / 2, cols / 2);
    }
    Ok(EDGE_KERNELS.len() * rows * cols)
}

/// Turns an image into a flat feature vector in [0, 1].
///
/// The image is resized to `width x height` (when it differs) and reduced to luminance. After
/// blurring, each edge kernel runs `POOL_ROUNDS` rounds of convolution plus
/// max pooling; the responses of all kernels are concatenated.
pub fn image_features(img: &DynamicImage, width: u32, height: u32) -> FeatureResult<Vec<f64>> {
    let expected = feature_len(width, height)?;

    let plane = if img.width() != width || img.height() != height {
        luminance_plane(&img.resize_exact(width, height, FilterType::Triangle))?
    } else {
        luminance_plane(img)?
    };
    let blurred = GAUSSIAN_BLUR.apply(&plane)?;

    let mut features = Vec::with_capacity(expected);
    for kernel in &EDGE_KERNELS {
        features.extend(edge_response(&blurred, kernel)?);
    }
    debug!("extracted {} features from {width}x{height} image", features.len());
    Ok(features)
}

/// Decodes image bytes (PNG/JPEG/BMP/GIF) and extracts features.
pub fn image_bytes_features(bytes: &[u8], width: u32, height: u32) -> FeatureResult<Vec<f64>> {
    let img = image::load_from_memory(bytes)?;
    image_features(&img, width, height)
}

/// Opens an image file and extracts features.
pub fn image_file_features<P: AsRef<Path>>(
    path: P,
    width: u32,
    height: u32,
) -> FeatureResult<Vec<f64>> {
    let img = image::open(path)?;
    image_features(&img, width, height)
}

/// Greyscale plane, one 0..=255 luminance value per pixel.
fn luminance_plane(img: &DynamicImage) -> FeatureResult<Matrix> {
    let rgb = img.to_rgb8();
    let values: Vec<f64> = rgb
        .pixels()
        .map(|p| {
            let [r, g, b] = p.0;
            0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64
        })
        .collect();
    Ok(Matrix::from_flat(rgb.height() as usize, rgb.width() as usize, &values)?)
}

fn edge_response(blurred: &Matrix, kernel: &Kernel) -> FeatureResult<Vec<f64>> {
    let mut plane = blurred.clone();
    for _ in 0..POOL_ROUNDS {
        plane = max_pool(&kernel.apply(&plane)?)?;
    }
    Ok(plane.flatten().into_iter().map(|v| v / 255.0).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn feature_len_for_common_sizes() {
        assert_eq!(feature_len(64, 64).unwrap(), 80);
        assert!(matches!(feature_len(16, 16), Err(FeatureError::TooSmall { .. })));
        assert!(matches!(feature_len(64, 10), Err(FeatureError::TooSmall { .. })));
    }

    #[test]
    fn flat_image_has_no_edges() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 64, Rgb([120, 30, 200])));
        let features = image_features(&img, 64, 64).unwrap();
        assert_eq!(features.len(), 80);
        assert!(features.iter().all(|&v| v.abs() < 1e-9));
    }

    #[test]
    fn features_are_normalised() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(64, 64, |x, y| {
            Rgb([((x * 37 + y * 11) % 256) as u8, ((x * y) % 256) as u8, 128])
        }));
        let features = image_features(&img, 64, 64).unwrap();
        assert_eq!(features.len(), feature_len(64, 64).unwrap());
        assert!(features.iter().all(|&v| (0.0..=1.0).contains(&v)));
        assert!(features.iter().any(|&v| v > 0.0));
    }

    #[test]
    fn resizes_to_requested_shape() {
        let red_ramp = RgbImage::from_fn(200, 90, |x, _| Rgb([(x % 256) as u8, 0, 0]));
        let img = DynamicImage::ImageRgb8(red_ramp);
        assert_eq!(image_features(&img, 64, 64).unwrap().len(), 80);
        assert_eq!(image_features(&img, 48, 80).unwrap().len(), feature_len(48, 80).unwrap());
    }

    #[test]
    fn reads_features_from_png_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stripes.png");
        let img = RgbImage::from_fn(64, 64, |x, _| {
            if (x / 4) % 2 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        });
        img.save(&path).unwrap();

        let from_file = image_file_features(&path, 64, 64).unwrap();
        let in_memory = image_features(&DynamicImage::ImageRgb8(img), 64, 64).unwrap();
        assert_eq!(from_file.len(), 80);
        assert_eq!(from_file, in_memory);
        assert!(matches!(
            image_file_features(dir.path().join("missing.png"), 64, 64),
            Err(FeatureError::Decode(_))
        ));
    }

    #[test]
    fn undecodable_bytes_fail_cleanly() {
        assert!(matches!(
            image_bytes_features(b"definitely not an image", 64, 64),
            Err(FeatureError::Decode(_))
        ));
    }
}
