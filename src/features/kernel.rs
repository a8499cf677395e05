use crate::features::error::{FeatureError, FeatureResult};
use crate::math::matrix::Matrix;

/// A 3x3 convolution kernel with a post-multiplier and a repeat count.
///
/// Weights are row-major. Every pass shrinks the plane by one pixel on each
/// side (no padding) and clamps the result to the 0..=255 intensity range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kernel {
    pub weights: [f64; 9],
    pub scale: f64,
    pub passes: usize,
}

pub const LAPLACIAN: Kernel = Kernel {
    weights: [-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0],
    scale: 1.0,
    passes: 1,
};

pub const LEFT_EDGE: Kernel = Kernel {
    weights: [-1.0, 1.0, 0.0, -1.0, 1.0, 0.0, -1.0, 1.0, 0.0],
    scale: 1.0,
    passes: 1,
};

pub const RIGHT_EDGE: Kernel = Kernel {
    weights: [0.0, 1.0, -1.0, 0.0, 1.0, -1.0, 0.0, 1.0, -1.0],
    scale: 1.0,
    passes: 1,
};

pub const TOP_EDGE: Kernel = Kernel {
    weights: [-1.0, -1.0, -1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0],
    scale: 1.0,
    passes: 1,
};

pub const BOTTOM_EDGE: Kernel = Kernel {
    weights: [0.0, 0.0, 0.0, 1.0, 1.0, 1.0, -1.0, -1.0, -1.0],
    scale: 1.0,
    passes: 1,
};

pub const GAUSSIAN_BLUR: Kernel = Kernel {
    weights: [1.0, 2.0, 1.0, 2.0, 4.0, 2.0, 1.0, 2.0, 1.0],
    scale: 0.0625,
    passes: 6,
};

/// Edge detectors whose responses make up the feature vector, in output order.
pub const EDGE_KERNELS: [Kernel; 5] = [LAPLACIAN, LEFT_EDGE, RIGHT_EDGE, TOP_EDGE, BOTTOM_EDGE];

impl Kernel {
    /// Applies the kernel `passes` times.
    pub fn apply(&self, plane: &Matrix) -> FeatureResult<Matrix> {
        let mut current = plane.clone();
        for _ in 0..self.passes {
            current = self.convolve_once(&current)?;
        }
        Ok(current)
    }

    fn convolve_once(&self, plane: &Matrix) -> FeatureResult<Matrix> {
        let (rows, cols) = plane.shape();
        if rows < 3 || cols < 3 {
            return Err(FeatureError::TooSmall { width: cols, height: rows });
        }

        let src = plane.to_rows();
        let out: Vec<Vec<f64>> = (1..rows - 1)
            .map(|y| {
                (1..cols - 1)
                    .map(|x| {
                        let mut acc = 0.0;
                        for (k, w) in self.weights.iter().enumerate() {
                            acc += src[y + k / 3 - 1][x + k % 3 - 1] * w;
                        }
                        (acc * self.scale).clamp(0.0, 255.0)
                    })
                    .collect()
            })
            .collect();

        Ok(Matrix::from_rows(out)?)
    }

    /// Plane shape after `apply`, or `None` if the plane is too small.
    pub(crate) fn output_shape(&self, rows: usize, cols: usize) -> Option<(usize, usize)> {
        let shrink = 2 * self.passes;
        if rows < shrink + 1 || cols < shrink + 1 {
            return None;
        }
        Some((rows - shrink, cols - shrink))
    }
}

/// 2x2 max pooling with stride 2. A trailing odd row or column is dropped.
pub fn max_pool(plane: &Matrix) -> FeatureResult<Matrix> {
    let (rows, cols) = plane.shape();
    if rows < 2 || cols < 2 {
        return Err(FeatureError::TooSmall { width: cols, height: rows });
    }

    let src = plane.to_rows();
    let out: Vec<Vec<f64>> = (0..rows / 2)
        .map(|y| {
            (0..cols / 2)
                .map(|x| {
                    let (r, c) = (2 * y, 2 * x);
                    src[r][c].max(src[r][c + 1]).max(src[r + 1][c]).max(src[r + 1][c + 1])
                })
                .collect()
        })
        .collect();

    Ok(Matrix::from_rows(out)?)
}
