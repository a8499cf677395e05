/// Logistic sigmoid, `1 / (1 + e^-x)`. Maps every real into (0, 1).
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Sigmoid derivative expressed through the sigmoid's own output.
///
/// `y` must already be `sigmoid(x)`; passing a pre-activation value gives a
/// meaningless result.
pub fn dsigmoid(y: f64) -> f64 {
    y * (1.0 - y)
}
