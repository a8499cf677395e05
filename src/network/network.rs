use log::{info, trace};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::activation::activation::{dsigmoid, sigmoid};
use crate::loss::mse::MseLoss;
use crate::math::matrix::Matrix;
use crate::network::error::{NetworkError, NetworkResult};
use crate::train::loop_fn::train_loop;
use crate::train::train_config::TrainConfig;

/// Learning rate assigned to freshly built networks.
pub const DEFAULT_LEARNING_RATE: f64 = 1.0;

/// Input → hidden → output perceptron with sigmoid activations.
///
/// The four parameter matrices are the whole learned state:
/// - `weight_input_hidden`  — `hidden x input`
/// - `weight_hidden_output` — `output x hidden`
/// - `bias_hidden`          — `hidden x 1`
/// - `bias_output`          — `output x 1`
///
/// The hidden size is not stored separately; it is the row count of
/// `weight_input_hidden`.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    pub(crate) input_nodes: usize,
    pub(crate) output_nodes: usize,
    pub(crate) weight_input_hidden: Matrix,
    pub(crate) weight_hidden_output: Matrix,
    pub(crate) bias_hidden: Matrix,
    pub(crate) bias_output: Matrix,
    pub(crate) learning_rate: f64,
}

impl Network {
    /// Builds a network with parameters drawn from a freshly seeded RNG.
    pub fn new(
        input_nodes: usize,
        hidden_nodes: usize,
        output_nodes: usize,
    ) -> NetworkResult<Network> {
        let mut rng = StdRng::from_entropy();
        Network::with_rng(input_nodes, hidden_nodes, output_nodes, &mut rng)
    }

    /// Builds a network drawing every weight and bias uniformly from [-1, 1)
    /// out of `rng`.
    pub fn with_rng<R: Rng + ?Sized>(
        input_nodes: usize,
        hidden_nodes: usize,
        output_nodes: usize,
        rng: &mut R,
    ) -> NetworkResult<Network> {
        if input_nodes == 0 || hidden_nodes == 0 || output_nodes == 0 {
            return Err(NetworkError::InvalidTopology {
                input: input_nodes,
                hidden: hidden_nodes,
                output: output_nodes,
            });
        }

        let network = Network {
            input_nodes,
            output_nodes,
            weight_input_hidden: Matrix::random(hidden_nodes, input_nodes, rng)?,
            weight_hidden_output: Matrix::random(output_nodes, hidden_nodes, rng)?,
            bias_hidden: Matrix::random(hidden_nodes, 1, rng)?,
            bias_output: Matrix::random(output_nodes, 1, rng)?,
            learning_rate: DEFAULT_LEARNING_RATE,
        };
        info!("created network {input_nodes}-{hidden_nodes}-{output_nodes}");
        Ok(network)
    }

    /// Assembles a network from explicit parameters, checking that the four
    /// shapes agree with each other.
    pub fn from_parts(
        weight_input_hidden: Matrix,
        weight_hidden_output: Matrix,
        bias_hidden: Matrix,
        bias_output: Matrix,
        learning_rate: f64,
    ) -> NetworkResult<Network> {
        let hidden = weight_input_hidden.rows();
        if bias_hidden.shape() != (hidden, 1) {
            return Err(NetworkError::InconsistentParameters(format!(
                "bias_hidden is {:?}, expected ({hidden}, 1)",
                bias_hidden.shape()
            )));
        }
        if weight_hidden_output.cols() != hidden {
            return Err(NetworkError::InconsistentParameters(format!(
                "weight_hidden_output has {} cols, hidden layer has {hidden} nodes",
                weight_hidden_output.cols()
            )));
        }
        let output = weight_hidden_output.rows();
        if bias_output.shape() != (output, 1) {
            return Err(NetworkError::InconsistentParameters(format!(
                "bias_output is {:?}, expected ({output}, 1)",
                bias_output.shape()
            )));
        }
        check_learning_rate(learning_rate)?;

        Ok(Network {
            input_nodes: weight_input_hidden.cols(),
            output_nodes: output,
            weight_input_hidden,
            weight_hidden_output,
            bias_hidden,
            bias_output,
            learning_rate,
        })
    }

    pub fn input_nodes(&self) -> usize {
        self.input_nodes
    }

    pub fn hidden_nodes(&self) -> usize {
        self.weight_input_hidden.rows()
    }

    pub fn output_nodes(&self) -> usize {
        self.output_nodes
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn set_learning_rate(&mut self, learning_rate: f64) -> NetworkResult<()> {
        check_learning_rate(learning_rate)?;
        self.learning_rate = learning_rate;
        Ok(())
    }

    pub fn weight_input_hidden(&self) -> &Matrix {
        &self.weight_input_hidden
    }

    pub fn weight_hidden_output(&self) -> &Matrix {
        &self.weight_hidden_output
    }

    pub fn bias_hidden(&self) -> &Matrix {
        &self.bias_hidden
    }

    pub fn bias_output(&self) -> &Matrix {
        &self.bias_output
    }

    /// Forward pass. Leaves the network untouched.
    pub fn predict(&self, input: &[f64]) -> NetworkResult<Vec<f64>> {
        self.check_input(input)?;
        let inputs = Matrix::from_array(input)?;
        let (_, outputs) = self.forward(&inputs)?;
        Ok(outputs.flatten())
    }

    /// One backpropagation step on a single example.
    ///
    /// Returns the mean-squared error of the prediction made before the
    /// update, averaged over the output nodes.
    pub fn train_one_example(&mut self, input: &[f64], target: &[f64]) -> NetworkResult<f64> {
        self.check_input(input)?;
        if target.len() != self.output_nodes {
            return Err(NetworkError::OutputSize {
                expected: self.output_nodes,
                actual: target.len(),
            });
        }

        let inputs = Matrix::from_array(input)?;
        let targets = Matrix::from_array(target)?;
        let (hidden, outputs) = self.forward(&inputs)?;
        let loss = MseLoss::loss(&outputs.flatten(), target);
        trace!("step loss = {loss:.6}");

        let output_errors = targets.subtract(&outputs)?;
        let output_gradient = outputs
            .map(dsigmoid)
            .hadamard(&output_errors)?
            .scale(self.learning_rate);
        let weight_hidden_output_delta = output_gradient.dot(&hidden.transpose())?;

        // Uses the output weights as they were before this step.
        let hidden_errors = self.weight_hidden_output.transpose().dot(&output_errors)?;

        self.weight_hidden_output = self.weight_hidden_output.add(&weight_hidden_output_delta)?;
        self.bias_output = self.bias_output.add(&output_gradient)?;

        let hidden_gradient = hidden
            .map(dsigmoid)
            .hadamard(&hidden_errors)?
            .scale(self.learning_rate);
        let weight_input_hidden_delta = hidden_gradient.dot(&inputs.transpose())?;

        self.weight_input_hidden = self.weight_input_hidden.add(&weight_input_hidden_delta)?;
        self.bias_hidden = self.bias_hidden.add(&hidden_gradient)?;

        Ok(loss)
    }

    /// Validates the dataset, then runs `epochs` shuffled passes of
    /// per-example SGD. Returns the mean loss of the last epoch.
    pub fn train(
        &mut self,
        inputs: &[Vec<f64>],
        targets: &[Vec<f64>],
        epochs: usize,
    ) -> NetworkResult<f64> {
        train_loop(self, inputs, targets, &TrainConfig::new(epochs))
    }

    /// Checks a dataset against this network's topology without training.
    pub fn validate(&self, inputs: &[Vec<f64>], targets: &[Vec<f64>]) -> NetworkResult<()> {
        if inputs.is_empty() || targets.is_empty() {
            return Err(NetworkError::EmptyDataset);
        }
        if inputs.len() != targets.len() {
            return Err(NetworkError::DatasetLengthMismatch {
                inputs: inputs.len(),
                targets: targets.len(),
            });
        }
        let bad_input = inputs
            .iter()
            .enumerate()
            .find(|(_, i)| i.len() != self.input_nodes);
        if let Some((row, input)) = bad_input {
            return Err(NetworkError::InputRowSize {
                row,
                expected: self.input_nodes,
                actual: input.len(),
            });
        }
        let bad_target = targets
            .iter()
            .enumerate()
            .find(|(_, t)| t.len() != self.output_nodes);
        if let Some((row, target)) = bad_target {
            return Err(NetworkError::TargetRowSize {
                row,
                expected: self.output_nodes,
                actual: target.len(),
            });
        }
        Ok(())
    }

    /// Returns `(hidden, output)` activations for a column-vector input.
    fn forward(&self, inputs: &Matrix) -> NetworkResult<(Matrix, Matrix)> {
        let hidden = self
            .weight_input_hidden
            .dot(inputs)?
            .add(&self.bias_hidden)?
            .map(sigmoid);
        let outputs = self
            .weight_hidden_output
            .dot(&hidden)?
            .add(&self.bias_output)?
            .map(sigmoid);
        Ok((hidden, outputs))
    }

    fn check_input(&self, input: &[f64]) -> NetworkResult<()> {
        if input.len() != self.input_nodes {
            return Err(NetworkError::InputSize {
                expected: self.input_nodes,
                actual: input.len(),
            });
        }
        Ok(())
    }
}

fn check_learning_rate(learning_rate: f64) -> NetworkResult<()> {
    if !learning_rate.is_finite() || learning_rate <= 0.0 {
        return Err(NetworkError::InvalidLearningRate(learning_rate));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(v: f64) -> Matrix {
        Matrix::from_array(&[v]).unwrap()
    }

    fn seeded(input: usize, hidden: usize, output: usize, seed: u64) -> Network {
        Network::with_rng(input, hidden, output, &mut StdRng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn new_allocates_consistent_shapes() {
        let net = Network::new(3, 5, 2).unwrap();
        assert_eq!(net.weight_input_hidden().shape(), (5, 3));
        assert_eq!(net.weight_hidden_output().shape(), (2, 5));
        assert_eq!(net.bias_hidden().shape(), (5, 1));
        assert_eq!(net.bias_output().shape(), (2, 1));
        assert_eq!(net.hidden_nodes(), 5);
        assert_eq!(net.learning_rate(), DEFAULT_LEARNING_RATE);
        let params = [
            &net.weight_input_hidden,
            &net.weight_hidden_output,
            &net.bias_hidden,
            &net.bias_output,
        ];
        for m in params {
            assert!(m.flatten().iter().all(|&x| (-1.0..1.0).contains(&x)));
        }
    }

    #[test]
    fn new_rejects_empty_layers() {
        assert!(matches!(
            Network::new(2, 0, 1),
            Err(NetworkError::InvalidTopology { input: 2, hidden: 0, output: 1 })
        ));
        assert!(Network::new(0, 3, 1).is_err());
        assert!(Network::new(2, 3, 0).is_err());
    }

    #[test]
    fn same_seed_same_network() {
        assert_eq!(seeded(2, 4, 1, 11), seeded(2, 4, 1, 11));
        assert_ne!(seeded(2, 4, 1, 11), seeded(2, 4, 1, 12));
    }

    #[test]
    fn predict_is_pure_and_bounded() {
        let net = seeded(2, 6, 3, 3);
        let before = net.clone();
        let out = net.predict(&[0.3, -0.7]).unwrap();
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|&y| y > 0.0 && y < 1.0));
        assert_eq!(net.predict(&[0.3, -0.7]).unwrap(), out);
        assert_eq!(net, before);
    }

    #[test]
    fn predict_rejects_wrong_input_size() {
        let net = seeded(2, 4, 1, 0);
        assert!(matches!(
            net.predict(&[1.0]),
            Err(NetworkError::InputSize { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn predict_matches_hand_computation() {
        let net =
            Network::from_parts(scalar(0.5), scalar(-0.8), scalar(0.1), scalar(0.2), 1.0).unwrap();
        let h = sigmoid(0.5 * 2.0 + 0.1);
        let o = sigmoid(-0.8 * h + 0.2);
        let out = net.predict(&[2.0]).unwrap();
        assert!((out[0] - o).abs() < 1e-12);
    }

    #[test]
    fn train_one_example_checks_sizes() {
        let mut net = seeded(2, 3, 1, 5);
        assert!(matches!(
            net.train_one_example(&[1.0, 0.0, 1.0], &[1.0]),
            Err(NetworkError::InputSize { expected: 2, actual: 3 })
        ));
        assert!(matches!(
            net.train_one_example(&[1.0, 0.0], &[1.0, 0.0]),
            Err(NetworkError::OutputSize { expected: 1, actual: 2 })
        ));
        assert_eq!(net, seeded(2, 3, 1, 5));
    }

    #[test]
    fn hidden_error_uses_pre_update_output_weights() {
        let (w_ih, w_ho, b_h, b_o, lr) = (0.5, -0.8, 0.1, 0.2, 0.5);
        let mut net =
            Network::from_parts(scalar(w_ih), scalar(w_ho), scalar(b_h), scalar(b_o), lr).unwrap();
        let (x, t) = (1.0, 1.0);

        net.train_one_example(&[x], &[t]).unwrap();

        let h = sigmoid(w_ih * x + b_h);
        let o = sigmoid(w_ho * h + b_o);
        let out_err = t - o;
        let out_grad = dsigmoid(o) * out_err * lr;
        let new_w_ho = w_ho + out_grad * h;

        let hidden_grad_pre = dsigmoid(h) * (w_ho * out_err) * lr;
        let hidden_grad_post = dsigmoid(h) * (new_w_ho * out_err) * lr;

        let got_w_ho = net.weight_hidden_output().get(0, 0).unwrap();
        let got_w_ih = net.weight_input_hidden().get(0, 0).unwrap();
        let got_b_h = net.bias_hidden().get(0, 0).unwrap();
        let got_b_o = net.bias_output().get(0, 0).unwrap();

        assert!((got_w_ho - new_w_ho).abs() < 1e-12);
        assert!((got_b_o - (b_o + out_grad)).abs() < 1e-12);
        assert!((got_w_ih - (w_ih + hidden_grad_pre * x)).abs() < 1e-12);
        assert!((got_b_h - (b_h + hidden_grad_pre)).abs() < 1e-12);
        assert!((got_w_ih - (w_ih + hidden_grad_post * x)).abs() > 1e-6);
    }

    #[test]
    fn train_one_example_reduces_error_on_that_example() {
        let mut net = seeded(3, 4, 2, 9);
        net.set_learning_rate(0.5).unwrap();
        let input = [0.2, 0.9, -0.4];
        let target = [1.0, 0.0];
        let first = net.train_one_example(&input, &target).unwrap();
        for _ in 0..50 {
            net.train_one_example(&input, &target).unwrap();
        }
        let after = MseLoss::loss(&net.predict(&input).unwrap(), &target);
        assert!(after < first);
    }

    #[test]
    fn validate_reports_each_failure_kind() {
        let net = seeded(2, 3, 1, 1);
        assert!(matches!(net.validate(&[], &[]), Err(NetworkError::EmptyDataset)));
        assert!(matches!(
            net.validate(&[vec![1.0, 0.0]], &[vec![1.0], vec![0.0]]),
            Err(NetworkError::DatasetLengthMismatch { inputs: 1, targets: 2 })
        ));
        assert!(matches!(
            net.validate(&[vec![1.0, 0.0], vec![1.0]], &[vec![1.0], vec![0.0]]),
            Err(NetworkError::InputRowSize { row: 1, expected: 2, actual: 1 })
        ));
        assert!(matches!(
            net.validate(&[vec![1.0, 0.0]], &[vec![1.0, 1.0]]),
            Err(NetworkError::TargetRowSize { row: 0, expected: 1, actual: 2 })
        ));
        assert!(net.validate(&[vec![1.0, 0.0]], &[vec![1.0]]).is_ok());
    }

    #[test]
    fn train_rejects_before_any_step() {
        let mut net = seeded(2, 3, 1, 4);
        let before = net.clone();
        assert!(matches!(net.train(&[], &[], 10), Err(NetworkError::EmptyDataset)));
        assert!(matches!(
            net.train(&[vec![1.0, 0.0]], &[vec![1.0], vec![0.0]], 10),
            Err(NetworkError::DatasetLengthMismatch { .. })
        ));
        assert_eq!(net, before);
    }

    #[test]
    fn from_parts_rejects_inconsistent_shapes() {
        let w_ih = Matrix::zeros(3, 2).unwrap();
        let w_ho = Matrix::zeros(1, 4).unwrap();
        let b_h = Matrix::zeros(3, 1).unwrap();
        let b_o = Matrix::zeros(1, 1).unwrap();
        assert!(matches!(
            Network::from_parts(w_ih, w_ho, b_h, b_o, 1.0),
            Err(NetworkError::InconsistentParameters(_))
        ));
    }

    #[test]
    fn learning_rate_must_be_positive() {
        let mut net = seeded(1, 1, 1, 0);
        assert!(net.set_learning_rate(0.0).is_err());
        assert!(net.set_learning_rate(f64::NAN).is_err());
        net.set_learning_rate(0.1).unwrap();
        assert_eq!(net.learning_rate(), 0.1);
    }
}
