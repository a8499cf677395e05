use std::time::Instant;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::network::error::NetworkResult;
use crate::network::network::Network;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `network` for `config.epochs` epochs and returns the mean training
/// loss of the **last completed epoch** (`0.0` when `epochs` is zero).
///
/// The dataset is validated once, up front; nothing is updated if it is
/// rejected. Each epoch visits every (input, target) pair exactly once in a
/// fresh random order and takes one gradient step per pair.
///
/// # Arguments
/// - `network` — mutable reference to the network; modified in place
/// - `inputs`  — training samples, each a `Vec<f64>` of length `input_nodes`
/// - `targets` — corresponding targets, same length as `inputs`
/// - `config`  — epoch count, optional shuffle seed, optional progress channel
pub fn train_loop(
    network: &mut Network,
    inputs: &[Vec<f64>],
    targets: &[Vec<f64>],
    config: &TrainConfig,
) -> NetworkResult<f64> {
    network.validate(inputs, targets)?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut progress_tx = config.progress_tx.as_ref();
    let mut last_train_loss = 0.0;

    info!(
        "training {}-{}-{} network on {} examples for {} epochs",
        network.input_nodes(),
        network.hidden_nodes(),
        network.output_nodes(),
        inputs.len(),
        config.epochs
    );

    for epoch in 1..=config.epochs {
        let t_start = Instant::now();

        let train_loss = run_one_epoch(network, inputs, targets, &mut rng)?;
        last_train_loss = train_loss;

        let elapsed_ms = t_start.elapsed().as_millis() as u64;
        debug!("epoch {epoch}/{}: loss = {train_loss:.6}", config.epochs);

        if let Some(tx) = progress_tx {
            let stats = EpochStats {
                epoch,
                total_epochs: config.epochs,
                train_loss,
                elapsed_ms,
            };
            if tx.send(stats).is_err() {
                debug!("progress receiver dropped; continuing without reports");
                progress_tx = None;
            }
        }
    }

    info!("training finished: last epoch loss = {last_train_loss:.6}");
    Ok(last_train_loss)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Runs one full epoch of per-example SGD in shuffled order.
/// Returns the mean loss over all samples.
fn run_one_epoch<R: Rng + ?Sized>(
    network: &mut Network,
    inputs: &[Vec<f64>],
    targets: &[Vec<f64>],
    rng: &mut R,
) -> NetworkResult<f64> {
    let n = inputs.len();
    let mut total_loss = 0.0;

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);

    for idx in indices {
        total_loss += network.train_one_example(&inputs[idx], &targets[idx])?;
    }

    Ok(total_loss / n as f64)
}
