use std::process::ExitCode;

use ferrite_mlp::{Network, NetworkResult, TrainConfig, train_loop};
use log::{error, info};

const EPOCHS: usize = 2000;
const HIDDEN_NODES: usize = 8;

// Trains the XOR toy problem and prints one line per input.
// An optional first argument names a JSON file to save the trained model to.
fn main() -> ExitCode {
    env_logger::init();

    match run(std::env::args().nth(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(save_path: Option<String>) -> NetworkResult<()> {
    let inputs = vec![
        vec![1.0, 0.0],
        vec![0.0, 1.0],
        vec![1.0, 1.0],
        vec![0.0, 0.0],
    ];
    let targets = vec![
        vec![1.0],
        vec![1.0],
        vec![0.0],
        vec![0.0],
    ];

    let mut network = Network::new(2, HIDDEN_NODES, 1)?;
    let loss = train_loop(&mut network, &inputs, &targets, &TrainConfig::new(EPOCHS))?;
    println!("Trained {EPOCHS} epochs, final loss = {loss:.6}");

    let mut correct = 0;
    for (input, target) in inputs.iter().zip(targets.iter()) {
        let raw = network.predict(input)?[0];
        let rounded = raw.round();
        let mark = if rounded == target[0] {
            correct += 1;
            "ok"
        } else {
            "MISMATCH"
        };
        println!(
            "Input: {:?} -> {:.7} (rounded {}, expected {}) {}",
            input, raw, rounded, target[0], mark
        );
    }
    info!("{correct}/{} XOR cases correct", inputs.len());

    if let Some(path) = save_path {
        network.save_json(&path)?;
        println!("Saved model to {path}");
    }
    Ok(())
}
