use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::network::error::NetworkResult;
use crate::network::network::{Network, DEFAULT_LEARNING_RATE};

/// A serializable description of a network's topology and hyperparameters.
///
/// `NetworkSpec` can be saved to / loaded from JSON independently of the
/// trained weights, so a configuration can be stored before training starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub input_nodes: usize,
    pub hidden_nodes: usize,
    pub output_nodes: usize,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    /// Fixes the parameter initialization when set.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_learning_rate() -> f64 {
    DEFAULT_LEARNING_RATE
}

impl NetworkSpec {
    pub fn new(input_nodes: usize, hidden_nodes: usize, output_nodes: usize) -> NetworkSpec {
        NetworkSpec {
            input_nodes,
            hidden_nodes,
            output_nodes,
            learning_rate: DEFAULT_LEARNING_RATE,
            seed: None,
        }
    }

    /// Builds a freshly initialized network from this spec.
    pub fn build(&self) -> NetworkResult<Network> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut network = Network::with_rng(
            self.input_nodes,
            self.hidden_nodes,
            self.output_nodes,
            &mut rng,
        )?;
        network.set_learning_rate(self.learning_rate)?;
        Ok(network)
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> NetworkResult<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> NetworkResult<NetworkSpec> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
