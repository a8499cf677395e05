use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::math::matrix::Matrix;
use crate::network::error::{NetworkError, NetworkResult};
use crate::network::network::Network;

/// On-disk form of a trained network. The hidden size is implied by the
/// matrix shapes and is re-derived on import.
#[derive(Serialize, Deserialize)]
struct NetworkRecord {
    input_nodes: usize,
    output_nodes: usize,
    learning_rate: f64,
    weight_input_hidden: Matrix,
    weight_hidden_output: Matrix,
    bias_hidden: Matrix,
    bias_output: Matrix,
}

impl NetworkRecord {
    /// Rebuilds the network, rejecting any shape that disagrees with the
    /// stored node counts or with the other matrices.
    fn into_network(self) -> NetworkResult<Network> {
        let (input_nodes, output_nodes) = (self.input_nodes, self.output_nodes);
        let network = Network::from_parts(
            self.weight_input_hidden,
            self.weight_hidden_output,
            self.bias_hidden,
            self.bias_output,
            self.learning_rate,
        )
        .map_err(|e| NetworkError::Serialization(e.to_string()))?;

        if network.input_nodes() != input_nodes {
            return Err(NetworkError::Serialization(format!(
                "input_nodes is {input_nodes} but weight_input_hidden has {} cols",
                network.input_nodes()
            )));
        }
        if network.output_nodes() != output_nodes {
            return Err(NetworkError::Serialization(format!(
                "output_nodes is {output_nodes} but weight_hidden_output has {} rows",
                network.output_nodes()
            )));
        }
        Ok(network)
    }
}

impl From<&Network> for NetworkRecord {
    fn from(network: &Network) -> NetworkRecord {
        NetworkRecord {
            input_nodes: network.input_nodes,
            output_nodes: network.output_nodes,
            learning_rate: network.learning_rate,
            weight_input_hidden: network.weight_input_hidden.clone(),
            weight_hidden_output: network.weight_hidden_output.clone(),
            bias_hidden: network.bias_hidden.clone(),
            bias_output: network.bias_output.clone(),
        }
    }
}

impl Network {
    pub fn to_json(&self) -> NetworkResult<String> {
        Ok(serde_json::to_string(&NetworkRecord::from(self))?)
    }

    pub fn to_json_pretty(&self) -> NetworkResult<String> {
        Ok(serde_json::to_string_pretty(&NetworkRecord::from(self))?)
    }

    /// Parses a network exported by `to_json`. Malformed or inconsistent
    /// data yields `NetworkError::Serialization` and no network.
    pub fn from_json(json: &str) -> NetworkResult<Network> {
        let record: NetworkRecord = serde_json::from_str(json)?;
        record.into_network()
    }

    /// Serializes the network to a pretty-printed JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> NetworkResult<()> {
        let file = File::create(path.as_ref())?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &NetworkRecord::from(self))?;
        info!("saved network to {}", path.as_ref().display());
        Ok(())
    }

    /// Deserializes a network from a JSON file previously written by `save_json`.
    pub fn load_json<P: AsRef<Path>>(path: P) -> NetworkResult<Network> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        let record: NetworkRecord = serde_json::from_reader(reader)?;
        let network = record.into_network()?;
        info!(
            "loaded network {}-{}-{} from {}",
            network.input_nodes(),
            network.hidden_nodes(),
            network.output_nodes(),
            path.as_ref().display()
        );
        Ok(network)
    }
}
