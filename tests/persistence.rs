use ferrite_mlp::{Network, NetworkError, NetworkSpec};

fn trained() -> Network {
    let spec = NetworkSpec { seed: Some(5), learning_rate: 0.8, ..NetworkSpec::new(2, 4, 1) };
    let mut network = spec.build().unwrap();
    network
        .train(
            &[vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0], vec![0.0, 0.0]],
            &[vec![1.0], vec![1.0], vec![0.0], vec![0.0]],
            50,
        )
        .unwrap();
    network
}

#[test]
fn save_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");

    let network = trained();
    network.save_json(&path).unwrap();
    let loaded = Network::load_json(&path).unwrap();

    assert_eq!(loaded, network);
    assert_eq!(loaded.hidden_nodes(), 4);
    assert_eq!(loaded.learning_rate(), 0.8);
    for input in [[1.0, 0.0], [0.0, 0.0]] {
        assert_eq!(loaded.predict(&input).unwrap(), network.predict(&input).unwrap());
    }
}

#[test]
fn loading_corrupt_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, r#"{"input_nodes": 2, "output_nodes": 1"#).unwrap();

    assert!(matches!(Network::load_json(&path), Err(NetworkError::Serialization(_))));
    assert!(matches!(
        Network::load_json(dir.path().join("missing.json")),
        Err(NetworkError::Io(_))
    ));
}

#[test]
fn spec_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spec.json");

    let spec = NetworkSpec { seed: Some(1), ..NetworkSpec::new(3, 7, 2) };
    spec.save_json(&path).unwrap();
    let loaded = NetworkSpec::load_json(&path).unwrap();

    assert_eq!(loaded, spec);
    assert_eq!(loaded.build().unwrap(), spec.build().unwrap());
}
