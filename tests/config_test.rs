use folio_ngin::config::{PortfolioConfig, hex_to_rgb};

#[test]
fn should_reproduce_stock_page_by_default() {
    let config = PortfolioConfig::default();
    assert!(config.validate().is_ok());

    let models = config.projects.iter().map(|p| p.model.as_str()).collect::<Vec<_>>();
    assert_eq!(models, vec!["cat", "cats", "maxwell", "oiia"]);
    assert_eq!(config.camera.home.position, [3.0, 2.0, 5.0]);
    assert_eq!(config.camera.overview.position, [0.0, 6.0, 0.0]);
    assert_eq!(config.camera.transition_speed, 0.05);
    assert_eq!(config.model_path(&config.projects[2]), "models/maxwell/scene.gltf");
}

#[test]
fn should_override_only_named_fields() {
    let json = r#"{
        "idle": { "bob_amplitude": 0.25 },
        "camera": { "transition_speed": 0.1 },
        "model_dir": "assets3d"
    }"#;
    let config = PortfolioConfig::from_json(json).expect("partial config parses");
    let defaults = PortfolioConfig::default();

    assert_eq!(config.idle.bob_amplitude, 0.25);
    assert_eq!(config.idle.spin_rate, defaults.idle.spin_rate);
    assert_eq!(config.camera.transition_speed, 0.1);
    assert_eq!(config.camera.home, defaults.camera.home);
    assert_eq!(config.projects, defaults.projects);
    assert_eq!(config.model_dir, "assets3d");
}

#[test]
fn should_read_project_table() {
    let json = r#"{
        "projects": [
            { "id": 10, "position": [0, -1, 0], "rotation": 0.5, "model": "robot", "scale": 2 },
            { "id": 11, "position": [3, -1, 0], "rotation": 0, "model": "tree", "scale": 0.5 }
        ]
    }"#;
    let config = PortfolioConfig::from_json(json).expect("parses");
    assert_eq!(config.projects.len(), 2);
    assert_eq!(config.projects[0].id, 10);
    assert_eq!(config.model_path(&config.projects[1]), "models/tree/scene.gltf");
}

#[test]
fn should_reject_invalid_documents() {
    assert!(PortfolioConfig::from_json("{ not json").is_err());
    assert!(PortfolioConfig::from_json(r#"{ "projects": [] }"#).is_err());

    let duplicate = r#"{ "projects": [
        { "id": 1, "position": [0, 0, 0], "rotation": 0, "model": "a", "scale": 1 },
        { "id": 1, "position": [1, 0, 0], "rotation": 0, "model": "b", "scale": 1 }
    ] }"#;
    assert!(PortfolioConfig::from_json(duplicate).is_err());

    let flat = r#"{ "projects": [
        { "id": 1, "position": [0, 0, 0], "rotation": 0, "model": "a", "scale": 0 }
    ] }"#;
    assert!(PortfolioConfig::from_json(flat).is_err());
}

#[test]
#[cfg(not(target_arch = "wasm32"))]
fn should_fall_back_to_defaults_without_file() {
    // The test working directory has no assets/portfolio.json
    let config = futures::executor::block_on(PortfolioConfig::load());
    assert_eq!(config, PortfolioConfig::default());
}

#[test]
fn should_convert_hex_to_linear() {
    assert_eq!(hex_to_rgb(0x000000), [0.0, 0.0, 0.0]);
    for channel in hex_to_rgb(0xffffff) {
        assert!((channel - 1.0).abs() < 1e-5);
    }
    let [r, g, b] = hex_to_rgb(0x808080);
    assert!((r - 0.2158).abs() < 1e-3);
    assert_eq!(r, g);
    assert_eq!(g, b);
}
