use strata_core::config::{dirs_path, GlobalConfig};

#[test]
fn test_defaults() {
    let config = GlobalConfig::default();
    assert_eq!(config.resolver.beam_width, 5000);
    assert_eq!(config.resolver.limit, 10);
    assert_eq!(config.generator.sampling_probability, 0.5);
    assert!(config.index.warehouse.is_none());
    assert!(config.pipeline.units.is_empty());
}

#[test]
fn test_empty_toml_uses_defaults() {
    let config: GlobalConfig = toml::from_str("").unwrap();
    assert_eq!(config.resolver.beam_width, 5000);
    assert_eq!(config.generator.sampling_probability, 0.5);
}

#[test]
fn test_dirs_path_contains_strata() {
    assert!(dirs_path().ends_with(".strata"));
}

#[test]
fn test_load_missing_file_returns_defaults() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = GlobalConfig::load_from(&tmp.path().join("config.toml")).unwrap();
    assert_eq!(config.resolver.limit, 10);
}

#[test]
fn test_parse_from_toml() {
    let toml = r#"
[resolver]
beam-width = 16
limit = 3

[generator]
sampling-probability = 0.25

[index]
warehouse = "https://pypi.org/pypi"

[[pipeline.units]]
name = "SetScoreStep"
configuration = { package_name = "flask", score = 0.5 }
"#;
    let config: GlobalConfig = toml::from_str(toml).unwrap();
    assert_eq!(config.resolver.beam_width, 16);
    assert_eq!(config.resolver.limit, 3);
    assert_eq!(config.generator.sampling_probability, 0.25);
    assert_eq!(
        config.index.warehouse.as_deref(),
        Some("https://pypi.org/pypi")
    );
    assert_eq!(config.pipeline.units.len(), 1);
    assert_eq!(config.pipeline.units[0].name, "SetScoreStep");
    assert_eq!(
        config.pipeline.units[0].configuration["package_name"].as_str(),
        Some("flask")
    );
}
