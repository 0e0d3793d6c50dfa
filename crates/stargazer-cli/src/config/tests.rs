use super::*;
use pretty_assertions::assert_eq;
use stargazer_ranker::Feature;

#[test]
fn test_overrides_take_precedence() {
    let mut config = StargazerConfig::default();
    config.scoring.disabled_features = vec!["co_occurrence".to_string()];

    apply(
        &mut config,
        &Overrides {
            offline: true,
            disabled_features: vec!["network_degree".to_string(), "co_occurrence".to_string()],
            out_dir: Some(PathBuf::from("/tmp/out")),
            format: Some("json".to_string()),
            top_n: Some(5),
        },
    );

    assert!(config.sources.offline);
    assert_eq!(config.scoring.disabled_features, vec!["co_occurrence", "network_degree"]);
    assert_eq!(config.output.dir, PathBuf::from("/tmp/out"));
    assert_eq!(export_format(&config).unwrap(), ExportFormat::Json);
    assert_eq!(config.output.top_n, 5);

    let set = features(&config).unwrap();
    assert_eq!(set.len(), 3);
    assert!(!set.contains(Feature::NetworkDegree));
}

#[test]
fn test_empty_overrides_keep_file_values() {
    let mut config = StargazerConfig::default();
    config.output.format = "csv".to_string();
    apply(&mut config, &Overrides::default());
    assert!(!config.sources.offline);
    assert_eq!(config.output.format, "csv");
}

#[test]
fn test_threshold_resolution() {
    let mut config = StargazerConfig::default();
    config.scoring.default_p_value = 0.001;
    assert_eq!(threshold(None, &config).value(), 0.001);
    assert_eq!(threshold(Some("5E-4"), &config).value(), 5e-4);
    assert_eq!(threshold(Some("abc"), &config).value(), 0.05);

    config.scoring.default_p_value = 7.0;
    assert_eq!(threshold(None, &config).value(), 0.05);
}

#[test]
fn test_disabling_everything_is_an_error() {
    let mut config = StargazerConfig::default();
    config.scoring.disabled_features = Feature::ALL.iter().map(|f| f.key().to_string()).collect();
    assert!(features(&config).is_err());

    config.scoring.disabled_features = vec!["pocket".to_string()];
    assert!(features(&config).is_err());
}

#[test]
fn test_load_from_explicit_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stargazer.toml");
    std::fs::write(&path, "[output]\ntop_n = 3\n").unwrap();

    let config = load(Some(&path), &Overrides { top_n: Some(7), ..Default::default() }).unwrap();
    assert_eq!(config.output.top_n, 7);
    assert_eq!(config.output.format, "both");
}
