use crate::prelude::{Config, SearchPolicy};

#[test]
fn config_from_json() {
    let cfg: Config = serde_json::from_str(
        r#"{
            "max_kepler_iter": 50,
            "kepler_tolerance_rad": 1.0E-9,
            "search_policy": "NearestPast"
        }"#,
    )
    .unwrap();

    assert_eq!(cfg.max_kepler_iter, 50);
    assert_eq!(cfg.kepler_tolerance_rad, 1.0E-9);
    assert_eq!(cfg.search_policy, SearchPolicy::NearestPast);
}

#[test]
fn config_from_empty_json() {
    let cfg: Config = serde_json::from_str("{}").unwrap();
    assert_eq!(cfg, Config::default());
}

#[test]
fn partial_config_preserves_defaults() {
    let cfg: Config = serde_json::from_str(r#"{"max_kepler_iter": 10}"#).unwrap();
    assert_eq!(cfg.max_kepler_iter, 10);
    assert_eq!(cfg.kepler_tolerance_rad, Config::default().kepler_tolerance_rad);
    assert_eq!(cfg.search_policy, SearchPolicy::ValidityWindow);
}
