#![allow(clippy::float_cmp)]

use std::collections::HashMap;

use super::*;

fn attrs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
}

fn from_map(map: &HashMap<String, String>) -> Result<ViewerConfig, ConfigError> {
    ViewerConfig::from_attributes(|name| map.get(name).cloned())
}

// --- Defaults ---

#[test]
fn default_values() {
    let config = ViewerConfig::default();
    assert_eq!(config.fit_padding, 0.04);
    assert_eq!(config.min_box_factor, 0.08);
    assert_eq!(config.max_box_factor, 20.0);
    assert_eq!(config.wheel_step, 1.1);
}

#[test]
fn default_passes_validation() {
    let config = ViewerConfig::default();
    assert_eq!(config.validate().unwrap(), config);
}

// --- JSON ---

#[test]
fn json_partial_keeps_defaults() {
    let config = ViewerConfig::from_json(r#"{"fitPadding": 0.1}"#).unwrap();
    assert_eq!(config.fit_padding, 0.1);
    assert_eq!(config.wheel_step, DEFAULT_WHEEL_STEP);
    assert_eq!(config.max_box_factor, DEFAULT_MAX_BOX_FACTOR);
}

#[test]
fn json_all_fields() {
    let config = ViewerConfig::from_json(
        r#"{"fitPadding": 0, "minBoxFactor": 0.25, "maxBoxFactor": 4, "wheelStep": 1.5}"#,
    )
    .unwrap();
    assert_eq!(
        config,
        ViewerConfig { fit_padding: 0.0, min_box_factor: 0.25, max_box_factor: 4.0, wheel_step: 1.5 }
    );
}

#[test]
fn json_empty_object_is_default() {
    assert_eq!(ViewerConfig::from_json("{}").unwrap(), ViewerConfig::default());
}

#[test]
fn json_malformed_is_error() {
    let err = ViewerConfig::from_json("{fitPadding:").unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
    assert!(err.to_string().starts_with("invalid viewer config JSON"));
}

#[test]
fn json_wrong_type_is_error() {
    let err = ViewerConfig::from_json(r#"{"wheelStep": "fast"}"#).unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn json_out_of_range_is_rejected() {
    let err = ViewerConfig::from_json(r#"{"wheelStep": 1.0}"#).unwrap_err();
    assert!(matches!(err, ConfigError::OutOfRange { field: "wheel_step", .. }));
}

// --- Validation ---

#[test]
fn validate_rejects_negative_padding() {
    let config = ViewerConfig { fit_padding: -0.1, ..ViewerConfig::default() };
    assert!(matches!(config.validate(), Err(ConfigError::OutOfRange { field: "fit_padding", .. })));
}

#[test]
fn validate_rejects_zero_box_factor() {
    let config = ViewerConfig { min_box_factor: 0.0, ..ViewerConfig::default() };
    assert!(matches!(config.validate(), Err(ConfigError::OutOfRange { field: "min_box_factor", .. })));
}

#[test]
fn validate_rejects_non_finite() {
    let config = ViewerConfig { max_box_factor: f64::INFINITY, ..ViewerConfig::default() };
    assert!(matches!(config.validate(), Err(ConfigError::OutOfRange { field: "max_box_factor", .. })));
}

#[test]
fn validate_swaps_inverted_bounds() {
    let config = ViewerConfig { min_box_factor: 5.0, max_box_factor: 0.5, ..ViewerConfig::default() };
    let config = config.validate().unwrap();
    assert_eq!(config.min_box_factor, 0.5);
    assert_eq!(config.max_box_factor, 5.0);
}

// --- Attributes ---

#[test]
fn attributes_absent_is_default() {
    assert_eq!(from_map(&HashMap::new()).unwrap(), ViewerConfig::default());
}

#[test]
fn attributes_individual_overrides() {
    let map = attrs(&[(ATTR_FIT_PADDING, "0"), (ATTR_MIN_ZOOM, "0.2"), (ATTR_MAX_ZOOM, "8"), (ATTR_WHEEL_STEP, "1.25")]);
    let config = from_map(&map).unwrap();
    assert_eq!(
        config,
        ViewerConfig { fit_padding: 0.0, min_box_factor: 0.2, max_box_factor: 8.0, wheel_step: 1.25 }
    );
}

#[test]
fn attributes_override_json() {
    let map = attrs(&[(ATTR_CONFIG, r#"{"fitPadding": 0.2, "wheelStep": 2}"#), (ATTR_FIT_PADDING, " 0.1 ")]);
    let config = from_map(&map).unwrap();
    assert_eq!(config.fit_padding, 0.1);
    assert_eq!(config.wheel_step, 2.0);
}

#[test]
fn attributes_blank_values_are_ignored() {
    let map = attrs(&[(ATTR_CONFIG, "  "), (ATTR_MIN_ZOOM, "")]);
    assert_eq!(from_map(&map).unwrap(), ViewerConfig::default());
}

#[test]
fn attributes_bad_number_names_attribute() {
    let map = attrs(&[(ATTR_MIN_ZOOM, "tiny")]);
    let err = from_map(&map).unwrap_err();
    match &err {
        ConfigError::InvalidNumber { attr, value } => {
            assert_eq!(*attr, ATTR_MIN_ZOOM);
            assert_eq!(value, "tiny");
        }
        other => panic!("expected InvalidNumber, got {other:?}"),
    }
    assert_eq!(err.to_string(), "invalid number for data-min-zoom: \"tiny\"");
}

#[test]
fn attributes_bad_json_is_error() {
    let map = attrs(&[(ATTR_CONFIG, "not json")]);
    assert!(matches!(from_map(&map), Err(ConfigError::Json(_))));
}

#[test]
fn attributes_are_validated_after_merge() {
    let map = attrs(&[(ATTR_WHEEL_STEP, "0.9")]);
    assert!(matches!(from_map(&map), Err(ConfigError::OutOfRange { field: "wheel_step", .. })));
}
