//! Command-line parameter handling and generator configuration files.

use lfg_parking_lot::config::{
    ConfigError, EndPolicy, GeneratorConfig, RawParameters, SimulationConfig, WaveRange,
};
use lfg_parking_lot::core::banner_lines;

fn raw(t1: i64, t2: i64, bonus: Option<i64>) -> RawParameters {
    RawParameters {
        instances: 2,
        tanks: 4,
        healers: 4,
        dps: 12,
        t1,
        t2,
        bonus_duration: bonus,
    }
}

#[test]
fn test_command_line_flow_clamps_and_describes() {
    let mut config = raw(1, 40, Some(30))
        .into_config(Some(GeneratorConfig::default()))
        .unwrap();
    let clamps: Vec<String> = config
        .clamp_durations()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(clamps, vec!["Note: t2 clamped from 40 to 15 (max: 15)"]);

    let banner = banner_lines(&config);
    assert_eq!(banner[0], "=== Starting LFG Simulation ===");
    assert_eq!(banner[3], "Clear time:    [1,15] seconds");
    assert_eq!(banner[4], "Bonus mode:    30 seconds");
}

#[test]
fn test_unbounded_and_disabled_bonus_in_banner() {
    let unbounded = raw(2, 3, None)
        .into_config(Some(GeneratorConfig::default()))
        .unwrap();
    assert_eq!(banner_lines(&unbounded)[4], "Bonus mode:    Infinite");

    let disabled = raw(2, 3, Some(10)).into_config(None).unwrap();
    assert_eq!(banner_lines(&disabled)[4], "Bonus mode:    Disabled");
}

#[test]
fn test_invalid_parameters_rejected_in_argument_order() {
    let mut params = raw(1, 2, None);
    params.instances = 0;
    params.tanks = -1;
    assert_eq!(
        params.into_config(None),
        Err(ConfigError::InstanceCount(0))
    );

    let mut params = raw(1, 2, None);
    params.healers = -3;
    assert_eq!(
        params.into_config(None),
        Err(ConfigError::NegativePlayers {
            role: "healers",
            value: -3
        })
    );

    assert!(matches!(
        raw(5, 2, None).into_config(None),
        Err(ConfigError::InvalidDurationRange { min: 5, max: 2 })
    ));
    assert_eq!(
        raw(1, 2, Some(-4)).into_config(None),
        Err(ConfigError::NegativeBonusDuration(-4))
    );
}

#[test]
fn test_generator_file_with_partial_fields() {
    let json = r#"{
        "check_interval_ms": 250,
        "generation_probability": 0.75,
        "dps_per_wave": { "min": 1, "max": 3 }
    }"#;
    let generator = GeneratorConfig::from_json_str(json).unwrap();
    assert_eq!(generator.check_interval_ms, 250);
    assert!((generator.generation_probability - 0.75).abs() < f64::EPSILON);
    assert_eq!(generator.dps_per_wave, WaveRange::new(1, 3));
    assert_eq!(generator.tanks_per_wave, WaveRange::new(0, 2));

    // The command-line bonus duration wins over the file.
    let config = raw(1, 2, Some(8)).into_config(Some(generator)).unwrap();
    assert_eq!(config.generator.unwrap().bonus_duration_secs, 8);
}

#[test]
fn test_generator_file_errors() {
    assert!(matches!(
        GeneratorConfig::from_json_str("{ not json"),
        Err(ConfigError::Parse(_))
    ));
    assert!(matches!(
        GeneratorConfig::from_json_str(r#"{ "generation_probability": 1.5 }"#),
        Err(ConfigError::InvalidGenerator(_))
    ));
    assert!(matches!(
        GeneratorConfig::from_json_str(r#"{ "tanks_per_wave": { "min": 4, "max": 1 } }"#),
        Err(ConfigError::InvalidGenerator(_))
    ));
}

#[test]
fn test_simulation_config_serde() {
    let config = SimulationConfig {
        instances: 3,
        end_policy: EndPolicy::Drain,
        ..SimulationConfig::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains("\"end_policy\":\"drain\""));
    let back: SimulationConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}
