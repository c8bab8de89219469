// tests/error_handling.rs

use std::io::Write;

use tempfile::NamedTempFile;
use workchain::config::{load_and_validate, validate_kinds, WorkersSection};
use workchain::errors::WorkchainError;
use workchain::types::{Constraint, ExistingChainPolicy};
use workchain::work::Value;
use workchain::workers::sample_registry;
use workchain_test_utils::builders::{ChainConfigBuilder, ConfigFileBuilder, UnitConfigBuilder};

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

#[test]
fn test_chain_without_units_returns_config_error() {
    let file = write_config(
        r#"
[chain.empty]
policy = "keep"
"#,
    );

    match load_and_validate(file.path()) {
        Err(WorkchainError::ConfigError(msg)) => {
            assert!(msg.contains("at least one"));
            assert!(msg.contains("empty"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_zero_workers_returns_config_error() {
    let file = write_config(
        r#"
[config]
max_workers = 0
"#,
    );

    match load_and_validate(file.path()) {
        Err(WorkchainError::ConfigError(msg)) => assert!(msg.contains("max_workers")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_empty_kind_returns_config_error() {
    let file = write_config(
        r#"
[[chain.x.unit]]
kind = "  "
"#,
    );

    match load_and_validate(file.path()) {
        Err(WorkchainError::ConfigError(msg)) => assert!(msg.contains("empty `kind`")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_unknown_policy_returns_toml_error() {
    let file = write_config(
        r#"
[chain.x]
policy = "sometimes"

[[chain.x.unit]]
kind = "blur"
"#,
    );

    match load_and_validate(file.path()) {
        Err(WorkchainError::TomlError(_)) => {}
        Err(e) => panic!("Expected TomlError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_unknown_constraint_returns_toml_error() {
    let file = write_config(
        r#"
[[chain.x.unit]]
kind = "save"
constraints = ["moon_is_full"]
"#,
    );

    assert!(matches!(
        load_and_validate(file.path()),
        Err(WorkchainError::TomlError(_))
    ));
}

#[test]
fn test_missing_file_returns_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does-not-exist.toml");

    assert!(matches!(
        load_and_validate(&path),
        Err(WorkchainError::IoError(_))
    ));
}

#[test]
fn test_unknown_kind_is_reported_with_chain_name() {
    let cfg = ConfigFileBuilder::new()
        .with_chain(
            "pipeline",
            ChainConfigBuilder::new()
                .unit(UnitConfigBuilder::new("cleanup").build())
                .unit(UnitConfigBuilder::new("sharpen").build())
                .build(),
        )
        .build();

    let registry = sample_registry(&WorkersSection::default());
    match validate_kinds(&cfg, &registry) {
        Err(WorkchainError::UnknownKind(msg)) => {
            assert!(msg.contains("sharpen"));
            assert!(msg.contains("pipeline"));
        }
        Err(e) => panic!("Expected UnknownKind, got: {:?}", e),
        Ok(()) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_valid_config_loads_with_defaults_and_values() {
    let file = write_config(
        r#"
[config]
tick_interval_ms = 50

[device]
charging = true

[workers]
simulated_delay_ms = 5

[chain.pipeline]
policy = "append"

[[chain.pipeline.unit]]
kind = "cleanup"

[[chain.pipeline.unit]]
kind = "blur"
tags = ["progress"]
input = { uri = "img://1", passes = 2, sharp = false, gamma = 1.5 }

[[chain.pipeline.unit]]
kind = "save"
tags = ["output"]
constraints = ["charging", "storage_not_low"]
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.config.max_workers, 4);
    assert_eq!(cfg.config.tick_interval_ms, 50);
    assert!(cfg.config.retain_finished);
    assert!(cfg.device.charging);
    assert!(cfg.device.network_connected);
    assert_eq!(cfg.workers.simulated_delay_ms, 5);

    let pipeline = &cfg.chain["pipeline"];
    assert_eq!(pipeline.policy, ExistingChainPolicy::Append);

    let chain = pipeline.to_chain().unwrap();
    let units = chain.units();
    assert_eq!(units.len(), 3);
    assert_eq!(units[1].input().get_str("uri"), Some("img://1"));
    assert_eq!(units[1].input().get("passes"), Some(&Value::Int(2)));
    assert_eq!(units[1].input().get("sharp"), Some(&Value::Bool(false)));
    assert_eq!(units[1].input().get("gamma"), Some(&Value::Float(1.5)));
    assert!(units[1].has_tag("progress"));
    assert!(units[2].constraints().contains(&Constraint::Charging));
    assert!(units[2].constraints().contains(&Constraint::StorageNotLow));

    validate_kinds(&cfg, &sample_registry(&cfg.workers)).unwrap();
}

#[test]
fn test_each_to_chain_call_mints_fresh_ids() {
    let cfg = ConfigFileBuilder::new()
        .with_chain(
            "x",
            ChainConfigBuilder::new()
                .unit(UnitConfigBuilder::new("cleanup").build())
                .build(),
        )
        .build();

    let a = cfg.chain["x"].to_chain().unwrap();
    let b = cfg.chain["x"].to_chain().unwrap();
    assert_ne!(a.head().id(), b.head().id());
}

#[test]
fn test_policy_and_constraint_parse_from_strings() {
    assert_eq!("KEEP".parse::<ExistingChainPolicy>(), Ok(ExistingChainPolicy::Keep));
    assert!("sometimes".parse::<ExistingChainPolicy>().is_err());
    assert_eq!(
        "network_connected".parse::<Constraint>(),
        Ok(Constraint::NetworkConnected)
    );
    assert!("moon".parse::<Constraint>().is_err());
}
