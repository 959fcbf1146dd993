// tests/config_loading.rs

use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;

use command_runner::config::{ConfigFile, load_and_validate, parse_duration, validate_config};
use command_runner::errors::RunnerError;
use command_runner_test_utils::builders::ConfigFileBuilder;

#[test]
fn full_config_is_parsed_and_validated() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[runner]
name = "pokemon"

[demo]
delay = "750ms"
fail_with = "offline"
triggers = 5
trigger_interval = "2s"
rounds = 4
"#
    )
    .unwrap();

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.runner.name, "pokemon");
    assert_eq!(cfg.demo.delay, Duration::from_millis(750));
    assert_eq!(cfg.demo.fail_with.as_deref(), Some("offline"));
    assert_eq!(cfg.demo.triggers, 5);
    assert_eq!(cfg.demo.trigger_interval, Duration::from_secs(2));
    assert_eq!(cfg.demo.rounds, 4);
}

#[test]
fn empty_file_uses_defaults() {
    let file = NamedTempFile::new().unwrap();

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.runner.name, "command");
    assert_eq!(cfg.demo.delay, Duration::from_millis(500));
    assert_eq!(cfg.demo.fail_with, None);
    assert_eq!(cfg.demo.triggers, 3);
    assert_eq!(cfg.demo.trigger_interval, Duration::from_millis(100));
    assert_eq!(cfg.demo.rounds, 2);
}

#[test]
fn bad_duration_returns_config_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[demo]
delay = "soon"
"#
    )
    .unwrap();

    match load_and_validate(file.path()) {
        Err(RunnerError::Config(msg)) => {
            assert!(msg.contains("[demo].delay"));
        }
        Err(e) => panic!("Expected Config error, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn invalid_toml_returns_toml_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[runner\nname = 1").unwrap();

    let result = load_and_validate(file.path());
    assert!(matches!(result, Err(RunnerError::Toml(_))), "got {result:?}");
}

#[test]
fn missing_explicit_path_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_and_validate(dir.path().join("nope.toml"));
    assert!(matches!(result, Err(RunnerError::Io(_))), "got {result:?}");
}

#[test]
fn zero_counts_and_empty_names_are_rejected() {
    let cases = [
        (ConfigFileBuilder::new().triggers(0).build_raw(), "[demo].triggers"),
        (ConfigFileBuilder::new().rounds(0).build_raw(), "[demo].rounds"),
        (ConfigFileBuilder::new().name("  ").build_raw(), "[runner].name"),
        (
            ConfigFileBuilder::new().trigger_interval("5x").build_raw(),
            "[demo].trigger_interval",
        ),
    ];

    for (raw, needle) in cases {
        assert!(validate_config(&raw).is_err());
        match ConfigFile::try_from(raw) {
            Err(RunnerError::Config(msg)) => assert!(msg.contains(needle), "{msg}"),
            other => panic!("expected Config error mentioning {needle}, got {other:?}"),
        }
    }
}

#[test]
fn builder_defaults_validate() {
    let raw = ConfigFileBuilder::new()
        .name("demo")
        .delay("1s")
        .fail_with("nope")
        .build_raw();
    let cfg = ConfigFile::try_from(raw).unwrap();
    assert_eq!(cfg.demo.delay, Duration::from_secs(1));
    assert_eq!(cfg.demo.fail_with.as_deref(), Some("nope"));
}

#[test]
fn durations_parse_with_units() {
    assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
    assert_eq!(parse_duration(" 3s "), Ok(Duration::from_secs(3)));
    assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
    assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
    assert!(parse_duration("").is_err());
    assert!(parse_duration("10").is_err());
    assert!(parse_duration("ms").is_err());
    assert!(parse_duration("4d").is_err());
}

#[test]
fn oversized_duration_is_rejected_not_wrapped() {
    assert_eq!(
        parse_duration("18446744073709551615s"),
        Ok(Duration::from_secs(u64::MAX))
    );
    let err = parse_duration("18446744073709551615h").unwrap_err();
    assert!(err.contains("too large"), "got: {err}");
    assert!(parse_duration("307445734561825861m").is_err());
}

#[test]
fn oversized_delay_in_config_is_a_config_error() {
    let raw = ConfigFileBuilder::new()
        .delay("18446744073709551615h")
        .build_raw();
    let err = validate_config(&raw).unwrap_err();
    assert!(matches!(err, RunnerError::Config(_)), "got: {err:?}");
}
