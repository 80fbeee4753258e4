// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the digestbot configuration system.

use digestbot_config::diagnostic::ConfigError;
use digestbot_config::model::DigestConfig;
use digestbot_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};
use figment::Jail;

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_config() {
    let toml = r#"
[agent]
name = "digest"
log_level = "debug"

[storage]
database_path = "/tmp/test.db"
wal_mode = false

[timers]
overdue_minutes = 15
poll_interval_secs = 120
wait_slack_secs = 2
wake_buffer_secs = 1
recovery_interval_secs = 900
request_timeout_secs = 4
max_timers_per_user = 3
min_frequency_secs = 7200
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "digest");
    assert_eq!(config.agent.log_level, "debug");
    assert_eq!(config.storage.database_path, "/tmp/test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.timers.overdue_minutes, 15);
    assert_eq!(config.timers.poll_interval_secs, 120);
    assert_eq!(config.timers.wait_slack_secs, 2);
    assert_eq!(config.timers.wake_buffer_secs, 1);
    assert_eq!(config.timers.recovery_interval_secs, 900);
    assert_eq!(config.timers.request_timeout_secs, 4);
    assert_eq!(config.timers.max_timers_per_user, 3);
    assert_eq!(config.timers.min_frequency_secs, 7200);
}

#[test]
fn missing_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML is valid");
    let defaults = DigestConfig::default();
    assert_eq!(config.agent.name, "digestbot");
    assert_eq!(config.agent.log_level, "info");
    assert!(config.storage.wal_mode);
    assert!(config.storage.database_path.ends_with("digestbot.db"));
    assert_eq!(config.timers, defaults.timers);
}

#[test]
fn unknown_top_level_section_is_rejected() {
    let err = load_config_from_str("[telegram]\nbot_token = \"x\"\n")
        .expect_err("unknown section should be rejected");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("telegram"),
        "error should mention the unknown section, got: {err_str}"
    );
}

#[test]
fn unknown_timer_key_gets_suggestion_and_span() {
    let toml = r#"
[timers]
overdue_minuts = 5
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { section, key, suggestion, .. } if {
            section == "timers"
                && key == "overdue_minuts"
                && suggestion.as_deref() == Some("overdue_minutes")
        })
    });
    assert!(found, "expected UnknownKey with suggestion, got: {errors:?}");
}

#[test]
fn invalid_type_is_reported() {
    let toml = r#"
[timers]
max_timers_per_user = "five"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject invalid type");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("max_timers_per_user"))),
        "got: {errors:?}"
    );
}

#[test]
fn semantic_validation_runs_after_extraction() {
    let toml = r#"
[timers]
min_frequency_secs = 30
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("min_frequency_secs"))
    ));
}

#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};

    let text = "[timers]\noverdue_minuts = 5\n";
    let error = ConfigError::UnknownKey {
        section: "timers".to_string(),
        key: "overdue_minuts".to_string(),
        suggestion: Some("overdue_minutes".to_string()),
        span: Some(SourceSpan::new(9.into(), 14)),
        src: Some(NamedSource::new("digestbot.toml", text.to_string())),
    };
    assert!(error.code().is_some());
    let help = error.help().map(|h| h.to_string()).unwrap_or_default();
    assert!(help.contains("did you mean `overdue_minutes`"), "got: {help}");
    assert!(help.contains("max_timers_per_user"), "got: {help}");

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render without error");
    assert!(buf.contains("unknown key `overdue_minuts` in [timers]"));
    assert!(buf.contains("not a digestbot setting"));
}

#[test]
fn env_vars_override_file_with_section_mapping() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "custom.toml",
            r#"
[agent]
name = "from-file"

[timers]
max_timers_per_user = 3
"#,
        )?;
        jail.set_env("DIGESTBOT_AGENT_NAME", "from-env");
        jail.set_env("DIGESTBOT_TIMERS_MAX_TIMERS_PER_USER", "9");
        jail.set_env("DIGESTBOT_STORAGE_DATABASE_PATH", "/var/lib/digestbot.db");

        let config = load_and_validate_path(std::path::Path::new("custom.toml"))
            .map_err(|errors| format!("{errors:?}"))?;
        assert_eq!(config.agent.name, "from-env");
        assert_eq!(config.timers.max_timers_per_user, 9);
        assert_eq!(config.storage.database_path, "/var/lib/digestbot.db");
        Ok(())
    });
}

#[test]
fn local_file_is_picked_up_by_default_hierarchy() {
    Jail::expect_with(|jail| {
        jail.create_file("digestbot.toml", "[timers]\noverdue_minutes = 42\n")?;
        let config = digestbot_config::load_and_validate().map_err(|errors| format!("{errors:?}"))?;
        assert_eq!(config.timers.overdue_minutes, 42);
        Ok(())
    });
}
