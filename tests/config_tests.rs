mod support;

use oceanus::error::{ConfigError, Error};
use oceanus::infrastructure::config::settings::Config;
use oceanus::infrastructure::config::source::SourceConfig;
use oceanus::infrastructure::factory::source::build_source;

use support::config::{fixture_config, write_temp_config};

fn field_of(err: Error) -> &'static str {
    match err {
        Error::Config(ConfigError::InvalidValue { field, .. })
        | Error::Config(ConfigError::MissingField { field }) => field,
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn empty_file_loads_defaults() {
    let path = write_temp_config("");
    let config = Config::load(&path).expect("defaults");
    assert_eq!(config, Config::default());
    assert_eq!(config.source.kind(), "neo4j");
    assert_eq!(config.matching.tolerance_hours, 24);
    assert_eq!(config.anomaly.window, 7);
}

#[test]
fn shipped_template_is_valid() {
    let template = include_str!("../config.toml.example");
    let config = Config::parse_toml(template).expect("template parses");
    assert!(config.analysis_settings().is_ok());
}

#[test]
fn fixture_source_builds() {
    let config = Config::parse_toml(&fixture_config()).expect("fixture config");
    assert!(matches!(config.source, SourceConfig::Fixture(_)));
    let source = build_source(&config).expect("fixture source");
    assert_eq!(source.name(), "fixture");
}

#[test]
fn rejects_contamination_above_half() {
    let err = Config::parse_toml("[anomaly]\ncontamination = 0.6\n").unwrap_err();
    assert_eq!(field_of(err), "anomaly.contamination");
}

#[test]
fn rejects_zero_tolerance() {
    let err = Config::parse_toml("[matching]\ntolerance_hours = 0\n").unwrap_err();
    assert_eq!(field_of(err), "matching.tolerance_hours");
}

#[test]
fn rejects_inverted_default_dates() {
    let toml = r#"
[dates]
default_start = "2035-03-01"
default_end = "2035-02-28"
"#;
    let err = Config::parse_toml(toml).unwrap_err();
    assert_eq!(field_of(err), "dates.default_start");
}

#[test]
fn rejects_fixture_without_path() {
    let err = Config::parse_toml("[source]\ntype = \"fixture\"\npath = \"\"\n").unwrap_err();
    assert_eq!(field_of(err), "source.path");
}

#[test]
fn rejects_unparseable_neo4j_url() {
    let err = Config::parse_toml("[source]\ntype = \"neo4j\"\nurl = \"not a url\"\n").unwrap_err();
    assert_eq!(field_of(err), "source.url");
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = Config::parse_toml("[anomaly\nwindow = 3").unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::Parse(_))));
}

#[test]
fn missing_file_is_a_read_error() {
    let err = Config::load("/nonexistent/oceanus/config.toml").unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::ReadFile(_))));
}
