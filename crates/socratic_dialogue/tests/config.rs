use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use socratic_dialogue::config::{load_config, parse_config, Config, ResponseLength};
use socratic_dialogue::error::ConfigError;

fn parse(contents: &str) -> Result<Config, ConfigError> {
    parse_config(contents, Path::new("config.yaml"))
}

#[test]
fn full_config_is_parsed() {
    let config = parse(
        "ai_model_name: gpt-4o\n\
         temperature: 0.7\n\
         previous_context_messages: 5\n\
         response_length:\n  min: 20\n  max: 80\n",
    )
    .expect("config should parse");

    assert_eq!(
        config,
        Config {
            ai_model_name: "gpt-4o".to_string(),
            temperature: 0.7,
            previous_context_messages: 5,
            response_length: ResponseLength { min: 20, max: 80 },
        }
    );
}

#[test]
fn missing_fields_take_defaults() {
    let config = parse("temperature: 0.2\nresponse_length:\n  max: 30\n").expect("config should parse");

    assert_eq!(config.ai_model_name, "gpt-4o-mini");
    assert_eq!(config.temperature, 0.2);
    assert_eq!(config.previous_context_messages, 3);
    assert_eq!(config.response_length, ResponseLength { min: 10, max: 30 });
}

#[test]
fn empty_document_is_the_default_config() {
    assert_eq!(parse("").expect("empty config"), Config::default());
    assert_eq!(parse("# nothing here\n").expect("comment-only config"), Config::default());
}

#[test]
fn missing_file_is_the_default_config() {
    let dir = tempfile::tempdir().expect("tempdir should be created");

    let config = load_config(&dir.path().join("config.yaml")).expect("missing file is fine");

    assert_eq!(config, Config::default());
}

#[test]
fn config_file_is_loaded_from_disk() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join("config.yaml");
    fs::write(&path, "ai_model_name: local-llama\n").expect("config fixture");

    let config = load_config(&path).expect("config should load");

    assert_eq!(config.ai_model_name, "local-llama");
}

#[test]
fn wrong_type_is_a_parse_error_naming_the_file() {
    let error = parse("previous_context_messages: many\n").expect_err("wrong type must fail");

    assert!(matches!(error, ConfigError::Parse { .. }));
    assert!(error.to_string().contains("config.yaml"));
}

#[test]
fn unknown_keys_are_ignored() {
    let config = parse(
        "ai_model_name: gpt-4o\n\
         comment: my notes\n\
         response_length:\n  min: 5\n  unit: words\n",
    )
    .expect("unknown keys must not abort loading");

    assert_eq!(config.ai_model_name, "gpt-4o");
    assert_eq!(config.response_length, ResponseLength { min: 5, max: 50 });
}

#[test]
fn temperature_out_of_range_is_rejected() {
    assert!(matches!(
        parse("temperature: 2.5\n"),
        Err(ConfigError::Temperature(value)) if value == 2.5
    ));
    assert!(matches!(
        parse("temperature: -0.1\n"),
        Err(ConfigError::Temperature(_))
    ));
    parse("temperature: 2.0\n").expect("upper bound is inclusive");
}

#[test]
fn inverted_response_length_is_rejected() {
    let error = parse("response_length:\n  min: 60\n  max: 40\n").expect_err("min > max");

    assert!(matches!(
        error,
        ConfigError::ResponseLength { min: 60, max: 40 }
    ));
}

#[test]
fn summary_lists_every_setting() {
    assert_eq!(
        Config::default().summary(),
        "ai_model_name: gpt-4o-mini | temperature: 1.0 | previous_context_messages: 3 | response_length: {min: 10, max: 50} | "
    );
}
