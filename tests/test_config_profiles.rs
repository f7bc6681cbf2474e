use logmatch::cli::OutputFormat;
use logmatch::config::{ConfigError, default_config, load_config, load_config_from_path};
use logmatch::filter::compile;
use logmatch::parser::parse_combined_line;
use std::fs;

use tempfile::tempdir;

const LINE: &str = r#"10.0.0.1 - - [10/Oct/2023:13:55:36 +0000] "GET /a HTTP/1.1" 200 10 "-" "curl""#;

#[test]
fn test_missing_path_uses_defaults() {
    let config = load_config(None).expect("default config");
    assert_eq!(config.profile_name, default_config().profile_name);
    assert_eq!(config.output.format, OutputFormat::Text);
}

#[test]
fn test_renamed_fields_drive_compilation() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("renamed.toml");
    fs::write(
        &path,
        r#"
profile_name = "short-names"

[fields]
names = ["ip", "ident", "ts", "verb", "path", "proto", "status", "bytes", "ref", "agent"]

[output]
separator = " | "
rfc3339 = true
format = "json"
"#,
    )
    .expect("write config");

    let config = load_config_from_path(&path).expect("config should load");
    assert_eq!(config.profile_name, "short-names");
    assert_eq!(config.output.separator, " | ");
    assert!(config.output.rfc3339);
    assert_eq!(config.output.format, OutputFormat::Json);

    let schema = config.schema().expect("valid schema");
    let tree = compile("verb=/GET/ && status~/^2/", &schema).expect("renamed fields compile");
    let record = parse_combined_line(LINE).expect("valid line");
    assert!(tree.matches(&record));

    let errors = compile("method=/GET/", &schema).unwrap_err();
    assert!(errors.to_string().contains("method"));
}

#[test]
fn test_unreadable_config_names_the_path() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("absent.toml");
    let err = load_config_from_path(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn test_malformed_toml_is_a_parse_error() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[output\nseparator = ").expect("write config");
    let err = load_config_from_path(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn test_invalid_field_name_is_rejected() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("bad-name.toml");
    fs::write(
        &path,
        "[fields]\nnames = [\"ip\", \"ident\", \"ts\", \"verb\", \"path\", \"proto\", \"status\", \"bytes\", \"ref\", \"user-agent\"]\n",
    )
    .expect("write config");

    let config = load_config_from_path(&path).expect("toml is valid");
    assert!(matches!(config.schema(), Err(ConfigError::Schema(_))));
}
