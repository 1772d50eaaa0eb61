use std::path::Path;
use tempfile::TempDir;
use toolshell::config::{Config, ConfigError, ConfigStore};

#[test]
fn test_config_default_values() {
    let config = Config::default();

    assert_eq!(config.shell.settle_delay_ms, 500);
    assert!(config.shell.readiness_probe);
    assert_eq!(config.console.prompt, "PS> ");
    assert_eq!(config.console.scrollback_lines, 10_000);
    assert_eq!(config.console.history_limit, 500);
    assert!(config.toolchain.compiler_path.is_none());
    assert!(config.toolchain.launcher.is_none());
    assert!(config.toolchain.link);
    assert_eq!(config.toolchain.output_dir, "out");
    assert!(!config.toolchain.track_completion);
}

#[cfg(unix)]
#[test]
fn test_unix_shell_defaults() {
    let config = Config::default();
    assert_eq!(config.shell.program, "/bin/bash");
    assert!(config.shell.args.is_empty());
    assert_eq!(config.shell.startup_commands, vec!["trap ':' INT".to_string()]);
    assert_eq!(config.shell.line_terminator, "\n");
    assert_eq!(config.shell.exit_status_var, "$?");
}

#[test]
fn test_config_path_ends_with_expected() {
    let path = Config::config_path();
    assert!(path.ends_with("toolshell/config.toml"));
}

#[test]
fn test_missing_file_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config.console.prompt, "PS> ");
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let content = r#"
[toolchain]
launcher = "node"
compiler_path = "/opt/tc/compiler.js"
link = false

[console]
prompt = "$ "
"#;
    let config = Config::parse(content, Path::new("inline.toml")).unwrap();
    assert_eq!(config.toolchain.launcher.as_deref(), Some("node"));
    assert_eq!(
        config.toolchain.compiler_path.as_deref(),
        Some(Path::new("/opt/tc/compiler.js"))
    );
    assert!(!config.toolchain.link);
    assert_eq!(config.toolchain.output_dir, "out");
    assert_eq!(config.console.prompt, "$ ");
    assert_eq!(config.console.history_limit, 500);
    assert_eq!(config.shell.settle_delay_ms, 500);
}

#[test]
fn test_invalid_toml_is_parse_error() {
    let err = Config::parse("[shell\nprogram = ", Path::new("broken.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
    assert!(err.to_string().contains("broken.toml"));
}

#[test]
fn test_validation_rejects_bad_values() {
    let cases = [
        "[shell]\nprogram = \"  \"\n",
        "[shell]\nsettle_delay_ms = 0\n",
        "[console]\nprompt = \"\"\n",
        "[console]\nprompt = \"a\\nb> \"\n",
    ];
    for content in cases {
        let err = Config::parse(content, Path::new("c.toml")).unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { .. }),
            "{:?} should fail validation",
            content
        );
    }
}

#[test]
fn test_store_reload_keeps_old_config_on_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[console]\nprompt = \"> \"\n").unwrap();

    let store = ConfigStore::new(Config::load_from(&path).unwrap(), path.clone());
    assert_eq!(store.get().console.prompt, "> ");

    std::fs::write(&path, "[toolchain]\noutput_dir = \"build\"\n").unwrap();
    store.reload().unwrap();
    assert_eq!(store.get().toolchain.output_dir, "build");
    assert_eq!(store.get().console.prompt, "PS> ");

    std::fs::write(&path, "not toml at all [").unwrap();
    assert!(store.reload().is_err());
    assert_eq!(store.get().toolchain.output_dir, "build");
}

#[test]
fn test_store_refresh_without_file_keeps_config() {
    let dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.toolchain.output_dir = "build".to_string();
    let store = ConfigStore::new(config, dir.path().join("absent.toml"));

    assert!(!store.refresh().unwrap());
    assert_eq!(store.get().toolchain.output_dir, "build");
}

#[test]
fn test_store_refresh_picks_up_edits() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[toolchain]\nlink = false\n").unwrap();
    let store = ConfigStore::new(Config::default(), path.clone());

    assert!(store.refresh().unwrap());
    assert!(!store.get().toolchain.link);
}
