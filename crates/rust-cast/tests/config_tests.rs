//! Integration tests for configuration layering.

use std::path::PathBuf;

use rust_cast::config::env::DEFAULT_PREFIX;
use rust_cast::config::file::parse_config;
use rust_cast::{
    CaptureMode, Caster, EnvConfig, HeaderOverrides, RecordConfig, TypingMode, load_config,
};

#[test]
fn file_then_env_layering() {
    let mut config = parse_config(
        r#"
        typing = "instant"
        capture = "ansi"
        seed = 1

        [header]
        title = "from file"
        width = 132
        "#,
    )
    .unwrap();

    let env = EnvConfig::from_vars(
        DEFAULT_PREFIX,
        [("CAST_TYPING", "human"), ("CAST_TITLE", "from env")],
    );
    env.apply(&mut config).unwrap();

    assert_eq!(config.typing, TypingMode::Human);
    assert_eq!(config.capture, CaptureMode::Ansi);
    assert_eq!(config.seed, Some(1));
    assert_eq!(config.header.title.as_deref(), Some("from env"));
    assert_eq!(config.header.width, Some(132));
}

#[test]
fn unprefixed_variables_do_not_configure() {
    let mut config = RecordConfig::default();
    EnvConfig::from_vars(DEFAULT_PREFIX, [("TYPING", "instant"), ("SHELL", "/bin/zsh")])
        .apply(&mut config)
        .unwrap();
    assert_eq!(config, RecordConfig::default());
}

#[test]
fn load_config_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rust-cast.toml");
    std::fs::write(&path, "shell = \"/bin/bash\"\npace = true\n").unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.shell, PathBuf::from("/bin/bash"));
    assert!(config.pace);
}

#[test]
fn header_overrides_reach_header() {
    let config = RecordConfig::new().header(
        HeaderOverrides::new()
            .size(132, 43)
            .idle_time_limit(2.0)
            .title("demo")
            .shell("/bin/fish")
            .term("xterm"),
    );
    let header = Caster::new(config)
        .with_env(EnvConfig::from_vars(DEFAULT_PREFIX, [("SHELL", "/bin/zsh")]))
        .build_header();

    assert_eq!((header.width, header.height), (132, 43));
    assert!((header.idle_time_limit - 2.0).abs() < f64::EPSILON);
    assert_eq!(header.title.as_deref(), Some("demo"));
    assert_eq!(header.env.shell, "/bin/fish");
    assert_eq!(header.env.term, "xterm");
}

#[test]
fn header_construction_is_idempotent() {
    let caster = Caster::new(RecordConfig::new().header(HeaderOverrides::new().title("same")))
        .with_env(EnvConfig::from_vars(DEFAULT_PREFIX, [("COLUMNS", "90"), ("LINES", "30")]));

    let mut first = caster.build_header();
    let mut second = caster.build_header();
    first.timestamp = 0;
    second.timestamp = 0;
    assert_eq!(first, second);
}
