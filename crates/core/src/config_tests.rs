// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn minimal_toml() -> &'static str {
    r#"
        repository = "acme/widgets"
        appID = "123"
        privateKeyPath = "/etc/foreman/key.pem"
        installationID = "456"
    "#
}

#[test]
fn parses_minimal_config_with_defaults() {
    let config = Config::parse(minimal_toml(), Path::new("foreman.toml")).unwrap();
    assert_eq!(config.repository, "acme/widgets");
    assert_eq!(config.app_id, "123");
    assert_eq!(config.installation_id, "456");
    assert_eq!(config.log_level, "info");
    assert_eq!(config.shutdown_timeout, 300);
    assert_eq!(config.work_item_poller.poll_interval, 30);
    assert_eq!(config.spec_poller.poll_interval, 60);
    assert_eq!(config.spec_poller.specs_dir, "docs/specs/");
    assert_eq!(config.spec_poller.default_branch, "main");
    assert_eq!(config.revision_poller.poll_interval, 30);
    assert_eq!(config.agents.max_agent_duration, 1800);
    assert!(!config.logging.agent_sessions);
    assert_eq!(config.logging.logs_dir, "logs");
}

#[test]
fn missing_repository_is_fatal() {
    let toml = r#"
        appID = "123"
        privateKeyPath = "/etc/foreman/key.pem"
        installationID = "456"
    "#;
    let err = Config::parse(toml, Path::new("foreman.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::MissingField("repository")));
}

#[test]
fn missing_credentials_are_fatal() {
    let toml = r#"repository = "acme/widgets""#;
    let err = Config::parse(toml, Path::new("foreman.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::MissingField(_)));
}

#[test]
fn overrides_apply_over_defaults() {
    let toml = r#"
        repository = "acme/widgets"
        appID = "123"
        privateKeyPath = "/etc/foreman/key.pem"
        installationID = "456"
        logLevel = "debug"
        shutdownTimeout = 60

        [specPoller]
        pollInterval = 120
        specsDir = "specs/"
    "#;
    let config = Config::parse(toml, Path::new("foreman.toml")).unwrap();
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.shutdown_timeout, 60);
    assert_eq!(config.spec_poller.poll_interval, 120);
    assert_eq!(config.spec_poller.specs_dir, "specs/");
}

#[test]
fn derived_paths_are_rooted_at_repo_root() {
    let config = Config::parse(minimal_toml(), Path::new("foreman.toml")).unwrap();
    assert_eq!(
        config.planner_cache_path(),
        PathBuf::from("./.foreman-cache.json")
    );
    assert_eq!(config.worktrees_root(), PathBuf::from("./.worktrees"));
}

#[test]
fn daemon_paths_are_rooted_under_dot_foreman() {
    let config = Config::parse(minimal_toml(), Path::new("foreman.toml")).unwrap();
    assert_eq!(config.daemon_socket_path(), PathBuf::from("./.foreman/daemon.sock"));
    assert_eq!(config.daemon_lock_path(), PathBuf::from("./.foreman/daemon.pid"));
    assert_eq!(config.daemon_log_path(), PathBuf::from("./.foreman/daemon.log"));
}

#[test]
fn invalid_toml_is_a_parse_error() {
    let err = Config::parse("not valid toml = [", Path::new("foreman.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}
