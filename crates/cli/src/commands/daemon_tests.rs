// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn status_reports_not_running_without_a_socket() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("foreman.toml");
    std::fs::write(
        &config_path,
        r#"
            repository = "acme/widgets"
            appID = "1"
            privateKeyPath = "/dev/null"
            installationID = "2"
        "#,
    )
    .unwrap();
    std::env::set_var("FOREMAN_STATE_DIR", dir.path().join("state"));

    let result = status(&config_path).await;
    std::env::remove_var("FOREMAN_STATE_DIR");
    assert!(result.is_ok());
}
