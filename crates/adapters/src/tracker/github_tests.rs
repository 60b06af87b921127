// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::PathBuf;

fn credentials() -> GitHubAppCredentials {
    GitHubAppCredentials {
        app_id: "123".to_string(),
        private_key_path: PathBuf::from("/etc/foreman/key.pem"),
        installation_id: "456".to_string(),
    }
}

#[test]
fn new_splits_owner_and_repo() {
    let client = GitHubTrackerClient::new("acme/widgets", credentials()).unwrap();
    assert_eq!(client.owner, "acme");
    assert_eq!(client.repo, "widgets");
}

#[test]
fn new_rejects_repository_without_slash() {
    let err = GitHubTrackerClient::new("acme-widgets", credentials()).unwrap_err();
    assert!(matches!(err, TrackerError::Auth(_)));
}
