//! Shared helpers for sync tests.

use chrono::Utc;
use saltci_web_lib::config::GitHubSettings;
use saltci_web_lib::models::Account;
use saltci_web_lib::services::GitHubClient;
use secrecy::SecretString;
use serde_json::json;
use uuid::Uuid;

use super::mock_github::{MockGitHub, MockGitHubState, MockOrg, VALID_TOKEN, repo_json};

/// GitHub settings pointing at the mock.
pub fn settings(mock: &MockGitHub) -> GitHubSettings {
    GitHubSettings {
        api_url: mock.api_url.clone(),
        user_agent: "saltci-tests".to_string(),
    }
}

/// Client authenticated with the token the mock accepts.
pub fn client(mock: &MockGitHub) -> GitHubClient {
    GitHubClient::new(&settings(mock), SecretString::from(VALID_TOKEN.to_string()))
        .expect("failed to build client")
}

/// Account signed in as the mock user.
pub fn test_account() -> Account {
    Account {
        id: Uuid::new_v4(),
        github_id: 7,
        github_login: "alice".to_string(),
        github_token: SecretString::from(VALID_TOKEN.to_string()),
        gravatar_id: None,
        hooks_token: None,
        created_at: Utc::now(),
    }
}

/// Two organizations and a few personal repositories.
///
/// - acme (100): repos 1 (admin), 2 (admin), 3 (no admin)
/// - globex (200, no display name): repo 4 (admin)
/// - personal: repos 5 (admin), 6 (admin, fork), 7 (no admin)
pub fn default_state() -> MockGitHubState {
    let mut fork = repo_json(6, "salt-fork", "alice", "User", true);
    fork["fork"] = json!(true);

    MockGitHubState {
        user: json!({"id": 7, "login": "alice", "gravatar_id": ""}),
        orgs: vec![
            MockOrg {
                id: 100,
                login: "acme".to_string(),
                name: Some("Acme Corp".to_string()),
                repos: vec![
                    repo_json(1, "api", "acme", "Organization", true),
                    repo_json(2, "web", "acme", "Organization", true),
                    repo_json(3, "secret", "acme", "Organization", false),
                ],
            },
            MockOrg {
                id: 200,
                login: "globex".to_string(),
                name: None,
                repos: vec![repo_json(4, "infra", "globex", "Organization", true)],
            },
        ],
        user_repos: vec![
            repo_json(5, "dotfiles", "alice", "User", true),
            fork,
            repo_json(7, "contrib", "bob", "User", false),
        ],
        page_size: 2,
        requests: Vec::new(),
    }
}
