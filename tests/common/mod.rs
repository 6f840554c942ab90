//! Common test utilities and helpers
//!
//! Shared wiremock scaffolding for the integration tests: settings wired to
//! a mock server and canned LinguaLeo response payloads.

/// Test helper functions
pub mod helpers {
    use std::path::PathBuf;

    use serde_json::{Value, json};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use lingualeo_importer::Settings;

    /// Create settings pointed at a mock server.
    ///
    /// With a cookie file the session persists cookies there; without one it
    /// keeps them in memory for the lifetime of the session.
    pub fn mock_settings(server: &MockServer, cookie_file: Option<PathBuf>) -> Settings {
        let mut settings = Settings::default();
        settings.api.base_url = server.uri();
        settings.api.auth_url = format!("{}/ru/uauth/dispatch", server.uri());
        settings.account.email = "user@example.com".to_string();
        settings.account.password = Some("secret".to_string());
        match cookie_file {
            Some(path) => settings.storage.cookie_file = Some(path),
            None => settings.account.stay_logged_in = false,
        }
        settings
    }

    /// One word as the listing endpoints render it.
    pub fn word_json(id: u64, value: &str, progress: i64) -> Value {
        json!({
            "id": id,
            "wordValue": value,
            "progress": progress,
            "translations": [{"id": id * 10, "value": format!("{value}-ru")}]
        })
    }

    /// A `GetWords` response built from (bucket name, words) pairs.
    pub fn words_page(buckets: Vec<(&str, Vec<Value>)>) -> Value {
        let data: Vec<Value> = buckets
            .into_iter()
            .map(|(name, words)| {
                json!({"groupName": name, "groupCount": words.len(), "words": words})
            })
            .collect();
        json!({"data": data})
    }

    /// Mount `api/isauthorized` answering yes, so no login happens.
    pub async fn mount_authorized(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/isauthorized"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"is_authorized": true})),
            )
            .mount(server)
            .await;
    }
}
