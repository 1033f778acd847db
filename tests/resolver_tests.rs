mod common;

use common::{jwt_for, ScriptedPrompter};
use cubecloud::api::CloudClient;
use cubecloud::config::{add_auth_token, CredentialResolver, CredentialStore};
use cubecloud::token::decode_claims;
use cubecloud::types::AuthRecord;
use cubecloud::CloudError;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_env_token_bypasses_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(dir.path());
    let client = CloudClient::new(None).unwrap();
    let prompter = ScriptedPrompter::default();
    let token = jwt_for("https://x");

    let credentials = CredentialResolver::new(&store, &client, &prompter)
        .with_env_token(Some(token.as_str()))
        .resolve(Some("https://x"))
        .await
        .unwrap();

    assert_eq!(credentials.len(), 1);
    assert_eq!(credentials["https://x"], AuthRecord::new(token.clone()));
    assert!(!store.path().exists());
    assert!(prompter.asked().is_empty());
}

#[tokio::test]
async fn test_env_token_for_other_host_is_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(dir.path());
    let client = CloudClient::new(None).unwrap();
    let prompter = ScriptedPrompter::default();
    let token = jwt_for("https://other");

    let err = CredentialResolver::new(&store, &client, &prompter)
        .with_env_token(Some(token.as_str()))
        .resolve(Some("https://x"))
        .await
        .unwrap_err();

    match err {
        CloudError::CredentialMismatch { expected, found } => {
            assert_eq!(expected, "https://x");
            assert_eq!(found, "https://other");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!store.path().exists());
}

#[tokio::test]
async fn test_malformed_env_token() {
    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(dir.path());
    let client = CloudClient::new(None).unwrap();
    let prompter = ScriptedPrompter::default();

    let err = CredentialResolver::new(&store, &client, &prompter)
        .with_env_token(Some("abc123"))
        .resolve(None)
        .await
        .unwrap_err();

    assert!(matches!(err, CloudError::MalformedCredential(_)));
}

#[test]
fn test_env_credentials_without_expected_host() {
    let token = jwt_for("https://x");
    let credentials = CredentialResolver::env_credentials(&token, None).unwrap();
    assert_eq!(credentials.keys().collect::<Vec<_>>(), vec!["https://x"]);
    assert_eq!(credentials["https://x"].token, token);

    let err = CredentialResolver::env_credentials("abcé.e30.sig", None).unwrap_err();
    assert!(matches!(err, CloudError::MalformedCredential(_)));
}

#[tokio::test]
async fn test_stored_credentials_returned_unfiltered() {
    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(dir.path());
    let client = CloudClient::new(None).unwrap();
    add_auth_token(&store, &client, &jwt_for("https://a")).await.unwrap();
    add_auth_token(&store, &client, &jwt_for("https://b")).await.unwrap();
    let prompter = ScriptedPrompter::default();

    let credentials = CredentialResolver::new(&store, &client, &prompter)
        .resolve(Some("https://a"))
        .await
        .unwrap();

    assert_eq!(
        credentials.keys().collect::<Vec<_>>(),
        vec!["https://a", "https://b"]
    );
    assert!(prompter.asked().is_empty());
}

#[tokio::test]
async fn test_prompted_code_is_exchanged_and_stored() {
    let mock_server = MockServer::start().await;
    let token = jwt_for("https://x");

    Mock::given(method("POST"))
        .and(path("/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "jwt": token })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(dir.path().join(".cubecloud"));
    let client = CloudClient::new(Some(&mock_server.uri())).unwrap();
    let prompter = ScriptedPrompter::new(&["abc123"]);
    let resolver = CredentialResolver::new(&store, &client, &prompter);

    let first = resolver.resolve(None).await.unwrap();
    let second = resolver.resolve(None).await.unwrap();

    assert_eq!(first["https://x"], AuthRecord::new(token.clone()));
    assert_eq!(first, second);
    assert_eq!(prompter.asked().len(), 1);
    assert_eq!(prompter.asked()[0].0, "Cube Cloud Auth Token");

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(raw, json!({ "https://x": { "token": token } }));
}

#[tokio::test]
async fn test_prompt_names_expected_host() {
    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(dir.path());
    let client = CloudClient::new(None).unwrap();
    let token = jwt_for("https://x");
    let prompter = ScriptedPrompter::new(&[token.as_str()]);

    CredentialResolver::new(&store, &client, &prompter)
        .resolve(Some("https://x"))
        .await
        .unwrap();

    assert_eq!(prompter.asked()[0].0, "Cube Cloud Auth Token for https://x");
}

#[tokio::test]
async fn test_failed_exchange_leaves_store_untouched() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": "Invalid code" })))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(dir.path());
    let client = CloudClient::new(Some(&mock_server.uri())).unwrap();
    let prompter = ScriptedPrompter::new(&["abc123"]);

    let err = CredentialResolver::new(&store, &client, &prompter)
        .resolve(None)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Control plane error: Invalid code");
    assert!(!store.path().exists());
}

#[tokio::test]
async fn test_stored_tokens_match_their_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(dir.path());
    let client = CloudClient::new(None).unwrap();

    for url in ["https://a", "https://b", "https://c"] {
        add_auth_token(&store, &client, &jwt_for(url)).await.unwrap();
    }

    for (url, record) in store.load().unwrap() {
        assert_eq!(decode_claims(&record.token).unwrap().url, url);
    }
}
