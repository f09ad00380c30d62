//! Registered users panel against a mock backend

#![allow(clippy::unwrap_used)]

mod common;

use common::{
    ScriptedConfirmer, TOKEN, authed_client_for, client_for, count_requests, registration,
    registrations_body,
};
use musabaha_client::{ClientError, TransitionOutcome, UsersPanel};
use musabaha_core::{ApprovalStatus, AssetResolver, DocumentKind, RecordId};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LIST: &str = "/api/subscriptions/all";

async fn mount_users_once(server: &MockServer, users: &[serde_json::Value]) {
    Mock::given(method("GET"))
        .and(path(LIST))
        .and(header("Authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(registrations_body(users)))
        .up_to_n_times(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn missing_token_fails_before_any_request() {
    let server = MockServer::start().await;

    let mut panel = UsersPanel::new(client_for(&server));
    let error = panel.refresh().await.unwrap_err();

    assert!(matches!(
        error,
        ClientError::MissingCredentials {
            resource: "registration"
        }
    ));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn refresh_sends_bearer_token() {
    let server = MockServer::start().await;
    mount_users_once(&server, &[registration(3, "pending"), registration(4, "approved")]).await;

    let mut panel = UsersPanel::new(authed_client_for(&server));
    panel.refresh().await.unwrap();

    assert_eq!(panel.records().len(), 2);
    let user = panel.find(&RecordId::from("3")).unwrap();
    assert_eq!(user.name.as_deref(), Some("Musa Ibrahim"));
    assert_eq!(user.number_of_plots, 2);
}

#[tokio::test]
async fn unauthorized_response_carries_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LIST))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Token expired"})),
        )
        .mount(&server)
        .await;

    let mut panel = UsersPanel::new(authed_client_for(&server));
    let error = panel.refresh().await.unwrap_err();

    assert!(matches!(
        error,
        ClientError::Status { status: 401, ref message } if message == "Token expired"
    ));
}

#[tokio::test]
async fn approve_puts_and_refetches() {
    let server = MockServer::start().await;
    mount_users_once(&server, &[registration(3, "pending")]).await;
    Mock::given(method("PUT"))
        .and(path("/api/subscriptions/3/approve"))
        .and(header("Authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;
    mount_users_once(&server, &[registration(3, "approved")]).await;

    let mut panel = UsersPanel::new(authed_client_for(&server));
    panel.refresh().await.unwrap();
    let confirmer = ScriptedConfirmer::accepting();

    let outcome = panel
        .update_status(&RecordId::from("3"), ApprovalStatus::Approved, &confirmer)
        .await
        .unwrap();

    assert_eq!(outcome, TransitionOutcome::Applied { refreshed: true });
    assert_eq!(panel.records()[0].status, ApprovalStatus::Approved);
    assert_eq!(confirmer.prompts()[0].text, "Do you want to approve user 3?");
    assert_eq!(count_requests(&server, "GET").await, 2);
}

#[tokio::test]
async fn approved_user_can_still_be_rejected() {
    let server = MockServer::start().await;
    mount_users_once(&server, &[registration(3, "approved")]).await;
    Mock::given(method("PUT"))
        .and(path("/api/subscriptions/3/reject"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;
    mount_users_once(&server, &[registration(3, "rejected")]).await;

    let mut panel = UsersPanel::new(authed_client_for(&server));
    panel.refresh().await.unwrap();

    let outcome = panel
        .update_status(
            &RecordId::from("3"),
            ApprovalStatus::Rejected,
            &ScriptedConfirmer::accepting(),
        )
        .await
        .unwrap();

    assert_eq!(outcome, TransitionOutcome::Applied { refreshed: true });
    assert_eq!(panel.records()[0].status, ApprovalStatus::Rejected);
}

#[tokio::test]
async fn repeating_current_status_is_refused() {
    let server = MockServer::start().await;
    mount_users_once(&server, &[registration(3, "rejected")]).await;

    let mut panel = UsersPanel::new(authed_client_for(&server));
    panel.refresh().await.unwrap();
    let confirmer = ScriptedConfirmer::accepting();

    let error = panel
        .update_status(&RecordId::from("3"), ApprovalStatus::Rejected, &confirmer)
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        ClientError::InvalidTransition {
            from: ApprovalStatus::Rejected,
            to: ApprovalStatus::Rejected,
            ..
        }
    ));
    assert!(confirmer.prompts().is_empty());
    assert_eq!(count_requests(&server, "PUT").await, 0);
}

#[tokio::test]
async fn declined_rejection_sends_nothing() {
    let server = MockServer::start().await;
    mount_users_once(&server, &[registration(3, "pending")]).await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(0)
        .mount(&server)
        .await;

    let mut panel = UsersPanel::new(authed_client_for(&server));
    panel.refresh().await.unwrap();

    let outcome = panel
        .update_status(
            &RecordId::from("3"),
            ApprovalStatus::Rejected,
            &ScriptedConfirmer::declining(),
        )
        .await
        .unwrap();

    assert_eq!(outcome, TransitionOutcome::Declined);
    assert_eq!(panel.records()[0].status, ApprovalStatus::Pending);
}

#[tokio::test]
async fn documents_resolve_and_report_reachability() {
    let server = MockServer::start().await;
    mount_users_once(&server, &[registration(3, "pending")]).await;
    Mock::given(method("HEAD"))
        .and(path("/uploads/passport.jpg"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/uploads/id%20card.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut panel = UsersPanel::new(authed_client_for(&server));
    panel.refresh().await.unwrap();
    let resolver = AssetResolver::new(server.uri());

    let links = panel.document_links(&RecordId::from("3"), &resolver).unwrap();

    assert_eq!(links.len(), 2);
    assert_eq!(links[0].kind, DocumentKind::PassportPhoto);
    assert_eq!(
        links[0].url.as_deref(),
        Some(format!("{}/uploads/passport.jpg", server.uri()).as_str())
    );
    assert_eq!(links[1].kind, DocumentKind::Identification);
    assert_eq!(
        links[1].url.as_deref(),
        Some(format!("{}/uploads/id%20card.png", server.uri()).as_str())
    );

    let client = panel.client();
    assert!(client.asset_exists(links[0].url.as_deref().unwrap()).await);
    assert!(!client.asset_exists(links[1].url.as_deref().unwrap()).await);
    assert!(!client.asset_exists("http://127.0.0.1:1/uploads/x.png").await);
}
