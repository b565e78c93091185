//! End-to-end flows against a mock backend through the real HTTP gateway.

use std::sync::Arc;
use std::time::Duration;

use agrovision_api_models::BatchId;
use agrovision_core::{
    AccountFlow, BatchAggregate, BatchForm, BatchListModel, ClientError, FlowMode, FlowOutcome,
    LoadOutcome, RegistrationForm, SessionStore,
};
use agrovision_gateway::{HttpGateway, RemoteGateway};
use agrovision_test_support::fixtures::{
    sample_batch, sample_batch_json, sample_identity, sample_identity_json,
};
use httpmock::MockServer;
use httpmock::prelude::*;
use serde_json::json;
use url::Url;

fn gateway_for(server: &MockServer) -> Arc<HttpGateway> {
    let base = Url::parse(&server.base_url()).expect("mock server URL");
    Arc::new(HttpGateway::new(base, Duration::from_secs(2)).expect("gateway"))
}

#[tokio::test]
async fn login_resolves_session_with_exact_identity() {
    let server = MockServer::start_async().await;
    let lookup = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/user/getByEmail")
                .query_param("email", "x@y.com");
            then.status(200).json_body(sample_identity_json());
        })
        .await;
    let login = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/auth/login")
                .json_body(json!({"email": "x@y.com", "password": "pw"}));
            then.status(200).json_body(sample_identity_json());
        })
        .await;

    let session = SessionStore::new();
    let flow = AccountFlow::new(gateway_for(&server) as Arc<dyn RemoteGateway>, session.clone());
    let outcome = flow.submit_email("x@y.com", "pw").await.expect("login");

    assert_eq!(outcome, FlowOutcome::Authenticated(sample_identity()));
    assert_eq!(session.identity(), Some(sample_identity()));
    lookup.assert_async().await;
    login.assert_async().await;
}

#[tokio::test]
async fn unknown_email_registers_after_form_submission() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/user/getByEmail");
            then.status(200).body("null");
        })
        .await;
    let registration = server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/registration").json_body(json!({
                "email": "x@y.com",
                "password": "pw",
                "firstName": "A",
                "lastName": "B",
                "phoneNumber": "555"
            }));
            then.status(201).json_body(sample_identity_json());
        })
        .await;

    let session = SessionStore::new();
    let flow = AccountFlow::new(gateway_for(&server) as Arc<dyn RemoteGateway>, session.clone());
    assert_eq!(
        flow.submit_email("x@y.com", "").await,
        Ok(FlowOutcome::RegistrationRequired)
    );
    assert_eq!(flow.state().mode, FlowMode::Registration);
    assert_eq!(registration.hits_async().await, 0);

    let identity = flow
        .submit_registration(&RegistrationForm {
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            phone_number: "555".to_string(),
            password: "pw".to_string(),
        })
        .await
        .expect("registration");
    assert_eq!(identity, sample_identity());
    assert!(session.is_authenticated());
    registration.assert_async().await;
}

#[tokio::test]
async fn server_rejection_message_is_surfaced() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/user/getByEmail");
            then.status(200).json_body(sample_identity_json());
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/login");
            then.status(400).json_body(json!({"message": "Incorrect password"}));
        })
        .await;

    let flow = AccountFlow::new(
        gateway_for(&server) as Arc<dyn RemoteGateway>,
        SessionStore::new(),
    );
    let err = flow.submit_email("x@y.com", "bad").await.expect_err("rejected");
    assert_eq!(err.user_message(), "Server Error: Incorrect password");
    assert_eq!(flow.state().mode, FlowMode::Login);
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);
    let base = Url::parse(&format!("http://127.0.0.1:{port}")).expect("url");
    let gateway = Arc::new(HttpGateway::new(base, Duration::from_secs(2)).expect("gateway"));

    let flow = AccountFlow::new(gateway as Arc<dyn RemoteGateway>, SessionStore::new());
    let err = flow.submit_email("x@y.com", "pw").await.expect_err("offline");
    assert!(matches!(err, ClientError::Network(_)));
    assert_eq!(
        err.user_message(),
        "Network Error: Please check your internet connection."
    );
}

#[tokio::test]
async fn batch_detail_list_and_create() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/batches/4");
            then.status(200).json_body(sample_batch_json(4));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/batches/5");
            then.status(404).json_body(json!({"message": "Batch not found"}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/batches");
            then.status(200).json_body(json!([
                {"batch_id": 4, "name": "Batch 4", "type": "microgreens", "status": "Growing"}
            ]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/batches");
            then.status(201).json_body(sample_batch_json(4));
        })
        .await;

    let gateway = gateway_for(&server);

    let aggregate = BatchAggregate::new(Arc::clone(&gateway) as Arc<dyn RemoteGateway>);
    assert_eq!(aggregate.load(BatchId(4)).await, LoadOutcome::Applied);
    assert_eq!(aggregate.view().record(), Some(&sample_batch(4)));
    aggregate.add_growth_note("ok");
    aggregate.add_growth_note("ok2");

    let outcome = aggregate.load(BatchId(5)).await;
    assert!(matches!(outcome, LoadOutcome::Failed(ClientError::Server { status: 404, .. })));
    let view = aggregate.view();
    assert_eq!(view.record(), None);
    assert!(view.growth_notes().is_empty());
    assert!(view.placeholder().is_some());

    let list = BatchListModel::new(Arc::clone(&gateway) as Arc<dyn RemoteGateway>);
    assert_eq!(list.load().await, LoadOutcome::Applied);
    assert_eq!(list.state().batches.len(), 1);

    let mut form = BatchForm::default();
    form.name = "Batch 4".to_string();
    form.kind = "microgreens".to_string();
    form.sowing_date = "2024-03-01".to_string();
    form.substrate = "coco coir".to_string();
    let created = form.submit(&*gateway).await.expect("created");
    assert_eq!(created.batch_id, BatchId(4));
}
