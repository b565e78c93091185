//! `reqwest` implementation of [`RemoteGateway`] and [`AssistantGateway`].

use std::time::Duration;

use agrovision_api_models::{
    AssistantAnswer, AssistantQuestion, BatchCreateRequest, BatchId, BatchRecord, BatchSummary,
    Identity, LoginRequest, RegistrationRequest,
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;
use uuid::Uuid;

use crate::contract::{AssistantGateway, RemoteGateway};
use crate::error::{GatewayError, GatewayResult, classify_response, classify_transport};

/// Header carrying the per-gateway correlation identifier.
pub const HEADER_REQUEST_ID: &str = "x-request-id";

/// HTTP client for the AgroVision backend.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
    request_id: String,
}

impl HttpGateway {
    /// Build a gateway with its own client, timeout and request identifier.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unknown`] when the HTTP client cannot be built.
    pub fn new(base_url: Url, timeout: Duration) -> GatewayResult<Self> {
        let request_id = Uuid::new_v4().to_string();
        let mut default_headers = HeaderMap::new();
        let header = HeaderValue::from_str(&request_id)
            .map_err(|_| GatewayError::unknown("request identifier contains invalid characters"))?;
        default_headers.insert(HEADER_REQUEST_ID, header);

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|err| GatewayError::unknown(format!("failed to build HTTP client: {err}")))?;
        Ok(Self::with_client(client, base_url, request_id))
    }

    /// Wrap an existing client. Relative endpoints resolve under `base_url`.
    #[must_use]
    pub fn with_client(client: Client, base_url: Url, request_id: impl Into<String>) -> Self {
        Self {
            client,
            base_url: directory_url(base_url),
            request_id: request_id.into(),
        }
    }

    /// Base URL every endpoint is resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Correlation identifier sent with every request.
    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    fn endpoint(&self, path: &str) -> GatewayResult<Url> {
        self.base_url
            .join(path)
            .map_err(|err| GatewayError::unknown(format!("invalid endpoint '{path}': {err}")))
    }

    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> GatewayResult<Response> {
        let response = request.send().await.map_err(|err| {
            let error = classify_transport(&err);
            tracing::warn!(
                operation,
                request_id = %self.request_id,
                error = %error,
                "gateway request failed"
            );
            error
        })?;
        if response.status().is_success() {
            return Ok(response);
        }
        let error = classify_response(response).await;
        tracing::warn!(
            operation,
            request_id = %self.request_id,
            status = error.status(),
            "gateway request rejected"
        );
        Err(error)
    }
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    async fn lookup_user_by_email(&self, email: &str) -> GatewayResult<Option<Identity>> {
        let mut url = self.endpoint("user/getByEmail")?;
        url.query_pairs_mut().append_pair("email", email);
        tracing::debug!(operation = "lookup_user_by_email", "sending gateway request");

        let response = self
            .send("lookup_user_by_email", self.client.get(url))
            .await?;
        let (_, body) = read_body(response).await?;
        if is_absent(&body) {
            return Ok(None);
        }
        decode(&body).map(Some)
    }

    async fn login(&self, request: &LoginRequest) -> GatewayResult<Identity> {
        let url = self.endpoint("auth/login")?;
        tracing::debug!(operation = "login", "sending gateway request");
        let response = self.send("login", self.client.post(url).json(request)).await?;
        read_identity(response).await
    }

    async fn register(&self, request: &RegistrationRequest) -> GatewayResult<Identity> {
        let url = self.endpoint("auth/registration")?;
        tracing::debug!(operation = "register", "sending gateway request");
        let response = self
            .send("register", self.client.post(url).json(request))
            .await?;
        read_identity(response).await
    }

    async fn get_batch(&self, batch_id: BatchId) -> GatewayResult<BatchRecord> {
        let url = self.endpoint(&format!("batches/{batch_id}"))?;
        tracing::debug!(operation = "get_batch", %batch_id, "sending gateway request");
        let response = self.send("get_batch", self.client.get(url)).await?;
        read_json(response).await
    }

    async fn list_batches(&self) -> GatewayResult<Vec<BatchSummary>> {
        let url = self.endpoint("batches")?;
        tracing::debug!(operation = "list_batches", "sending gateway request");
        let response = self.send("list_batches", self.client.get(url)).await?;
        read_json(response).await
    }

    async fn create_batch(&self, request: &BatchCreateRequest) -> GatewayResult<BatchRecord> {
        let url = self.endpoint("batches")?;
        tracing::debug!(
            operation = "create_batch",
            name = %request.name,
            "sending gateway request"
        );
        let response = self
            .send("create_batch", self.client.post(url).json(request))
            .await?;
        read_json(response).await
    }
}

#[async_trait]
impl AssistantGateway for HttpGateway {
    async fn ask(&self, question: &str) -> GatewayResult<AssistantAnswer> {
        let url = self.endpoint("ai/ask")?;
        tracing::debug!(operation = "ask", "sending gateway request");
        let payload = AssistantQuestion {
            question: question.to_string(),
        };
        let response = self.send("ask", self.client.post(url).json(&payload)).await?;
        read_json(response).await
    }
}

fn directory_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

async fn read_body(response: Response) -> GatewayResult<(StatusCode, Vec<u8>)> {
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|err| classify_transport(&err))?;
    Ok((status, bytes.to_vec()))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> GatewayResult<T> {
    let (_, body) = read_body(response).await?;
    decode(&body)
}

async fn read_identity(response: Response) -> GatewayResult<Identity> {
    let (status, body) = read_body(response).await?;
    let trimmed = body.trim_ascii();
    if trimmed.is_empty() || trimmed == b"null" {
        return Err(GatewayError::Server {
            status: status.as_u16(),
            message: None,
        });
    }
    decode(&body)
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> GatewayResult<T> {
    serde_json::from_slice(body).map_err(|err| GatewayError::decode(&err))
}

fn is_absent(body: &[u8]) -> bool {
    matches!(body.trim_ascii(), b"" | b"null" | b"false" | b"\"\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrovision_api_models::{BatchCreateRequest, RegistrationRequest};
    use chrono::NaiveDate;
    use httpmock::MockServer;
    use httpmock::prelude::*;
    use serde_json::json;

    fn gateway_for(server: &MockServer) -> HttpGateway {
        let base = Url::parse(&server.base_url()).expect("mock server URL");
        HttpGateway::new(base, Duration::from_secs(2)).expect("gateway")
    }

    fn identity_json() -> serde_json::Value {
        json!({
            "user_id": 1,
            "firstName": "A",
            "lastName": "B",
            "email": "x@y.com",
            "phoneNumber": "555",
            "location": null
        })
    }

    #[tokio::test]
    async fn lookup_decodes_existing_user() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/user/getByEmail")
                    .query_param("email", "x@y.com")
                    .header_exists(HEADER_REQUEST_ID);
                then.status(200).json_body(identity_json());
            })
            .await;

        let found = gateway_for(&server)
            .lookup_user_by_email("x@y.com")
            .await
            .expect("lookup");
        mock.assert_async().await;
        let identity = found.expect("identity present");
        assert_eq!(identity.user_id, 1);
        assert_eq!(identity.location, None);
    }

    #[tokio::test]
    async fn lookup_treats_empty_payloads_as_absent() {
        for body in ["", "null", "false", "\"\""] {
            let server = MockServer::start_async().await;
            server
                .mock_async(|when, then| {
                    when.method(GET).path("/user/getByEmail");
                    then.status(200).body(body);
                })
                .await;
            let found = gateway_for(&server)
                .lookup_user_by_email("new@y.com")
                .await
                .expect("lookup");
            assert_eq!(found, None, "body {body:?} should mean absent");
        }
    }

    #[tokio::test]
    async fn login_posts_credentials_and_returns_identity() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/auth/login")
                    .json_body(json!({"email": "x@y.com", "password": "hunter2"}));
                then.status(200).json_body(identity_json());
            })
            .await;

        let identity = gateway_for(&server)
            .login(&LoginRequest {
                email: "x@y.com".to_string(),
                password: "hunter2".to_string(),
            })
            .await
            .expect("login");
        mock.assert_async().await;
        assert_eq!(identity.first_name, "A");
        assert_eq!(identity.phone_number, "555");
    }

    #[tokio::test]
    async fn login_with_null_body_is_a_server_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/auth/login");
                then.status(200).body("null");
            })
            .await;

        let err = gateway_for(&server)
            .login(&LoginRequest {
                email: "x@y.com".to_string(),
                password: "pw".to_string(),
            })
            .await
            .expect_err("null body");
        assert_eq!(
            err,
            GatewayError::Server {
                status: 200,
                message: None
            }
        );
    }

    #[tokio::test]
    async fn rejected_login_surfaces_backend_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/auth/login");
                then.status(401).json_body(json!({"message": "Wrong password"}));
            })
            .await;

        let err = gateway_for(&server)
            .login(&LoginRequest {
                email: "x@y.com".to_string(),
                password: "pw".to_string(),
            })
            .await
            .expect_err("rejected");
        assert_eq!(
            err,
            GatewayError::Server {
                status: 401,
                message: Some("Wrong password".to_string())
            }
        );
    }

    #[tokio::test]
    async fn register_sends_camel_case_fields() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/auth/registration").json_body(json!({
                    "email": "x@y.com",
                    "password": "pw",
                    "firstName": "A",
                    "lastName": "B",
                    "phoneNumber": "555"
                }));
                then.status(201).json_body(identity_json());
            })
            .await;

        let identity = gateway_for(&server)
            .register(&RegistrationRequest {
                email: "x@y.com".to_string(),
                password: "pw".to_string(),
                first_name: "A".to_string(),
                last_name: "B".to_string(),
                phone_number: "555".to_string(),
            })
            .await
            .expect("register");
        mock.assert_async().await;
        assert_eq!(identity.email, "x@y.com");
    }

    #[tokio::test]
    async fn batch_endpoints_round_trip() {
        let server = MockServer::start_async().await;
        let get = server
            .mock_async(|when, then| {
                when.method(GET).path("/batches/7");
                then.status(200).json_body(json!({
                    "batch_id": 7,
                    "name": "Basil",
                    "type": "herb",
                    "substrate": "coco",
                    "sowing_date": "2024-03-01",
                    "expected_harvest_date": null,
                    "status": "Growing"
                }));
            })
            .await;
        let list = server
            .mock_async(|when, then| {
                when.method(GET).path("/batches");
                then.status(200).json_body(json!([
                    {"id": 7, "name": "Basil", "type": "herb", "status": "Growing"},
                    {"id": 9, "name": "Kale", "type": "leafy", "status": "Harvested"}
                ]));
            })
            .await;
        let create = server
            .mock_async(|when, then| {
                when.method(POST).path("/batches").json_body(json!({
                    "name": "Mint",
                    "type": "herb",
                    "sowing_date": "2024-04-02",
                    "substrate": "soil"
                }));
                then.status(201).json_body(json!({
                    "batch_id": 10,
                    "name": "Mint",
                    "type": "herb",
                    "substrate": "soil",
                    "sowing_date": "2024-04-02T00:00:00.000Z",
                    "expected_harvest_date": "2024-06-01",
                    "status": "Planned"
                }));
            })
            .await;

        let gateway = gateway_for(&server);
        let record = gateway.get_batch(BatchId(7)).await.expect("get");
        assert_eq!(record.name, "Basil");
        assert_eq!(record.expected_harvest_date, None);

        let summaries = gateway.list_batches().await.expect("list");
        let ids: Vec<_> = summaries.iter().map(|summary| summary.batch_id).collect();
        assert_eq!(ids, vec![BatchId(7), BatchId(9)]);

        let created = gateway
            .create_batch(&BatchCreateRequest {
                name: "Mint".to_string(),
                kind: "herb".to_string(),
                sowing_date: NaiveDate::from_ymd_opt(2024, 4, 2).expect("date"),
                substrate: "soil".to_string(),
            })
            .await
            .expect("create");
        assert_eq!(created.batch_id, BatchId(10));
        assert_eq!(
            created.expected_harvest_date,
            NaiveDate::from_ymd_opt(2024, 6, 1)
        );

        get.assert_async().await;
        list.assert_async().await;
        create.assert_async().await;
    }

    #[tokio::test]
    async fn malformed_body_is_unknown() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/batches/3");
                then.status(200).body("{not json");
            })
            .await;

        let err = gateway_for(&server)
            .get_batch(BatchId(3))
            .await
            .expect_err("decode failure");
        assert!(matches!(err, GatewayError::Unknown { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn ask_posts_question() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/ai/ask")
                    .json_body(json!({"question": "When to water basil?"}));
                then.status(200).json_body(json!({"response": "Every morning."}));
            })
            .await;

        let answer = gateway_for(&server)
            .ask("When to water basil?")
            .await
            .expect("ask");
        mock.assert_async().await;
        assert_eq!(answer.response.as_deref(), Some("Every morning."));
    }

    #[tokio::test]
    async fn refused_connection_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);

        let base = Url::parse(&format!("http://127.0.0.1:{port}")).expect("url");
        let gateway = HttpGateway::new(base, Duration::from_secs(2)).expect("gateway");
        let err = gateway.list_batches().await.expect_err("refused");
        assert!(err.is_network(), "{err:?}");
    }

    #[tokio::test]
    async fn slow_backend_times_out_as_network_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/batches");
                then.status(200)
                    .delay(Duration::from_secs(3))
                    .json_body(json!([]));
            })
            .await;

        let base = Url::parse(&server.base_url()).expect("url");
        let gateway = HttpGateway::new(base, Duration::from_millis(200)).expect("gateway");
        let err = gateway.list_batches().await.expect_err("timeout");
        assert!(err.is_network(), "{err:?}");
    }

    #[test]
    fn base_url_path_is_preserved() {
        let gateway = HttpGateway::with_client(
            Client::new(),
            Url::parse("https://farm.example.com/api").expect("url"),
            "req-1",
        );
        let url = gateway.endpoint("batches/4").expect("endpoint");
        assert_eq!(url.as_str(), "https://farm.example.com/api/batches/4");
        assert_eq!(gateway.request_id(), "req-1");
    }
}
