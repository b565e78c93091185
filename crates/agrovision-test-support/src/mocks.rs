//! Scripted gateways that record calls and replay queued replies.
//!
//! Replies are either ready up front or held open behind a
//! `tokio::sync::oneshot` channel so a test can release them in any order.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use agrovision_api_models::{
    AssistantAnswer, BatchCreateRequest, BatchId, BatchRecord, BatchSummary, Identity,
    LoginRequest, RegistrationRequest, WeatherReport,
};
use agrovision_gateway::{
    AssistantGateway, GatewayError, GatewayResult, RemoteGateway, WeatherGateway,
};
use async_trait::async_trait;
use tokio::sync::oneshot;

/// Sender used to release a held reply.
pub type Release<T> = oneshot::Sender<GatewayResult<T>>;

enum Reply<T> {
    Ready(GatewayResult<T>),
    Held(oneshot::Receiver<GatewayResult<T>>),
}

impl<T> Reply<T> {
    fn held() -> (Release<T>, Self) {
        let (sender, receiver) = oneshot::channel();
        (sender, Self::Held(receiver))
    }

    async fn resolve(self) -> GatewayResult<T> {
        match self {
            Self::Ready(result) => result,
            Self::Held(receiver) => receiver
                .await
                .unwrap_or_else(|_| Err(GatewayError::network("held reply was dropped"))),
        }
    }
}

fn missing<T>(operation: &str) -> Reply<T> {
    Reply::Ready(Err(GatewayError::unknown(format!(
        "no scripted reply for {operation}"
    ))))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One recorded gateway invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    /// `lookup_user_by_email(email)`.
    LookupUserByEmail(String),
    /// `login` for the given email.
    Login(String),
    /// `register` with the full request.
    Register(RegistrationRequest),
    /// `get_batch(id)`.
    GetBatch(BatchId),
    /// `list_batches()`.
    ListBatches,
    /// `create_batch` with the full request.
    CreateBatch(BatchCreateRequest),
    /// `ask(question)`.
    Ask(String),
    /// `current_conditions(latitude, longitude)`.
    CurrentConditions(f64, f64),
}

#[derive(Default)]
struct Script {
    lookups: VecDeque<Reply<Option<Identity>>>,
    logins: VecDeque<Reply<Identity>>,
    registrations: VecDeque<Reply<Identity>>,
    batches: HashMap<BatchId, VecDeque<Reply<BatchRecord>>>,
    lists: VecDeque<Reply<Vec<BatchSummary>>>,
    creations: VecDeque<Reply<BatchRecord>>,
    answers: VecDeque<Reply<AssistantAnswer>>,
    conditions: VecDeque<Reply<WeatherReport>>,
}

/// In-memory gateway implementing every gateway trait from queued replies.
///
/// An operation with nothing queued fails with [`GatewayError::Unknown`].
#[derive(Default)]
pub struct ScriptedGateway {
    script: Mutex<Script>,
    calls: Mutex<Vec<GatewayCall>>,
}

impl ScriptedGateway {
    /// Empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for `lookup_user_by_email`.
    pub fn push_lookup(&self, result: GatewayResult<Option<Identity>>) {
        lock(&self.script).lookups.push_back(Reply::Ready(result));
    }

    /// Queue a reply for `login`.
    pub fn push_login(&self, result: GatewayResult<Identity>) {
        lock(&self.script).logins.push_back(Reply::Ready(result));
    }

    /// Queue a reply for `register`.
    pub fn push_register(&self, result: GatewayResult<Identity>) {
        lock(&self.script)
            .registrations
            .push_back(Reply::Ready(result));
    }

    /// Queue a reply for `get_batch(batch_id)`.
    pub fn push_batch(&self, batch_id: BatchId, result: GatewayResult<BatchRecord>) {
        lock(&self.script)
            .batches
            .entry(batch_id)
            .or_default()
            .push_back(Reply::Ready(result));
    }

    /// Queue a held reply for `get_batch(batch_id)`.
    #[must_use]
    pub fn hold_batch(&self, batch_id: BatchId) -> Release<BatchRecord> {
        let (release, reply) = Reply::held();
        lock(&self.script)
            .batches
            .entry(batch_id)
            .or_default()
            .push_back(reply);
        release
    }

    /// Queue a reply for `list_batches`.
    pub fn push_list(&self, result: GatewayResult<Vec<BatchSummary>>) {
        lock(&self.script).lists.push_back(Reply::Ready(result));
    }

    /// Queue a held reply for `list_batches`.
    #[must_use]
    pub fn hold_list(&self) -> Release<Vec<BatchSummary>> {
        let (release, reply) = Reply::held();
        lock(&self.script).lists.push_back(reply);
        release
    }

    /// Queue a reply for `create_batch`.
    pub fn push_created(&self, result: GatewayResult<BatchRecord>) {
        lock(&self.script).creations.push_back(Reply::Ready(result));
    }

    /// Queue a reply for `ask`.
    pub fn push_answer(&self, result: GatewayResult<AssistantAnswer>) {
        lock(&self.script).answers.push_back(Reply::Ready(result));
    }

    /// Queue a reply for `current_conditions`.
    pub fn push_conditions(&self, result: GatewayResult<WeatherReport>) {
        lock(&self.script).conditions.push_back(Reply::Ready(result));
    }

    /// Queue a held reply for `current_conditions`.
    #[must_use]
    pub fn hold_conditions(&self) -> Release<WeatherReport> {
        let (release, reply) = Reply::held();
        lock(&self.script).conditions.push_back(reply);
        release
    }

    /// Every call received so far, in arrival order.
    #[must_use]
    pub fn calls(&self) -> Vec<GatewayCall> {
        lock(&self.calls).clone()
    }

    /// Number of calls received so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    fn record(&self, call: GatewayCall) {
        lock(&self.calls).push(call);
    }
}

#[async_trait]
impl RemoteGateway for ScriptedGateway {
    async fn lookup_user_by_email(&self, email: &str) -> GatewayResult<Option<Identity>> {
        self.record(GatewayCall::LookupUserByEmail(email.to_string()));
        let reply = lock(&self.script)
            .lookups
            .pop_front()
            .unwrap_or_else(|| missing("lookup_user_by_email"));
        reply.resolve().await
    }

    async fn login(&self, request: &LoginRequest) -> GatewayResult<Identity> {
        self.record(GatewayCall::Login(request.email.clone()));
        let reply = lock(&self.script)
            .logins
            .pop_front()
            .unwrap_or_else(|| missing("login"));
        reply.resolve().await
    }

    async fn register(&self, request: &RegistrationRequest) -> GatewayResult<Identity> {
        self.record(GatewayCall::Register(request.clone()));
        let reply = lock(&self.script)
            .registrations
            .pop_front()
            .unwrap_or_else(|| missing("register"));
        reply.resolve().await
    }

    async fn get_batch(&self, batch_id: BatchId) -> GatewayResult<BatchRecord> {
        self.record(GatewayCall::GetBatch(batch_id));
        let reply = lock(&self.script)
            .batches
            .get_mut(&batch_id)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| missing("get_batch"));
        reply.resolve().await
    }

    async fn list_batches(&self) -> GatewayResult<Vec<BatchSummary>> {
        self.record(GatewayCall::ListBatches);
        let reply = lock(&self.script)
            .lists
            .pop_front()
            .unwrap_or_else(|| missing("list_batches"));
        reply.resolve().await
    }

    async fn create_batch(&self, request: &BatchCreateRequest) -> GatewayResult<BatchRecord> {
        self.record(GatewayCall::CreateBatch(request.clone()));
        let reply = lock(&self.script)
            .creations
            .pop_front()
            .unwrap_or_else(|| missing("create_batch"));
        reply.resolve().await
    }
}

#[async_trait]
impl AssistantGateway for ScriptedGateway {
    async fn ask(&self, question: &str) -> GatewayResult<AssistantAnswer> {
        self.record(GatewayCall::Ask(question.to_string()));
        let reply = lock(&self.script)
            .answers
            .pop_front()
            .unwrap_or_else(|| missing("ask"));
        reply.resolve().await
    }
}

#[async_trait]
impl WeatherGateway for ScriptedGateway {
    async fn current_conditions(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> GatewayResult<WeatherReport> {
        self.record(GatewayCall::CurrentConditions(latitude, longitude));
        let reply = lock(&self.script)
            .conditions
            .pop_front()
            .unwrap_or_else(|| missing("current_conditions"));
        reply.resolve().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{sample_batch, sample_identity};

    #[tokio::test]
    async fn replies_are_consumed_in_order_and_calls_recorded() {
        let gateway = ScriptedGateway::new();
        gateway.push_lookup(Ok(None));
        gateway.push_lookup(Ok(Some(sample_identity())));

        assert_eq!(gateway.lookup_user_by_email("a@b.co").await, Ok(None));
        assert_eq!(
            gateway.lookup_user_by_email("x@y.com").await,
            Ok(Some(sample_identity()))
        );
        assert_eq!(
            gateway.calls(),
            vec![
                GatewayCall::LookupUserByEmail("a@b.co".to_string()),
                GatewayCall::LookupUserByEmail("x@y.com".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn unscripted_operation_fails_as_unknown() {
        let gateway = ScriptedGateway::new();
        let err = gateway.list_batches().await.expect_err("nothing queued");
        assert!(matches!(err, GatewayError::Unknown { .. }));
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn held_reply_waits_for_release() {
        let gateway = std::sync::Arc::new(ScriptedGateway::new());
        let release = gateway.hold_batch(BatchId(1));
        let pending = tokio::spawn({
            let gateway = std::sync::Arc::clone(&gateway);
            async move { gateway.get_batch(BatchId(1)).await }
        });
        tokio::task::yield_now().await;
        assert!(!pending.is_finished());

        release.send(Ok(sample_batch(1))).expect("receiver alive");
        let record = pending.await.expect("task").expect("reply");
        assert_eq!(record.batch_id, BatchId(1));
    }

    #[tokio::test]
    async fn dropped_release_surfaces_network_error() {
        let gateway = ScriptedGateway::new();
        drop(gateway.hold_list());
        let err = gateway.list_batches().await.expect_err("dropped");
        assert!(err.is_network());
    }
}
