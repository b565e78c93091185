//! Async traits implemented by gateways and their test doubles.

use agrovision_api_models::{
    AssistantAnswer, BatchCreateRequest, BatchId, BatchRecord, BatchSummary, Identity,
    LoginRequest, RegistrationRequest, WeatherReport,
};
use async_trait::async_trait;

use crate::error::GatewayResult;

/// Backend operations used by the account flow and the batch view models.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Look up an account by email. `Ok(None)` means no account exists.
    async fn lookup_user_by_email(&self, email: &str) -> GatewayResult<Option<Identity>>;

    /// Authenticate an existing account.
    async fn login(&self, request: &LoginRequest) -> GatewayResult<Identity>;

    /// Create an account and return its identity.
    async fn register(&self, request: &RegistrationRequest) -> GatewayResult<Identity>;

    /// Fetch one batch.
    async fn get_batch(&self, batch_id: BatchId) -> GatewayResult<BatchRecord>;

    /// Fetch summaries of every batch, in backend order.
    async fn list_batches(&self) -> GatewayResult<Vec<BatchSummary>>;

    /// Create a batch and return the stored record.
    async fn create_batch(&self, request: &BatchCreateRequest) -> GatewayResult<BatchRecord>;
}

/// Question/answer endpoint behind the assistant chat.
#[async_trait]
pub trait AssistantGateway: Send + Sync {
    /// Submit a question.
    async fn ask(&self, question: &str) -> GatewayResult<AssistantAnswer>;
}

/// Current-conditions lookup behind the weather view.
#[async_trait]
pub trait WeatherGateway: Send + Sync {
    /// Fetch current conditions at the given position.
    async fn current_conditions(&self, latitude: f64, longitude: f64)
    -> GatewayResult<WeatherReport>;
}
