//! Email-first account resolution.
//!
//! One flow instance drives a single sign-in screen:
//! `Idle -> Checking -> {LoggingIn | Registering} -> Resolved`.
//! The existence check always runs before login or registration, failures
//! return the flow to the mode it was in, and nothing is retried
//! automatically.

use std::sync::Arc;

use agrovision_api_models::{Identity, LoginRequest, RegistrationRequest};
use agrovision_events::{Snapshot, SnapshotBus, SnapshotStream};
use agrovision_gateway::RemoteGateway;

use crate::error::{ClientError, ClientResult};
use crate::session::SessionStore;
use crate::validation::{INVALID_EMAIL_MESSAGE, all_present, is_valid_email};

/// Shown when a registration field is left blank.
pub const MISSING_FIELDS_MESSAGE: &str = "All fields are required.";
/// Shown when a registration is submitted before the email was checked.
pub const REGISTRATION_UNAVAILABLE_MESSAGE: &str = "Enter your email to continue.";
/// Shown when a submission arrives while another request is pending.
pub const REQUEST_PENDING_MESSAGE: &str = "Please wait for the current request to finish.";

/// Where a sign-in attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowPhase {
    /// Waiting for user input.
    #[default]
    Idle,
    /// Asking the backend whether the email has an account.
    Checking,
    /// Submitting credentials for an existing account.
    LoggingIn,
    /// Submitting the registration form.
    Registering,
    /// Signed in; the caller should navigate to the authenticated area.
    Resolved,
}

impl FlowPhase {
    /// Whether a request is in flight.
    #[must_use]
    pub const fn is_busy(self) -> bool {
        matches!(self, Self::Checking | Self::LoggingIn | Self::Registering)
    }
}

/// Which form the screen shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowMode {
    /// Email and password only.
    #[default]
    Login,
    /// Email plus the registration fields.
    Registration,
}

/// Published flow state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowState {
    /// Current phase.
    pub phase: FlowPhase,
    /// Current form mode.
    pub mode: FlowMode,
    /// Email that passed validation for this attempt.
    pub email: Option<String>,
    /// Error from the most recent submission, cleared on the next one.
    pub last_error: Option<ClientError>,
}

/// Result of submitting an email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    /// The account existed and login succeeded.
    Authenticated(Identity),
    /// No account exists; the registration form is now shown.
    RegistrationRequired,
}

/// Fields collected by the registration form.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact phone number.
    pub phone_number: String,
    /// Chosen password.
    pub password: String,
}

impl std::fmt::Debug for RegistrationForm {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("RegistrationForm")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("phone_number", &self.phone_number)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Account resolution flow bound to a gateway and a session store.
#[derive(Clone)]
pub struct AccountFlow {
    gateway: Arc<dyn RemoteGateway>,
    session: SessionStore,
    state: SnapshotBus<FlowState>,
}

impl std::fmt::Debug for AccountFlow {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AccountFlow")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl AccountFlow {
    /// Construct an idle flow in login mode.
    #[must_use]
    pub fn new(gateway: Arc<dyn RemoteGateway>, session: SessionStore) -> Self {
        Self {
            gateway,
            session,
            state: SnapshotBus::default(),
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn state(&self) -> Snapshot<FlowState> {
        self.state.snapshot()
    }

    /// Subscribe to flow changes.
    #[must_use]
    pub fn subscribe(&self) -> SnapshotStream<FlowState> {
        self.state.subscribe()
    }

    /// Session store the flow writes into.
    #[must_use]
    pub const fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Validate `email`, check whether it has an account and log in if so.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] without any request when the email
    /// is malformed, otherwise the classified failure of the lookup or login.
    pub async fn submit_email(&self, email: &str, password: &str) -> ClientResult<FlowOutcome> {
        let email = email.trim();
        if !is_valid_email(email) {
            tracing::debug!("email rejected by local validation");
            let error = ClientError::validation(INVALID_EMAIL_MESSAGE);
            self.state.publish_if(|state| {
                if state.phase.is_busy() {
                    return false;
                }
                state.phase = FlowPhase::Idle;
                state.last_error = Some(error.clone());
                true
            });
            return Err(error);
        }

        self.enter(FlowPhase::Checking, |state| {
            state.mode = FlowMode::Login;
            state.email = Some(email.to_string());
        })?;

        let existing = match self.gateway.lookup_user_by_email(email).await {
            Ok(existing) => existing,
            Err(err) => return Err(self.fail(FlowMode::Login, err.into())),
        };

        if existing.is_none() {
            tracing::debug!("no account for email; switching to registration");
            self.state.publish(|state| {
                state.phase = FlowPhase::Idle;
                state.mode = FlowMode::Registration;
            });
            return Ok(FlowOutcome::RegistrationRequired);
        }

        self.state.publish(|state| state.phase = FlowPhase::LoggingIn);
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        match self.gateway.login(&request).await {
            Ok(identity) => {
                self.resolve(identity.clone());
                Ok(FlowOutcome::Authenticated(identity))
            }
            Err(err) => Err(self.fail(FlowMode::Login, err.into())),
        }
    }

    /// Submit the registration form for the email checked earlier.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] without any request when the flow is
    /// not in registration mode or a field is blank, otherwise the classified
    /// registration failure.
    pub async fn submit_registration(&self, form: &RegistrationForm) -> ClientResult<Identity> {
        let current = self.state.snapshot();
        let email = match (current.mode, current.email.clone()) {
            (FlowMode::Registration, Some(email)) => email,
            _ => {
                return Err(ClientError::validation(REGISTRATION_UNAVAILABLE_MESSAGE));
            }
        };
        if !all_present(&[
            form.first_name.as_str(),
            form.last_name.as_str(),
            form.phone_number.as_str(),
            form.password.as_str(),
        ]) {
            tracing::debug!("registration rejected by local validation");
            let error = ClientError::validation(MISSING_FIELDS_MESSAGE);
            self.state
                .publish(|state| state.last_error = Some(error.clone()));
            return Err(error);
        }

        self.enter(FlowPhase::Registering, |_| {})?;
        let request = RegistrationRequest {
            email,
            password: form.password.clone(),
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            phone_number: form.phone_number.trim().to_string(),
        };
        match self.gateway.register(&request).await {
            Ok(identity) => {
                self.resolve(identity.clone());
                Ok(identity)
            }
            Err(err) => Err(self.fail(FlowMode::Registration, err.into())),
        }
    }

    /// Return from the registration form to the email step.
    pub fn back_to_login(&self) {
        self.state.publish_if(|state| {
            if state.phase.is_busy() || state.mode == FlowMode::Login {
                return false;
            }
            state.mode = FlowMode::Login;
            state.last_error = None;
            true
        });
    }

    /// Sign out and reset the flow.
    pub fn sign_out(&self) {
        if self.session.clear().is_some() {
            tracing::info!("signed out");
        }
        self.state.publish(|state| *state = FlowState::default());
    }

    fn enter(&self, phase: FlowPhase, update: impl FnOnce(&mut FlowState)) -> ClientResult<()> {
        let entered = self.state.publish_if(|state| {
            if state.phase.is_busy() {
                return false;
            }
            state.phase = phase;
            state.last_error = None;
            update(state);
            true
        });
        if entered.is_none() {
            return Err(ClientError::validation(REQUEST_PENDING_MESSAGE));
        }
        tracing::debug!(?phase, "account flow entered phase");
        Ok(())
    }

    fn resolve(&self, identity: Identity) {
        tracing::info!(user_id = identity.user_id, "account resolved");
        self.session.set_identity(identity);
        self.state.publish(|state| {
            state.phase = FlowPhase::Resolved;
            state.last_error = None;
        });
    }

    fn fail(&self, mode: FlowMode, error: ClientError) -> ClientError {
        tracing::warn!(?mode, error = %error, "account flow request failed");
        self.state.publish(|state| {
            state.phase = FlowPhase::Idle;
            state.mode = mode;
            state.last_error = Some(error.clone());
        });
        error
    }
}
