//! Login screen flow: debounced credential input, submit gating and the
//! asynchronous authentication round trip, exposed as read-only signals.

use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use shared::{
    domain::{Credentials, User, UserId},
    error::AuthError,
    status::StatusMessage,
};
use thiserror::Error;
use tokio::{
    sync::{broadcast, mpsc, watch},
    task::JoinHandle,
};
use tracing::debug;

mod flow;
pub mod gateway;
mod outputs;

use flow::{FlowActor, FlowCommand};
use outputs::FlowOutputs;

pub use gateway::DemoAuthGateway;

/// Quiet period the credential inputs must hold before they propagate.
pub const CREDENTIALS_DEBOUNCE: Duration = Duration::from_millis(200);

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[async_trait]
pub trait AuthenticationGateway: Send + Sync {
    /// Resolves exactly once per call, with either a user or an error.
    async fn login(&self, username: &str, password: &str) -> Result<User, AuthError>;
}

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("login flow is no longer running")]
    Closed,
    #[error("login flow task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttemptId(pub u64);

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowPhase {
    #[default]
    Idle,
    Submitting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Succeeded(UserId),
    Failed(AuthError),
}

/// Ordered log of every observable change the flow makes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEvent {
    CredentialsChanged(Credentials),
    SubmitEnabledChanged(bool),
    StatusChanged(String),
    LoadingChanged(bool),
    UserChanged(Option<User>),
    AttemptStarted(AttemptId),
    AttemptFinished {
        attempt: AttemptId,
        outcome: AttemptOutcome,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowSnapshot {
    pub submit_enabled: bool,
    pub status_text: String,
    pub loading: bool,
    pub user: Option<User>,
    pub phase: FlowPhase,
}

#[derive(Debug, Clone)]
pub struct FlowConfig {
    pub debounce: Duration,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            debounce: CREDENTIALS_DEBOUNCE,
        }
    }
}

/// Handle to a running login flow. Inputs are queued onto the flow's own
/// task; outputs are `watch` signals that only notify on actual change.
///
/// Must be created inside a tokio runtime. Dropping the handle stops the flow.
pub struct LoginFlowController {
    commands: mpsc::UnboundedSender<FlowCommand>,
    submit_enabled: watch::Receiver<bool>,
    status_text: watch::Receiver<String>,
    loading: watch::Receiver<bool>,
    user: watch::Receiver<Option<User>>,
    snapshot: watch::Receiver<FlowSnapshot>,
    events: broadcast::Sender<FlowEvent>,
    task: Option<JoinHandle<()>>,
}

impl LoginFlowController {
    pub fn new(gateway: Arc<dyn AuthenticationGateway>) -> Self {
        Self::with_config(gateway, FlowConfig::default())
    }

    pub fn with_config(gateway: Arc<dyn AuthenticationGateway>, config: FlowConfig) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (submit_enabled_tx, submit_enabled) = watch::channel(false);
        let initial_status = StatusMessage::EnterCredentials.to_string();
        let (status_tx, status_text) = watch::channel(initial_status.clone());
        let (loading_tx, loading) = watch::channel(false);
        let (user_tx, user) = watch::channel(None);
        let (snapshot_tx, snapshot) = watch::channel(FlowSnapshot {
            submit_enabled: false,
            status_text: initial_status,
            loading: false,
            user: None,
            phase: FlowPhase::Idle,
        });

        let outputs = FlowOutputs::new(
            submit_enabled_tx,
            status_tx,
            loading_tx,
            user_tx,
            snapshot_tx,
            events.clone(),
        );
        let actor = FlowActor::new(config, gateway, outputs, commands.downgrade());
        let task = tokio::spawn(actor.run(command_rx));

        Self {
            commands,
            submit_enabled,
            status_text,
            loading,
            user,
            snapshot,
            events,
            task: Some(task),
        }
    }

    pub fn set_username(&self, value: impl Into<String>) -> Result<(), FlowError> {
        self.send(FlowCommand::SetUsername(value.into()))
    }

    pub fn set_password(&self, value: impl Into<String>) -> Result<(), FlowError> {
        self.send(FlowCommand::SetPassword(value.into()))
    }

    /// Requests a login with the most recent debounced credentials. Requests
    /// that fail the gate are dropped without any visible change.
    pub fn submit_requested(&self) -> Result<(), FlowError> {
        self.send(FlowCommand::SubmitRequested)
    }

    pub fn is_submit_enabled(&self) -> watch::Receiver<bool> {
        self.submit_enabled.clone()
    }

    pub fn status_text(&self) -> watch::Receiver<String> {
        self.status_text.clone()
    }

    pub fn is_loading(&self) -> watch::Receiver<bool> {
        self.loading.clone()
    }

    pub fn authenticated_user(&self) -> watch::Receiver<Option<User>> {
        self.user.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<FlowEvent> {
        self.events.subscribe()
    }

    /// Consistent view of all outputs as of the last fully handled input.
    /// The individual signals may already reflect a later step.
    pub fn snapshot(&self) -> FlowSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn snapshots(&self) -> watch::Receiver<FlowSnapshot> {
        self.snapshot.clone()
    }

    /// Stops the flow and waits for its task to exit. A gateway call still
    /// in flight keeps running but its result is discarded.
    pub async fn shutdown(mut self) -> Result<(), FlowError> {
        let Some(task) = self.task.take() else {
            return Ok(());
        };
        if self.commands.send(FlowCommand::Shutdown).is_err() {
            debug!("login flow already stopped before shutdown");
        }
        task.await?;
        Ok(())
    }

    fn send(&self, command: FlowCommand) -> Result<(), FlowError> {
        self.commands.send(command).map_err(|_| FlowError::Closed)
    }
}

impl Drop for LoginFlowController {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
