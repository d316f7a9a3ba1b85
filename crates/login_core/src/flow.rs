use std::{pin::Pin, sync::Arc};

use shared::{
    domain::{Credentials, User},
    error::AuthError,
    status::StatusMessage,
};
use tokio::{
    sync::mpsc,
    time::{sleep, Sleep},
};
use tracing::{debug, info, warn};

use crate::{
    outputs::FlowOutputs, AttemptId, AttemptOutcome, AuthenticationGateway, FlowConfig,
};

pub(crate) enum FlowCommand {
    SetUsername(String),
    SetPassword(String),
    SubmitRequested,
    GatewayFinished {
        attempt: AttemptId,
        result: Result<User, AuthError>,
    },
    Shutdown,
}

enum Wake {
    Command(Option<FlowCommand>),
    DebounceElapsed,
}

/// Owns every piece of mutable flow state. Runs on a single task and handles
/// one command at a time, so inputs, submits and gateway results never
/// interleave.
pub(crate) struct FlowActor {
    config: FlowConfig,
    gateway: Arc<dyn AuthenticationGateway>,
    outputs: FlowOutputs,
    results: mpsc::WeakUnboundedSender<FlowCommand>,
    raw_username: String,
    raw_password: String,
    debounce: Option<Pin<Box<Sleep>>>,
    credentials: Option<Credentials>,
    idle_status: StatusMessage,
    in_flight: Option<AttemptId>,
    last_attempt: u64,
}

impl FlowActor {
    pub(crate) fn new(
        config: FlowConfig,
        gateway: Arc<dyn AuthenticationGateway>,
        outputs: FlowOutputs,
        results: mpsc::WeakUnboundedSender<FlowCommand>,
    ) -> Self {
        Self {
            config,
            gateway,
            outputs,
            results,
            raw_username: String::new(),
            raw_password: String::new(),
            debounce: None,
            credentials: None,
            idle_status: StatusMessage::EnterCredentials,
            in_flight: None,
            last_attempt: 0,
        }
    }

    pub(crate) async fn run(mut self, mut commands: mpsc::UnboundedReceiver<FlowCommand>) {
        // Both inputs start out empty and that pair goes through the same
        // quiet period as any later edit.
        self.schedule_debounce();

        loop {
            let wake = tokio::select! {
                command = commands.recv() => Wake::Command(command),
                () = debounce_elapsed(self.debounce.as_mut()) => Wake::DebounceElapsed,
            };

            match wake {
                Wake::Command(Some(FlowCommand::SetUsername(value))) => {
                    self.raw_username = value;
                    self.schedule_debounce();
                }
                Wake::Command(Some(FlowCommand::SetPassword(value))) => {
                    self.raw_password = value;
                    self.schedule_debounce();
                }
                Wake::Command(Some(FlowCommand::SubmitRequested)) => self.submit(),
                Wake::Command(Some(FlowCommand::GatewayFinished { attempt, result })) => {
                    self.finish(attempt, result);
                }
                Wake::Command(Some(FlowCommand::Shutdown)) | Wake::Command(None) => break,
                Wake::DebounceElapsed => {
                    self.debounce = None;
                    self.publish_credentials();
                }
            }
            self.outputs.commit();
        }

        debug!(in_flight = ?self.in_flight, "login flow stopped");
    }

    fn schedule_debounce(&mut self) {
        self.debounce = Some(Box::pin(sleep(self.config.debounce)));
    }

    fn publish_credentials(&mut self) {
        let next = Credentials::normalized(&self.raw_username, &self.raw_password);
        if self.credentials.as_ref() == Some(&next) {
            debug!("credentials unchanged after normalization");
            return;
        }

        debug!(credentials = ?next, "credentials changed");
        self.outputs.credentials_changed(&next);
        self.idle_status = next.idle_status();
        self.credentials = Some(next);

        self.refresh_submit_enabled();
        if self.in_flight.is_none() {
            self.outputs.set_status(&self.idle_status);
        }
    }

    fn submit(&mut self) {
        if let Some(attempt) = self.in_flight {
            debug!(%attempt, "submit dropped: attempt already in flight");
            return;
        }
        let Some(credentials) = self.credentials.clone() else {
            debug!("submit dropped: no credentials yet");
            return;
        };
        if !credentials.is_valid() {
            debug!(credentials = ?credentials, "submit dropped: credentials invalid");
            return;
        }

        self.last_attempt += 1;
        let attempt = AttemptId(self.last_attempt);
        self.in_flight = Some(attempt);

        self.outputs.attempt_started(attempt);
        self.outputs.set_loading(true);
        self.outputs.set_status(&StatusMessage::LoggingIn);
        self.outputs.set_user(None);
        self.refresh_submit_enabled();
        info!(%attempt, username = %credentials.username, "login attempt started");

        let gateway = Arc::clone(&self.gateway);
        let results = self.results.clone();
        tokio::spawn(async move {
            let result = gateway
                .login(&credentials.username, &credentials.password)
                .await;
            let Some(results) = results.upgrade() else {
                debug!(%attempt, "login flow gone; discarding gateway result");
                return;
            };
            let _ = results.send(FlowCommand::GatewayFinished { attempt, result });
        });
    }

    fn finish(&mut self, attempt: AttemptId, result: Result<User, AuthError>) {
        if self.in_flight != Some(attempt) {
            warn!(%attempt, in_flight = ?self.in_flight, "ignoring result for unknown attempt");
            return;
        }
        self.in_flight = None;

        self.outputs.set_loading(false);
        self.refresh_submit_enabled();

        let outcome = match result {
            Ok(user) => {
                info!(%attempt, user_id = %user.id.0, "login succeeded");
                let status = StatusMessage::Welcome(user.name.clone());
                let user_id = user.id;
                self.outputs.set_user(Some(user));
                self.outputs.set_status(&status);
                AttemptOutcome::Succeeded(user_id)
            }
            Err(err) => {
                warn!(%attempt, error = %err, "login failed");
                self.outputs.set_user(None);
                self.outputs.set_status(&StatusMessage::Failed(err));
                AttemptOutcome::Failed(err)
            }
        };
        self.outputs.attempt_finished(attempt, outcome);
    }

    fn refresh_submit_enabled(&mut self) {
        let valid = self.credentials.as_ref().is_some_and(Credentials::is_valid);
        self.outputs
            .set_submit_enabled(valid && self.in_flight.is_none());
    }
}

async fn debounce_elapsed(timer: Option<&mut Pin<Box<Sleep>>>) {
    match timer {
        Some(timer) => timer.await,
        None => std::future::pending().await,
    }
}
