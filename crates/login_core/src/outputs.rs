use shared::{
    domain::{Credentials, User},
    status::StatusMessage,
};
use tokio::sync::{broadcast, watch};

use crate::{AttemptId, AttemptOutcome, FlowEvent, FlowPhase, FlowSnapshot};

/// Write side of the flow's signals. Each setter publishes only when the
/// value differs from the current one and mirrors the change onto the event
/// stream in the same order. The combined snapshot is published by
/// [`FlowOutputs::commit`] once the actor has finished handling a command.
pub(crate) struct FlowOutputs {
    submit_enabled: watch::Sender<bool>,
    status_text: watch::Sender<String>,
    loading: watch::Sender<bool>,
    user: watch::Sender<Option<User>>,
    snapshot: watch::Sender<FlowSnapshot>,
    pending: FlowSnapshot,
    events: broadcast::Sender<FlowEvent>,
}

impl FlowOutputs {
    pub(crate) fn new(
        submit_enabled: watch::Sender<bool>,
        status_text: watch::Sender<String>,
        loading: watch::Sender<bool>,
        user: watch::Sender<Option<User>>,
        snapshot: watch::Sender<FlowSnapshot>,
        events: broadcast::Sender<FlowEvent>,
    ) -> Self {
        let pending = snapshot.borrow().clone();
        Self {
            submit_enabled,
            status_text,
            loading,
            user,
            snapshot,
            pending,
            events,
        }
    }

    pub(crate) fn commit(&self) {
        let pending = &self.pending;
        self.snapshot.send_if_modified(|current| {
            if current == pending {
                false
            } else {
                current.clone_from(pending);
                true
            }
        });
    }

    pub(crate) fn set_submit_enabled(&mut self, enabled: bool) {
        self.pending.submit_enabled = enabled;
        if self
            .submit_enabled
            .send_if_modified(|current| replace_if_changed(current, enabled))
        {
            self.emit(FlowEvent::SubmitEnabledChanged(enabled));
        }
    }

    pub(crate) fn set_status(&mut self, status: &StatusMessage) {
        let text = status.to_string();
        self.pending.status_text.clone_from(&text);
        if self
            .status_text
            .send_if_modified(|current| replace_if_changed(current, text.clone()))
        {
            self.emit(FlowEvent::StatusChanged(text));
        }
    }

    pub(crate) fn set_loading(&mut self, loading: bool) {
        self.pending.loading = loading;
        self.pending.phase = if loading {
            FlowPhase::Submitting
        } else {
            FlowPhase::Idle
        };
        if self
            .loading
            .send_if_modified(|current| replace_if_changed(current, loading))
        {
            self.emit(FlowEvent::LoadingChanged(loading));
        }
    }

    pub(crate) fn set_user(&mut self, user: Option<User>) {
        self.pending.user.clone_from(&user);
        if self
            .user
            .send_if_modified(|current| replace_if_changed(current, user.clone()))
        {
            self.emit(FlowEvent::UserChanged(user));
        }
    }

    pub(crate) fn credentials_changed(&self, credentials: &Credentials) {
        self.emit(FlowEvent::CredentialsChanged(credentials.clone()));
    }

    pub(crate) fn attempt_started(&self, attempt: AttemptId) {
        self.emit(FlowEvent::AttemptStarted(attempt));
    }

    pub(crate) fn attempt_finished(&self, attempt: AttemptId, outcome: AttemptOutcome) {
        self.emit(FlowEvent::AttemptFinished { attempt, outcome });
    }

    fn emit(&self, event: FlowEvent) {
        // No subscribers is fine; the watch signals already hold the state.
        let _ = self.events.send(event);
    }
}

fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outputs() -> (
        FlowOutputs,
        watch::Receiver<String>,
        watch::Receiver<FlowSnapshot>,
        broadcast::Receiver<FlowEvent>,
    ) {
        let (submit_enabled, _) = watch::channel(false);
        let (status_tx, status_rx) = watch::channel(String::new());
        let (loading, _) = watch::channel(false);
        let (user, _) = watch::channel(None);
        let (snapshot_tx, snapshot_rx) = watch::channel(FlowSnapshot {
            submit_enabled: false,
            status_text: String::new(),
            loading: false,
            user: None,
            phase: FlowPhase::Idle,
        });
        let (events, events_rx) = broadcast::channel(16);
        (
            FlowOutputs::new(submit_enabled, status_tx, loading, user, snapshot_tx, events),
            status_rx,
            snapshot_rx,
            events_rx,
        )
    }

    #[test]
    fn unchanged_values_are_not_republished() {
        let (mut outputs, mut status, _snapshot, mut events) = outputs();

        outputs.set_status(&StatusMessage::ReadyToLogin);
        assert!(status.has_changed().expect("sender alive"));
        status.borrow_and_update();

        outputs.set_status(&StatusMessage::ReadyToLogin);
        assert!(!status.has_changed().expect("sender alive"));

        assert_eq!(
            events.try_recv().expect("first change"),
            FlowEvent::StatusChanged("Ready to login".into())
        );
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn clearing_an_absent_user_is_silent() {
        let (mut outputs, _status, _snapshot, mut events) = outputs();
        outputs.set_user(None);
        outputs.set_loading(false);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn snapshot_is_published_only_on_commit() {
        let (mut outputs, _status, mut snapshot, _events) = outputs();

        outputs.set_loading(true);
        outputs.set_status(&StatusMessage::LoggingIn);
        assert!(!snapshot.has_changed().expect("sender alive"));
        assert!(!snapshot.borrow().loading);

        outputs.commit();
        let committed = snapshot.borrow_and_update().clone();
        assert!(committed.loading);
        assert_eq!(committed.phase, FlowPhase::Submitting);
        assert_eq!(committed.status_text, "Logging in…");

        outputs.commit();
        assert!(!snapshot.has_changed().expect("sender alive"));
    }
}
