//! Terminal stand-in for the login screen: renders flow output changes.

use login_core::{FlowEvent, FlowSnapshot, LoginFlowController};
use tokio::{sync::broadcast::error::RecvError, task::JoinHandle};
use tracing::{debug, warn};

pub fn bind(flow: &LoginFlowController) -> JoinHandle<()> {
    let mut events = flow.subscribe_events();
    for line in describe_snapshot(&flow.snapshot()) {
        println!("{line}");
    }

    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Some(line) = describe(&event) {
                        println!("{line}");
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "view fell behind flow events"),
                Err(RecvError::Closed) => break,
            }
        }
        debug!("view detached");
    })
}

pub fn describe_snapshot(snapshot: &FlowSnapshot) -> Vec<String> {
    vec![
        button_line(snapshot.submit_enabled),
        spinner_line(snapshot.loading),
        status_line(&snapshot.status_text),
    ]
}

pub fn describe(event: &FlowEvent) -> Option<String> {
    match event {
        FlowEvent::SubmitEnabledChanged(enabled) => Some(button_line(*enabled)),
        FlowEvent::LoadingChanged(loading) => Some(spinner_line(*loading)),
        FlowEvent::StatusChanged(text) => Some(status_line(text)),
        FlowEvent::UserChanged(Some(user)) => match serde_json::to_string(user) {
            Ok(json) => Some(format!("Logged in user: {json}")),
            Err(err) => Some(format!("Logged in user: {} ({err})", user.name)),
        },
        FlowEvent::UserChanged(None)
        | FlowEvent::CredentialsChanged(_)
        | FlowEvent::AttemptStarted(_)
        | FlowEvent::AttemptFinished { .. } => None,
    }
}

fn button_line(enabled: bool) -> String {
    format!(
        "[login] {}",
        if enabled { "enabled" } else { "disabled" }
    )
}

fn spinner_line(loading: bool) -> String {
    if loading {
        "[spinner] running, input locked".to_string()
    } else {
        "[spinner] stopped".to_string()
    }
}

fn status_line(text: &str) -> String {
    format!("[status] {text}")
}
