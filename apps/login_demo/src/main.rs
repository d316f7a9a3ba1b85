use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use login_core::{
    AttemptOutcome, DemoAuthGateway, FlowEvent, LoginFlowController, CREDENTIALS_DEBOUNCE,
};
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod view;

use config::load_settings;

/// Drives the login flow from the terminal. Pass both credentials for a
/// single scripted attempt, or neither for an interactive session.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    password: Option<String>,
    /// Overrides the simulated gateway latency.
    #[arg(long)]
    latency_ms: Option<u64>,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    User(String),
    Pass(String),
    Login,
    Status,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
    match verb.trim() {
        "user" => Some(Command::User(rest.to_string())),
        "pass" => Some(Command::Pass(rest.to_string())),
        "login" => Some(Command::Login),
        "status" => Some(Command::Status),
        "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings()?;
    if let Some(latency_ms) = args.latency_ms {
        settings.gateway_latency_ms = latency_ms;
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let gateway = Arc::new(DemoAuthGateway::with_latency(Duration::from_millis(
        settings.gateway_latency_ms,
    )));
    info!(latency_ms = settings.gateway_latency_ms, "starting login demo");

    let flow = LoginFlowController::new(gateway);
    let view = view::bind(&flow);

    let outcome = match (args.username, args.password) {
        (Some(username), Some(password)) => run_scripted(&flow, username, password).await,
        (None, None) => run_interactive(&flow).await,
        _ => Err(anyhow!("--username and --password must be given together")),
    };

    flow.shutdown().await.context("login flow did not stop cleanly")?;
    view.await.context("view task failed")?;
    outcome
}

async fn run_scripted(
    flow: &LoginFlowController,
    username: String,
    password: String,
) -> Result<()> {
    flow.set_username(username)?;
    flow.set_password(password)?;
    tokio::time::sleep(CREDENTIALS_DEBOUNCE + Duration::from_millis(50)).await;

    if !*flow.is_submit_enabled().borrow() {
        bail!("login not possible: {}", flow.snapshot().status_text);
    }

    let mut events = flow.subscribe_events();
    flow.submit_requested()?;
    loop {
        let event = events.recv().await.context("login flow stopped")?;
        if let FlowEvent::AttemptFinished { outcome, .. } = event {
            return match outcome {
                AttemptOutcome::Succeeded(_) => Ok(()),
                AttemptOutcome::Failed(err) => bail!("login failed: {err}"),
            };
        }
    }
}

async fn run_interactive(flow: &LoginFlowController) -> Result<()> {
    println!("commands: user <name> | pass <password> | login | status | quit");
    let mut lines = BufReader::new(io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        match parse_command(&line) {
            Some(Command::User(value)) => flow.set_username(value)?,
            Some(Command::Pass(value)) => flow.set_password(value)?,
            Some(Command::Login) => flow.submit_requested()?,
            Some(Command::Status) => {
                for line in view::describe_snapshot(&flow.snapshot()) {
                    println!("{line}");
                }
            }
            Some(Command::Quit) => break,
            None => println!("unknown command: {}", line.trim()),
        }
    }

    Ok(())
}
