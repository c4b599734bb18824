use std::{
    io::{self, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{ActionDispatcher, DashboardEvent, HttpTaskService};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::{self, error::TryRecvError},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod render;

use commands::Command;
use config::load_settings;

#[derive(Parser, Debug)]
#[command(
    name = "chore-dashboard",
    version,
    about = "Terminal dashboard for the chore rotation service"
)]
struct Args {
    /// Settings file; missing is fine.
    #[arg(long, default_value = "dashboard.toml")]
    config: PathBuf,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    api_key: Option<String>,
    /// Load once, print the assignments and exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config)?;
    if let Some(url) = args.server_url {
        settings.server_url = url;
    }
    if let Some(key) = args.api_key {
        settings.api_key = Some(key);
    }
    settings.validate()?;

    let mut service =
        HttpTaskService::with_timeout(&settings.server_url, settings.request_timeout())
            .context("failed to set up task service client")?;
    if let Some(key) = &settings.api_key {
        service = service.with_api_key(key.clone());
    }
    info!(server_url = %service.base_url(), "dashboard starting");

    let mut dispatcher = ActionDispatcher::new(Arc::new(service), settings.credential_verifier());

    if args.once {
        dispatcher
            .refresh()
            .await
            .context("failed to load assignments")?;
        print!("{}", render::render_view(&dispatcher.view().await));
        return Ok(());
    }

    if !settings.has_operator_account() {
        warn!("no operator account configured; every login will be refused");
    }
    run_interactive(&mut dispatcher).await
}

async fn run_interactive(dispatcher: &mut ActionDispatcher) -> Result<()> {
    let mut events = dispatcher.subscribe_events();
    println!("{}", commands::HELP);

    // Initial load; a failure is reported through the event stream.
    let _ = dispatcher.refresh().await;
    report(dispatcher, &mut events).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt(dispatcher);
        let Some(line) = lines
            .next_line()
            .await
            .context("failed to read from stdin")?
        else {
            break;
        };

        let command = match commands::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                eprintln!("ERROR: {err}");
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }

        execute(dispatcher, command).await;
        report(dispatcher, &mut events).await;
    }

    Ok(())
}

// Failures are surfaced through `DashboardEvent::Error`, so results are dropped here.
async fn execute(dispatcher: &mut ActionDispatcher, command: Command) {
    match command {
        Command::Refresh => {
            let _ = dispatcher.refresh().await;
        }
        Command::Show => print!("{}", render::render_view(&dispatcher.view().await)),
        Command::Status => print!("{}", render::render_status(dispatcher)),
        Command::Protected(action) => {
            let _ = dispatcher.request(action).await;
        }
        Command::User(name) => {
            let _ = dispatcher.set_username(name);
        }
        Command::Password(secret) => {
            let _ = dispatcher.set_password(secret);
        }
        Command::Login => {
            let _ = dispatcher.submit_credentials().await;
        }
        Command::Cancel => {
            if let Some(action) = dispatcher.cancel_authentication() {
                println!("Dropped pending '{}'.", action.name());
            }
        }
        Command::Set { field, value } => {
            let _ = dispatcher.update_field(field, value);
        }
        Command::Submit => {
            let _ = dispatcher.submit().await;
        }
        Command::Close => {
            if dispatcher.close_form().is_none() {
                println!("No form is open.");
            }
        }
        Command::Help => println!("{}", commands::HELP),
        Command::Quit => {}
    }
}

async fn report(dispatcher: &ActionDispatcher, events: &mut broadcast::Receiver<DashboardEvent>) {
    loop {
        let event = match events.try_recv() {
            Ok(event) => event,
            Err(TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "dashboard events lagged");
                continue;
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        };

        match event {
            DashboardEvent::Synced { .. } => {
                print!("{}", render::render_view(&dispatcher.view().await));
            }
            DashboardEvent::AuthPromptOpened { pending } => println!(
                "Login required for '{}': enter 'user <name>', 'password <secret>', then 'login' (or 'cancel').",
                pending.name()
            ),
            DashboardEvent::AuthPromptClosed => println!("Login prompt closed."),
            DashboardEvent::Authenticated => println!("Logged in."),
            DashboardEvent::FormOpened(kind) => println!(
                "New {kind} form: fill it with 'set <field> <value>', then 'submit' (or 'close')."
            ),
            DashboardEvent::FormClosed(kind) => println!("The {kind} form is closed."),
            DashboardEvent::Reassigned => println!("Tasks reassigned."),
            DashboardEvent::EntityCreated(kind) => println!("Added {kind}."),
            DashboardEvent::Error { message, .. } => eprintln!("ERROR: {message}"),
        }
    }
}

fn prompt(dispatcher: &ActionDispatcher) {
    let marker = if dispatcher.gate().is_prompt_open() {
        "login".to_string()
    } else if let Some(kind) = dispatcher.creation().active_kind() {
        kind.to_string()
    } else {
        "dashboard".to_string()
    };
    print!("{marker}> ");
    let _ = io::stdout().flush();
}
