use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, ClientEvent, ElevatorClient, ElevatorController, ElevatorPhase, FetchOutcome,
    HttpElevatorController, PressOutcome,
};
use shared::domain::{ElevatorId, Floor};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};
use tracing_subscriber::EnvFilter;

mod commands;
mod render;

use commands::{parse_command, OperatorCommand, HELP};
use render::{describe_phase, render_view};

#[derive(Parser, Debug)]
#[command(about = "Operator console for a simulated elevator installation")]
struct Cli {
    /// Settings file (defaults to ./elevator.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Overrides the controller base url from settings.
    #[arg(long, global = true)]
    controller_url: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive panel with continuous status polling.
    Run {
        #[arg(long)]
        elevator: Option<String>,
    },
    /// Fetch and print one status snapshot.
    Status {
        #[arg(long)]
        elevator: Option<String>,
        /// Print the raw controller response.
        #[arg(long)]
        json: bool,
    },
    /// Request a floor and print the outcome.
    Press {
        #[arg(long)]
        elevator: Option<String>,
        floor: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(url) = cli.controller_url {
        settings.controller_url = url;
    }

    match cli.command.unwrap_or(Command::Run { elevator: None }) {
        Command::Run { elevator } => {
            let client = ElevatorClient::new(settings)?;
            run_console(client, elevator.map(ElevatorId::new)).await
        }
        Command::Status { elevator, json } if json => {
            let controller =
                HttpElevatorController::new(&settings.controller_url, settings.request_timeout())?;
            let elevator = match elevator {
                Some(id) => ElevatorId::new(id),
                None => settings.initial_elevator()?.id.clone(),
            };
            let status = controller.get_status(&elevator).await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
            Ok(())
        }
        Command::Status { elevator, .. } => {
            let client = ElevatorClient::new(settings)?;
            activate(&client, elevator).await?;
            let outcome = client.fetch_status().await?;
            print!("{}", render_view(&client.view().await));
            if let FetchOutcome::Applied(snapshot) = outcome {
                println!("phase: {}", describe_phase(ElevatorPhase::infer(&snapshot)));
            }
            Ok(())
        }
        Command::Press { elevator, floor } => {
            let floor = Floor::new(floor)?;
            let client = ElevatorClient::new(settings)?;
            activate(&client, elevator).await?;
            let outcome = client.press_floor(floor).await?;
            println!("{}", describe_outcome(floor, &outcome));
            print!("{}", render_view(&client.view().await));
            Ok(())
        }
    }
}

async fn activate(client: &Arc<ElevatorClient>, elevator: Option<String>) -> Result<()> {
    if let Some(id) = elevator {
        client.select_elevator(&ElevatorId::new(id)).await?;
    }
    Ok(())
}

fn describe_outcome(floor: Floor, outcome: &PressOutcome) -> String {
    match outcome {
        PressOutcome::Accepted => format!("floor {} accepted", floor.label()),
        PressOutcome::Rejected {
            message: Some(message),
        } => format!("floor {} rejected: {message}", floor.label()),
        PressOutcome::Rejected { message: None } => format!("floor {} rejected", floor.label()),
        PressOutcome::Stale { .. } => {
            format!("floor {} resolved after the elevator changed", floor.label())
        }
    }
}

async fn run_console(client: Arc<ElevatorClient>, elevator: Option<ElevatorId>) -> Result<()> {
    let printer = {
        let client = Arc::clone(&client);
        let mut events = client.subscribe_events();
        tokio::spawn(async move {
            let mut last_drawn = None;
            loop {
                match events.recv().await {
                    Ok(ClientEvent::Alert(message)) => eprintln!("!! {message}"),
                    Ok(ClientEvent::ElevatorSelected { elevator, .. }) => {
                        println!("-- now controlling {elevator}");
                    }
                    Ok(_) => {
                        let view = client.view().await;
                        if last_drawn.as_ref() != Some(&view) {
                            print!("{}", render_view(&view));
                            last_drawn = Some(view);
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "console renderer lagged behind events");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    };

    if let Some(elevator) = elevator {
        client.select_elevator(&elevator).await?;
    }
    let poller = client.spawn_polling();
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("failed to read console input")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                eprintln!("{err:#}");
                continue;
            }
        };

        if let Err(err) = execute(&client, command.clone()).await {
            eprintln!("{err:#}");
        }
        if command == OperatorCommand::Quit {
            break;
        }
    }

    poller.abort();
    printer.abort();
    Ok(())
}

async fn execute(client: &Arc<ElevatorClient>, command: OperatorCommand) -> Result<()> {
    match command {
        OperatorCommand::Select(elevator) => client.select_elevator(&elevator).await?,
        OperatorCommand::Press(floor) => {
            let outcome = client.press_floor(floor).await?;
            println!("{}", describe_outcome(floor, &outcome));
        }
        OperatorCommand::Validate(floor) => {
            let valid = client.validate_floor(floor).await?;
            let elevator = client.active_elevator().await;
            let verdict = if valid { "serves" } else { "does not serve" };
            println!("{elevator} {verdict} floor {}", floor.label());
        }
        OperatorCommand::Refresh => {
            client.fetch_status().await?;
        }
        OperatorCommand::Show => print!("{}", render_view(&client.view().await)),
        OperatorCommand::List => {
            let active = client.active_elevator().await;
            for profile in &client.settings().elevators {
                let marker = if profile.id == active { "*" } else { " " };
                println!("{marker} {} {}", profile.id, profile.label);
            }
        }
        OperatorCommand::Help => println!("{HELP}"),
        OperatorCommand::Quit => {}
    }
    Ok(())
}
