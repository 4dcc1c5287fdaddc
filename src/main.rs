use anyhow::Result;
use clap::{CommandFactory, Parser};
use meetscribe::cli::{Cli, Commands, ConfigAction};
use meetscribe::config::Config;
use meetscribe::daemon::run_daemon;
use meetscribe::ipc::client::send_command;
use meetscribe::ipc::protocol::{Command, Response};
use meetscribe::ipc::server::IpcServer;
use meetscribe::summarize::builtin_templates;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None | Some(Commands::Run) => {
            let config = load_config(&cli)?;
            meetscribe::app::run_session(config, &cli.session, cli.quiet, cli.verbose).await?;
        }
        Some(Commands::Daemon { ref socket }) => {
            let config = load_config(&cli)?;
            let socket = socket.clone().or_else(|| config.daemon.socket.clone());
            run_daemon(config, socket, &cli.session, cli.quiet, cli.verbose).await?;
        }
        Some(Commands::SetInterval { ref value, ref socket }) => {
            let response = handle_ipc_command(
                socket.clone(),
                Command::SetInterval {
                    value: value.clone(),
                },
            )
            .await?;
            if matches!(response, Response::Ok) && !cli.quiet {
                eprintln!("Interval set to {}", value);
            }
        }
        Some(Commands::Flush { ref socket }) => {
            let response = handle_ipc_command(socket.clone(), Command::Flush).await?;
            if let Response::Flushed { dispatched } = response
                && !cli.quiet
            {
                if dispatched {
                    eprintln!("Buffer flushed.");
                } else {
                    eprintln!("Buffer empty, nothing to flush.");
                }
            }
        }
        Some(Commands::Marker { ref key, ref socket }) => {
            let response =
                handle_ipc_command(socket.clone(), Command::Marker { key: key.clone() }).await?;
            if matches!(response, Response::Ok) && !cli.quiet {
                eprintln!("Marker '{}' recorded.", key);
            }
        }
        Some(Commands::Status { ref socket }) => {
            let response = handle_ipc_command(socket.clone(), Command::Status).await?;
            if let Response::Status { status } = response {
                print_status(&status);
            }
        }
        Some(Commands::Stop { ref socket }) => {
            let response = handle_ipc_command(socket.clone(), Command::Stop).await?;
            if let Response::Summary { summary } = response {
                meetscribe::app::print_summary(&summary);
            }
            // Session is done; the daemon has nothing left to serve.
            let _ = send_command(
                &socket
                    .clone()
                    .unwrap_or_else(IpcServer::default_socket_path),
                Command::Shutdown,
            )
            .await;
        }
        Some(Commands::Templates) => {
            list_templates();
        }
        Some(Commands::Config { ref action }) => {
            handle_config_command(action, &cli)?;
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "meetscribe",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// Load configuration and fold CLI overrides into it.
///
/// Priority order:
/// 1. CLI flags (--interval, --template, --include-partials)
/// 2. Environment variables (MEETSCRIBE_*)
/// 3. Custom config path from CLI (--config)
/// 4. Default config path (~/.config/meetscribe/config.toml)
/// 5. Built-in defaults
fn load_config(cli: &Cli) -> Result<Config> {
    let config = if let Some(path) = cli.config.as_deref() {
        Config::load(path)?
    } else if let Some(default_path) = Config::default_path() {
        Config::load_or_default(&default_path)?
    } else {
        Config::default()
    };

    let mut config = config.with_env_overrides();

    if let Some(interval) = cli.interval.as_deref() {
        config.session.interval = interval.to_string();
    }
    if let Some(template) = cli.template.as_deref() {
        config.summarize.template = template.to_string();
    }
    if cli.include_partials {
        config.session.include_partials = true;
    }

    Ok(config)
}

/// Send one command to the daemon and surface protocol-level errors.
async fn handle_ipc_command(socket: Option<PathBuf>, command: Command) -> Result<Response> {
    let socket_path = socket.unwrap_or_else(IpcServer::default_socket_path);
    let response = send_command(&socket_path, command).await?;

    if let Response::Error { ref message } = response {
        eprintln!("Error: {}", message);
        std::process::exit(1);
    }

    Ok(response)
}

/// Print session status in a human-readable layout.
fn print_status(status: &meetscribe::engine::EngineStatus) {
    println!("Session: {}", status.session_name);
    println!(
        "State: {}",
        if status.running { "running" } else { "stopped" }
    );
    println!("Interval: {}", status.policy);
    println!(
        "Elapsed: {:02}:{:02}",
        status.elapsed_secs / 60,
        status.elapsed_secs % 60
    );
    println!("Since last flush: {}s", status.since_last_flush_secs);
    println!(
        "Buffer: {}",
        if status.buffer_empty { "empty" } else { "pending" }
    );
    println!("Lines: {}", status.lines);
    if !status.speakers.is_empty() {
        println!("Speakers: {}", status.speakers.join(", "));
    }
    println!("Chunks dispatched: {}", status.chunks_dispatched);
    println!("Markers: {}", status.markers);
}

/// List the built-in summarization templates.
fn list_templates() {
    println!("Available templates:");
    for template in builtin_templates() {
        println!("  {}", template.name);
        println!("    {}", template.system);
    }
}

/// Handle configuration commands.
fn handle_config_command(action: &ConfigAction, cli: &Cli) -> Result<()> {
    match action {
        ConfigAction::Path => {
            let path = cli
                .config
                .clone()
                .or_else(Config::default_path)
                .ok_or_else(|| anyhow::anyhow!("could not determine config directory"))?;
            println!("{}", path.display());
        }
        ConfigAction::Show => {
            let config = load_config(cli)?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }
    Ok(())
}
