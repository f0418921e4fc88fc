//! Wave - a Pomodoro focus timer with background sounds
//!
//! - 25 minutes of focused work
//! - 5 minute short breaks, 20 minute long breaks
//! - Looping background sound while the timer runs
//! - A companion task server reachable over HTTP

use anyhow::Result;
use clap::{CommandFactory, Parser};

use wave::cli::{AccountCommands, ApiClient, Cli, Commands, Display, IpcClient, TaskCommands};
use wave::daemon::default_socket_path;

/// Main entry point
#[tokio::main]
async fn main() {
    // Initialize logging
    init_tracing();

    // Parse command line arguments
    let cli = Cli::parse();

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    match cli.command {
        Some(Commands::Start) => {
            let response = IpcClient::new().start().await?;
            Display::show_start_success(&response);
        }
        Some(Commands::Pause) => {
            let response = IpcClient::new().pause().await?;
            Display::show_pause_success(&response);
        }
        Some(Commands::Reset) => {
            let response = IpcClient::new().reset().await?;
            Display::show_reset_success(&response);
        }
        Some(Commands::Status) => {
            let response = IpcClient::new().status().await?;
            Display::show_status(&response);
        }
        Some(Commands::Mode { mode }) => {
            let response = IpcClient::new().set_mode(mode).await?;
            Display::show_mode_changed(&response);
        }
        Some(Commands::Task { name }) => {
            let response = IpcClient::new().set_task(name.join(" ")).await?;
            Display::show_task_changed(&response);
        }
        Some(Commands::Mute { state }) => {
            let response = IpcClient::new().set_muted(state).await?;
            Display::show_mute_changed(&response);
        }
        Some(Commands::Sound { sound }) => {
            let response = IpcClient::new().set_sound(sound).await?;
            Display::show_sound_changed(&response);
        }
        Some(Commands::Daemon) => {
            wave::daemon::run(&default_socket_path()).await?;
        }
        Some(Commands::Serve(args)) => {
            let db_path = args.db.unwrap_or_else(wave::server::default_db_path);
            wave::server::run(args.addr, &db_path).await?;
        }
        Some(Commands::Account { server, command }) => {
            run_account_command(ApiClient::new(server)?, command).await?;
        }
        Some(Commands::Tasks { server, command }) => {
            run_task_command(ApiClient::new(server)?, command).await?;
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

/// Dispatches account subcommands against the task server.
async fn run_account_command(api: ApiClient, command: AccountCommands) -> Result<()> {
    match command {
        AccountCommands::Register {
            name,
            email,
            password,
        } => {
            api.register(&name, &email, &password).await?;
            println!("* Account created and logged in as {}", email);
        }
        AccountCommands::Login { email, password } => {
            api.login(&email, &password).await?;
            println!("* Logged in as {}", email);
        }
        AccountCommands::Logout => {
            if api.logout()? {
                println!("* Logged out");
            } else {
                println!("* Already logged out");
            }
        }
        AccountCommands::Profile => {
            let user = api.profile().await?;
            println!("{} <{}>", user.name, user.email);
            println!("id: {}", user.id);
        }
    }
    Ok(())
}

/// Dispatches task subcommands against the task server.
async fn run_task_command(api: ApiClient, command: TaskCommands) -> Result<()> {
    match command {
        TaskCommands::List => {
            let tasks = api.list_tasks().await?;
            if tasks.is_empty() {
                println!("No tasks yet");
            }
            for task in tasks {
                Display::show_task_row(&task.id, &task.name, &task.created_at);
            }
        }
        TaskCommands::Add { name } => {
            let task = api.add_task(&name.join(" ")).await?;
            println!("* Created task {} ({})", task.name, task.id);
        }
        TaskCommands::Show { id } => {
            let task = api.show_task(&id).await?;
            println!("{}", task.name);
            println!("id:      {}", task.id);
            println!("created: {}", task.created_at);
            println!("updated: {}", task.updated_at);
        }
        TaskCommands::Rename { id, name } => {
            let task = api.rename_task(&id, &name.join(" ")).await?;
            println!("* Renamed task {} to {}", task.id, task.name);
        }
        TaskCommands::Remove { id } => {
            api.remove_task(&id).await?;
            println!("* Deleted task {}", id);
        }
    }
    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["wave"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parse_status() {
        let cli = Cli::parse_from(["wave", "status"]);
        assert!(matches!(cli.command, Some(Commands::Status)));
    }

    #[test]
    fn test_cli_parse_verbose() {
        let cli = Cli::parse_from(["wave", "--verbose", "status"]);
        assert!(cli.verbose);
    }
}
