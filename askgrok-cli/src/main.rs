use anyhow::Result;
use askgrok_core::ask::{resolve_path, status_line, toggle_stateful};
use askgrok_core::file::git::find_repository_root;
use askgrok_core::{
    AskCommand, AskOutcome, ContentRequest, LineRange, SettingsManager, XaiProvider,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod interaction;

use crate::interaction::{print_error, print_system, CliInteraction};

#[derive(Parser, Debug)]
#[command(name = "askgrok")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Ask Grok about your workspace, a file, a function or a selection")]
struct Args {
    /// Workspace root (defaults to the enclosing git repository)
    #[arg(long, value_name = "DIR")]
    workspace_root: Option<PathBuf>,

    /// Use a specific global settings file
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Question to ask instead of prompting for one
    #[arg(long, short)]
    question: Option<String>,

    /// Send without showing the preview
    #[arg(long, short)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask about every eligible file in the workspace
    Workspace,
    /// Ask about a single file
    Tab { file: PathBuf },
    /// Ask about the function or method enclosing a line
    Function {
        file: PathBuf,
        #[arg(long)]
        line: usize,
    },
    /// Ask about a range of lines, `N`, `N:M` or `N-M`
    Selection {
        file: PathBuf,
        #[arg(long)]
        lines: LineRange,
    },
    /// Turn stateful sessions on or off
    ToggleStateful,
    /// Show whether stateful sessions are on
    Status,
}

fn main() {
    if let Err(e) = run() {
        error!(?e, "askgrok failed");
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    setup_tracing()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    let args = Args::parse();
    let cwd = std::env::current_dir()?;

    let workspace_root = match args.workspace_root {
        Some(root) => Some(canonicalize_workspace_root(root)?),
        None => find_repository_root(&cwd),
    };
    info!(?workspace_root, command = ?args.command, "CLI startup");

    let mut settings = match args.settings {
        Some(path) => SettingsManager::from_path(path, workspace_root.as_deref())?,
        None => SettingsManager::new(workspace_root.as_deref())?,
    };

    let request = match args.command {
        Commands::ToggleStateful => {
            let enabled = toggle_stateful(&mut settings)?;
            print_system(status_line(enabled));
            return Ok(());
        }
        Commands::Status => {
            print_system(status_line(settings.settings().enable_stateful_sessions));
            return Ok(());
        }
        Commands::Workspace => ContentRequest::Workspace,
        Commands::Tab { file } => ContentRequest::Tab {
            path: resolve_path(Some(&cwd), &file),
        },
        Commands::Function { file, line } => ContentRequest::Function {
            path: resolve_path(Some(&cwd), &file),
            line,
        },
        Commands::Selection { file, lines } => ContentRequest::Selection {
            path: resolve_path(Some(&cwd), &file),
            lines,
        },
    };

    let provider = XaiProvider::new(settings.settings().api_base_url)?;
    let interaction = CliInteraction::new(args.question, args.yes)?;
    let mut command = AskCommand::new(
        settings,
        Arc::new(provider),
        Box::new(interaction),
        workspace_root,
    );

    let outcome = command.run(&request, &mut std::io::stdout()).await?;
    info!(?outcome, "Command finished");
    if outcome == AskOutcome::Cancelled {
        print_system("Request cancelled.");
    }
    Ok(())
}

fn canonicalize_workspace_root(root: PathBuf) -> Result<PathBuf> {
    root.canonicalize()
        .map_err(|e| anyhow::anyhow!("Failed to canonicalize workspace root {root:?}: {e:?}"))
}

fn setup_tracing() -> Result<()> {
    use std::fs;
    use tracing_subscriber::fmt;

    let home = dirs::home_dir().unwrap_or_else(std::env::temp_dir);
    let trace_dir = home.join(".askgrok").join("trace");
    fs::create_dir_all(&trace_dir)?;

    let log_file = trace_dir.join("askgrok.log");
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Tracing initialized to {:?}", log_file);
    Ok(())
}
