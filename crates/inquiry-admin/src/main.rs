//! Staff command line for reviewing contact submissions.

use std::error::Error as _;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use inquiry_core::{ContactSubmission, Gateway, GatewayError, SubmissionInput, SubmissionStatus};
use tokio::io::AsyncReadExt;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use inquiry_admin::{connect, Config};

#[derive(Debug, Parser)]
#[command(name = "inquiry-admin")]
#[command(about = "Review and triage contact form submissions")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List submissions, newest first
    List {
        /// Only show submissions in this status (new, read, replied)
        #[arg(long)]
        status: Option<SubmissionStatus>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one submission
    Show {
        id: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Set the handling status of a submission
    Mark {
        id: String,
        status: SubmissionStatus,
    },

    /// Store a submission read from a JSON file ("-" for stdin)
    Submit { path: PathBuf },

    /// Check that the backend answers
    Check,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Invalid id: {0}")]
    InvalidId(#[from] inquiry_core::ParseIdError),

    #[error("Could not read submission: {0}")]
    Input(#[from] std::io::Error),

    #[error("Invalid submission JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Backend is not reachable")]
    NotReady,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let gateway = match connect(&config.backend).await {
        Ok(gateway) => gateway,
        Err(e) => {
            error!(error = %e, "Failed to start submission store");
            eprintln!("Could not connect to the submission store.");
            return ExitCode::FAILURE;
        }
    };

    match run(&gateway, args.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(gateway: &Gateway, command: Command) -> Result<(), CliError> {
    match command {
        Command::List { status, json } => {
            let submissions = match status {
                Some(status) => gateway.list_by_status(status).await?,
                None => gateway.list().await?,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&submissions)?);
            } else {
                print_table(&submissions);
            }
        }
        Command::Show { id, json } => {
            let id = gateway.id_space().parse(&id)?;
            let submission = gateway.get(&id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&submission)?);
            } else {
                print_detail(&submission);
            }
        }
        Command::Mark { id, status } => {
            let id = gateway.id_space().parse(&id)?;
            let updated = gateway.update_status(&id, status).await?;
            println!("{} is now {}", updated.id, updated.status);
        }
        Command::Submit { path } => {
            let raw = if path.as_os_str() == "-" {
                let mut buf = String::new();
                tokio::io::stdin().read_to_string(&mut buf).await?;
                buf
            } else {
                tokio::fs::read_to_string(&path).await?
            };
            let input: SubmissionInput = serde_json::from_str(&raw)?;
            let saved = gateway.save(input).await?;
            info!(id = %saved.id, "Submission stored");
            println!("{}", saved.id);
        }
        Command::Check => {
            if !gateway.is_ready().await {
                return Err(CliError::NotReady);
            }
            println!("{} backend is ready", gateway.backend_name());
        }
    }

    Ok(())
}

/// Print a user-facing message; persistence details only go to the log.
fn report(err: &CliError) {
    match err {
        CliError::Gateway(GatewayError::Persistence(inner)) if !err_is_not_found(inner) => {
            let mut chain = Vec::new();
            let mut source = inner.source();
            while let Some(cause) = source {
                chain.push(cause.to_string());
                source = cause.source();
            }
            error!(error = %inner, causes = ?chain, "Submission store failure");
            eprintln!(
                "The submission store could not complete the request. Please try again later."
            );
        }
        other => eprintln!("{}", other),
    }
}

fn err_is_not_found(err: &inquiry_core::PersistenceError) -> bool {
    err.kind() == inquiry_core::PersistenceErrorKind::NotFound
}

fn print_table(submissions: &[ContactSubmission]) {
    if submissions.is_empty() {
        println!("No submissions.");
        return;
    }

    for s in submissions {
        println!(
            "{:<36}  {:<7}  {}  {:<14}  {} <{}>  {}",
            s.id,
            s.status,
            s.created_at.format("%Y-%m-%d %H:%M"),
            s.inquiry_type,
            s.name,
            s.email,
            s.subject
        );
    }
}

fn print_detail(s: &ContactSubmission) {
    println!("ID:        {}", s.id);
    println!("Status:    {}", s.status);
    println!("Received:  {}", s.created_at.to_rfc3339());
    if let Some(updated_at) = s.updated_at {
        println!("Updated:   {}", updated_at.to_rfc3339());
    }
    println!("Name:      {}", s.name);
    if let Some(furigana) = &s.furigana {
        println!("Furigana:  {}", furigana);
    }
    println!("Email:     {}", s.email);
    println!("Phone:     {}", s.phone);
    println!("Type:      {}", s.inquiry_type);
    println!("Subject:   {}", s.subject);
    println!();
    println!("{}", s.message);
}
