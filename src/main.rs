use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use latest_installer::config::Settings;
use latest_installer::function::{self, InvocationArgs};
use latest_installer::input::read_json;
use latest_installer::logging::{self, LogFormat};
use latest_installer::storage::SpacesLister;
use latest_installer::tracking::configured_trackers;
use latest_installer::version::{Candidate, resolve_latest};

#[derive(Parser)]
#[command(name = "latest-installer")]
#[command(version, about = "Redirect to the latest installer in an S3-compatible bucket")]
struct Cli {
    /// Emit log records as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Write log records to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the function with invocation arguments and print its response
    Invoke {
        /// JSON file with invocation arguments (stdin when omitted)
        #[arg(long)]
        args: Option<PathBuf>,
    },

    /// Resolve the latest entry of a candidate list without contacting storage
    Pick {
        /// JSON array of {"key", "lastModified"} objects (stdin when omitted)
        #[arg(long)]
        candidates: Option<PathBuf>,

        /// Regular expression a key must contain a match for
        #[arg(long)]
        pattern: Option<String>,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    let _guard = logging::init(format, cli.log_file.as_deref())?;

    match cli.command {
        Command::Invoke { args } => tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?
            .block_on(invoke(args)),
        Command::Pick {
            candidates,
            pattern,
        } => pick(candidates, pattern),
    }
}

async fn invoke(args_path: Option<PathBuf>) -> anyhow::Result<ExitCode> {
    let args: InvocationArgs = read_json(args_path.as_deref())?;
    let settings = Settings::from_env()?;
    let lister = SpacesLister::from_settings(&settings);
    let trackers = configured_trackers(&settings);

    let response = function::handle(&args, &settings, &lister, &trackers).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(ExitCode::SUCCESS)
}

fn pick(candidates_path: Option<PathBuf>, pattern: Option<String>) -> anyhow::Result<ExitCode> {
    let candidates: Vec<Candidate> = read_json(candidates_path.as_deref())?;

    match resolve_latest(&candidates, pattern.as_deref())? {
        Some(winner) => {
            println!("{}", serde_json::to_string_pretty(&winner)?);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("No candidate matches");
            Ok(ExitCode::from(2))
        }
    }
}
