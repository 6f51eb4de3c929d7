//! anon: IDIS anonymization web API client
//!
//! Works on the batch, mapping and file selection of the current folder.

use std::path::PathBuf;
use std::process::ExitCode;

use anonapi::{
    commands::{self, AssumeYes, Confirm, Context},
    error::{AppError, Result},
    models::JobBatch,
    services::{JobApi, WebApiClient},
    storage::BatchStore,
};
use clap::{Parser, Subcommand};

/// anon - create and follow anonymization jobs
#[derive(Parser, Debug)]
#[command(
    name = "anon",
    version,
    about = "Client for the IDIS anonymization web API"
)]
struct Cli {
    /// Settings file (default: ~/AnonWebAPIClientSettings.toml)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Work on this folder instead of the current one
    #[arg(short = 'C', long, global = true)]
    dir: Option<PathBuf>,

    /// Answer yes to every confirmation
    #[arg(short, long, global = true)]
    yes: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage anonymization servers
    #[command(subcommand)]
    Server(ServerCommand),

    /// Single jobs on the active server
    #[command(subcommand)]
    Job(JobCommand),

    /// The batch of jobs in the current folder
    #[command(subcommand)]
    Batch(BatchCommand),

    /// The mapping in the current folder
    #[command(subcommand)]
    Map(MapCommand),

    /// The file selection in the current folder
    #[command(subcommand)]
    Select(SelectCommand),

    /// Create jobs
    #[command(subcommand)]
    Create(CreateCommand),

    /// User name, token and other settings
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Subcommand, Debug)]
enum ServerCommand {
    /// Show all servers
    List,
    /// Add a server
    Add { name: String, url: String },
    /// Remove a server
    Remove { name: String },
    /// Make a server the active one
    Activate { name: String },
    /// Check whether a server is online
    Status { name: Option<String> },
    /// Show the most recent jobs on a server
    Jobs { name: Option<String> },
}

#[derive(Subcommand, Debug)]
enum JobCommand {
    /// Show info on one job
    Info { job_id: String },
    /// Show extended info on jobs; accepts ranges like 5-7
    List {
        #[arg(required = true)]
        job_ids: Vec<String>,
    },
    /// Cancel a job
    Cancel { job_id: String },
    /// Reset a job so it runs again
    Reset { job_id: String },
}

#[derive(Subcommand, Debug)]
enum BatchCommand {
    /// Start an empty batch for the active server
    Init {
        /// Replace an existing batch
        #[arg(long)]
        overwrite: bool,
    },
    /// Show the batch
    Info,
    /// Delete the batch file
    Delete,
    /// Add job IDs; accepts ranges like 5-7
    Add {
        #[arg(required = true)]
        job_ids: Vec<String>,
    },
    /// Remove job IDs; accepts ranges like 5-7
    Remove {
        #[arg(required = true)]
        job_ids: Vec<String>,
    },
    /// Status of every job in the batch
    Status {
        /// Also show the pseudonym used by each job
        #[arg(long)]
        patient_name: bool,
        /// Only show counts per status
        #[arg(long)]
        summary: bool,
    },
    /// Cancel every job in the batch
    Cancel,
    /// Reset every job in the batch
    Reset,
    /// Reset jobs in the batch that have status ERROR
    ResetError,
}

#[derive(Subcommand, Debug)]
enum MapCommand {
    /// Write an example mapping
    Init {
        /// Replace an existing mapping
        #[arg(long)]
        overwrite: bool,
    },
    /// Show the mapping
    Status,
    /// Delete the mapping
    Delete,
    /// Add a row per folder
    AddFolder {
        #[arg(required = true)]
        folders: Vec<String>,
    },
    /// Add a row per accession number
    AddAccessionNumbers {
        #[arg(required = true)]
        numbers: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum SelectCommand {
    /// Add files matching a pattern like '*.dcm'
    Add {
        pattern: String,
        /// Only look in the current folder, not below it
        #[arg(long)]
        no_recurse: bool,
    },
    /// Show the selection
    Status,
    /// Delete the selection
    Delete,
}

#[derive(Subcommand, Debug)]
enum CreateCommand {
    /// Create a job for every row in the mapping
    FromMapping {
        /// Validate and show what would be created, but send nothing
        #[arg(long)]
        dry_run: bool,
    },
    /// Set project and destination for jobs whose mapping does not name them
    SetDefaults {
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        destination: Option<String>,
    },
    /// Show the defaults
    ShowDefaults,
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
    /// Show settings
    Show,
    /// Set the user name sent to servers
    User { name: String },
    /// Set the API token sent to servers
    Token { token: String },
}

/// Asks on the terminal.
struct Prompt;

impl Confirm for Prompt {
    fn confirm(&self, question: &str) -> Result<bool> {
        dialoguer::Confirm::new()
            .with_prompt(question)
            .default(false)
            .interact()
            .map_err(|e| AppError::Io(std::io::Error::other(e)))
    }
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// The folder's batch and a client for the server it belongs to.
async fn batch_api(ctx: &Context) -> Result<(WebApiClient, JobBatch)> {
    let batch = ctx.batch_folder().load().await?;
    let api = ctx.api_for(&batch.server)?;
    log::debug!("Batch server is {}", api.server());
    Ok((api, batch))
}

async fn run(cli: Cli) -> Result<String> {
    let current_dir = match cli.dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let mut ctx = Context::load(cli.settings, current_dir)?;
    let confirm: &dyn Confirm = if cli.yes { &AssumeYes } else { &Prompt };

    match cli.command {
        Command::Server(cmd) => match cmd {
            ServerCommand::List => Ok(commands::server::list(&ctx)),
            ServerCommand::Add { name, url } => commands::server::add(&mut ctx, &name, &url),
            ServerCommand::Remove { name } => commands::server::remove(&mut ctx, &name),
            ServerCommand::Activate { name } => commands::server::activate(&mut ctx, &name),
            ServerCommand::Status { name } => {
                let api = ctx.api_for(&ctx.server_or_active(name.as_deref())?)?;
                commands::server::status(&api).await
            }
            ServerCommand::Jobs { name } => {
                let api = ctx.api_for(&ctx.server_or_active(name.as_deref())?)?;
                commands::server::jobs(&api, ctx.settings.client.job_list_limit).await
            }
        },

        Command::Job(cmd) => {
            let api = ctx.api_for(&ctx.active_server()?)?;
            match cmd {
                JobCommand::Info { job_id } => commands::job::info(&api, &job_id).await,
                JobCommand::List { job_ids } => commands::job::list(&api, &job_ids).await,
                JobCommand::Cancel { job_id } => {
                    commands::job::cancel(&api, &job_id, confirm).await
                }
                JobCommand::Reset { job_id } => commands::job::reset(&api, &job_id, confirm).await,
            }
        }

        Command::Batch(cmd) => match cmd {
            BatchCommand::Init { overwrite } => commands::batch::init(&ctx, overwrite).await,
            BatchCommand::Info => commands::batch::info(&ctx).await,
            BatchCommand::Delete => commands::batch::delete(&ctx, confirm).await,
            BatchCommand::Add { job_ids } => commands::batch::add(&ctx, &job_ids).await,
            BatchCommand::Remove { job_ids } => commands::batch::remove(&ctx, &job_ids).await,
            BatchCommand::Status {
                patient_name,
                summary,
            } => {
                let (api, batch) = batch_api(&ctx).await?;
                commands::batch::status(&api, &batch, patient_name, summary).await
            }
            BatchCommand::Cancel => {
                let (api, batch) = batch_api(&ctx).await?;
                commands::batch::cancel(&api, &batch, confirm).await
            }
            BatchCommand::Reset => {
                let (api, batch) = batch_api(&ctx).await?;
                commands::batch::reset(&api, &batch, confirm).await
            }
            BatchCommand::ResetError => {
                let (api, batch) = batch_api(&ctx).await?;
                commands::batch::reset_error(&api, &batch, confirm).await
            }
        },

        Command::Map(cmd) => match cmd {
            MapCommand::Init { overwrite } => commands::map::init(&ctx, overwrite).await,
            MapCommand::Status => commands::map::status(&ctx).await,
            MapCommand::Delete => commands::map::delete(&ctx, confirm).await,
            MapCommand::AddFolder { folders } => commands::map::add_folders(&ctx, &folders).await,
            MapCommand::AddAccessionNumbers { numbers } => {
                commands::map::add_accession_numbers(&ctx, &numbers).await
            }
        },

        Command::Select(cmd) => match cmd {
            SelectCommand::Add {
                pattern,
                no_recurse,
            } => commands::select::add(&ctx, &pattern, !no_recurse).await,
            SelectCommand::Status => commands::select::status(&ctx).await,
            SelectCommand::Delete => commands::select::delete(&ctx, confirm).await,
        },

        Command::Create(cmd) => match cmd {
            CreateCommand::FromMapping { dry_run } => {
                let api = ctx.api_for(&ctx.active_server()?)?;
                commands::create::from_mapping(&ctx, &api, dry_run, confirm).await
            }
            CreateCommand::SetDefaults {
                project,
                destination,
            } => commands::create::set_defaults(&mut ctx, project, destination),
            CreateCommand::ShowDefaults => Ok(commands::create::show_defaults(&ctx)),
        },

        Command::Settings(cmd) => match cmd {
            SettingsCommand::Show => Ok(commands::settings::show(&ctx)),
            SettingsCommand::User { name } => commands::settings::set_user(&mut ctx, &name),
            SettingsCommand::Token { token } => commands::settings::set_token(&mut ctx, &token),
        },
    }
}
