//! Musabaha admin console
//!
//! Terminal panels for approving subsequent payments and reviewing
//! estate registrations against the Musabaha REST backend.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

mod prompt;
mod render;

use clap::{Parser, Subcommand, ValueEnum};
use musabaha_client::{
    AlwaysConfirm, ApiClient, ClientError, ClientResult, Confirmer, Notification,
    NotificationLevel, Notifier, PaymentPanel, RemoteResource, ResourcePanel, TransitionOutcome,
    UsersPanel, WatchEvent, Watcher,
};
use musabaha_core::{
    ApprovalStatus, AssetResolver, Config, Credentials, PaymentRecord, RecordId, StatusFilter,
    UserRegistration,
};
use prompt::{StdinConfirmer, TerminalNotifier};
use render::ListView;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio::signal;
use tracing::{debug, info, warn};

/// Command line interface for the Musabaha admin console
#[derive(Debug, Parser)]
#[command(
    name = "musabaha-admin",
    version = env!("CARGO_PKG_VERSION"),
    about = "Approve payments and review registrations on the Musabaha backend"
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", env = "MUSABAHA_ADMIN_CONFIG")]
    config: Option<PathBuf>,

    /// Backend base URL (overrides config)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Bearer token for the registrations endpoints (overrides config)
    #[arg(long, value_name = "TOKEN")]
    token: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Enable structured JSON logging
    #[arg(long)]
    json: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Subsequent payment approval
    Payments {
        /// Payment subcommand
        #[command(subcommand)]
        action: PaymentCommands,
    },

    /// Registered user review
    Users {
        /// Registration subcommand
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Poll a list and report new records until Ctrl+C
    Watch {
        /// List to watch
        #[arg(value_enum)]
        target: WatchTarget,

        /// Seconds between polls (overrides config)
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
    },

    /// Configuration commands
    Config {
        /// Configuration subcommand
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Debug, Subcommand)]
enum PaymentCommands {
    /// List payments
    List {
        /// Only show payments with this status
        #[arg(short, long, default_value = "all", value_name = "all|pending|approved|rejected")]
        status: StatusFilter,
    },

    /// Show dashboard totals
    Stats,

    /// Approve a pending payment
    Approve {
        /// Payment ID
        id: RecordId,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Reject a pending payment
    Reject {
        /// Payment ID
        id: RecordId,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
enum UserCommands {
    /// List registrations
    List,

    /// Show every field of a registration
    Show {
        /// Registration ID
        id: RecordId,
    },

    /// List uploaded documents of a registration
    Docs {
        /// Registration ID
        id: RecordId,

        /// Check that each document is reachable
        #[arg(long)]
        check: bool,
    },

    /// Approve a registration
    Approve {
        /// Registration ID
        id: RecordId,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Reject a registration
    Reject {
        /// Registration ID
        id: RecordId,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Show resolved configuration
    Show,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum WatchTarget {
    /// Subsequent payments
    Payments,
    /// Registrations
    Users,
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        eprintln!("Note: .env file not loaded: {e}");
    }

    let cli = Cli::parse();
    let notifier = TerminalNotifier;

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            notifier.notify(&Notification::from_error(&e));
            return ExitCode::FAILURE;
        }
    };

    let _guard = match musabaha_core::init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            notifier.notify(&Notification::from_error(&e.into()));
            return ExitCode::FAILURE;
        }
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        base_url = config.base_url(),
        "Musabaha admin starting"
    );

    match run(cli.command, &config, &notifier).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(Failure(notification)) => {
            notifier.notify(&notification);
            ExitCode::FAILURE
        }
    }
}

/// A failed command, carrying the one notification that reports it
#[derive(Debug)]
struct Failure(Notification);

impl From<ClientError> for Failure {
    fn from(error: ClientError) -> Self {
        debug!(error = ?error, "Command failed");
        Self(Notification::from_error(&error))
    }
}

impl From<musabaha_core::Error> for Failure {
    fn from(error: musabaha_core::Error) -> Self {
        ClientError::from(error).into()
    }
}

type CommandResult = Result<(), Failure>;

/// Load configuration and apply command line overrides
fn load_config(cli: &Cli) -> ClientResult<Config> {
    let config = Config::load(cli.config.as_deref())?;
    resolve_config(config, cli)
}

/// Apply overrides, then validate the final values
fn resolve_config(mut config: Config, cli: &Cli) -> ClientResult<Config> {
    apply_overrides(&mut config, cli);
    config.validate()?;
    Ok(config)
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(base_url) = &cli.base_url {
        config.api.base_url.clone_from(base_url);
    }
    if let Some(token) = &cli.token {
        config.auth.token = Credentials::bearer(token.as_str());
    }
    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
    }
    if cli.json {
        config.logging.format = "json".to_string();
    }
}

async fn run(command: Commands, config: &Config, notifier: &dyn Notifier) -> CommandResult {
    let client = ApiClient::from_config(config)?;
    let assets = AssetResolver::new(config.asset_host());

    match command {
        Commands::Payments { action } => payments(action, client, &assets, notifier).await,
        Commands::Users { action } => users(action, client, &assets, notifier).await,
        Commands::Watch { target, interval } => {
            let period = Duration::from_secs(interval.unwrap_or(config.watch.poll_interval_seconds));
            match target {
                WatchTarget::Payments => {
                    watch(PaymentPanel::new(client), period, &assets, notifier).await
                }
                WatchTarget::Users => watch(UsersPanel::new(client), period, &assets, notifier).await,
            }
        }
        Commands::Config {
            action: ConfigCommands::Show,
        } => {
            println!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

async fn payments(
    action: PaymentCommands,
    client: ApiClient,
    assets: &AssetResolver,
    notifier: &dyn Notifier,
) -> CommandResult {
    let mut panel = PaymentPanel::new(client);
    load(&mut panel).await?;

    match action {
        PaymentCommands::List { status } => {
            let shown: Vec<&PaymentRecord> = panel.filtered(status).collect();
            if shown.is_empty() {
                println!("No payments found");
            } else {
                print!("{}", PaymentRecord::table(&shown, assets).render());
            }
            println!("{}", render::found_summary(shown.len()));
        }
        PaymentCommands::Stats => print!("{}", render::stats_block(&panel.stats())),
        PaymentCommands::Approve { id, yes } => {
            transition(&mut panel, &id, ApprovalStatus::Approved, yes, notifier).await?;
        }
        PaymentCommands::Reject { id, yes } => {
            transition(&mut panel, &id, ApprovalStatus::Rejected, yes, notifier).await?;
        }
    }
    Ok(())
}

async fn users(
    action: UserCommands,
    client: ApiClient,
    assets: &AssetResolver,
    notifier: &dyn Notifier,
) -> CommandResult {
    let mut panel = UsersPanel::new(client);
    load(&mut panel).await?;

    match action {
        UserCommands::List => {
            let shown: Vec<&UserRegistration> = panel.records().iter().collect();
            if shown.is_empty() {
                println!("No registrations found");
            } else {
                print!("{}", UserRegistration::table(&shown, assets).render());
            }
        }
        UserCommands::Show { id } => {
            let user = panel.find(&id).ok_or_else(|| ClientError::NotFound {
                resource: UserRegistration::NAME,
                id: id.clone(),
            })?;
            print!("{}", render::detail_table(user).render());
        }
        UserCommands::Docs { id, check } => {
            let links = panel.document_links(&id, assets)?;
            if links.is_empty() {
                println!("No documents uploaded");
                return Ok(());
            }
            let reachable = if check {
                let mut flags = Vec::with_capacity(links.len());
                for link in &links {
                    let found = match &link.url {
                        Some(url) => panel.client().asset_exists(url).await,
                        None => false,
                    };
                    flags.push(found);
                }
                Some(flags)
            } else {
                None
            };
            print!(
                "{}",
                render::documents_table(&links, reachable.as_deref()).render()
            );
        }
        UserCommands::Approve { id, yes } => {
            transition(&mut panel, &id, ApprovalStatus::Approved, yes, notifier).await?;
        }
        UserCommands::Reject { id, yes } => {
            transition(&mut panel, &id, ApprovalStatus::Rejected, yes, notifier).await?;
        }
    }
    Ok(())
}

/// Fetch the list, announcing the load on stderr
async fn load<R: RemoteResource>(panel: &mut ResourcePanel<R>) -> ClientResult<usize> {
    eprintln!("{}", R::LOADING_TEXT);
    panel.refresh().await
}

/// Confirm, apply and report one status change
async fn transition<R: RemoteResource>(
    panel: &mut ResourcePanel<R>,
    id: &RecordId,
    target: ApprovalStatus,
    skip_prompt: bool,
    notifier: &dyn Notifier,
) -> CommandResult {
    let confirmer: &dyn Confirmer = if skip_prompt {
        &AlwaysConfirm
    } else {
        &StdinConfirmer
    };
    report_transition(panel, id, target, confirmer, notifier).await
}

async fn report_transition<R: RemoteResource>(
    panel: &mut ResourcePanel<R>,
    id: &RecordId,
    target: ApprovalStatus,
    confirmer: &dyn Confirmer,
    notifier: &dyn Notifier,
) -> CommandResult {
    match panel.update_status(id, target, confirmer).await {
        Ok(TransitionOutcome::Declined) => {
            notifier.notify(&Notification::new(
                NotificationLevel::Info,
                "Cancelled",
                format!("{} {id} was not changed", R::LABEL),
            ));
            Ok(())
        }
        Ok(TransitionOutcome::Applied { refreshed: true }) => {
            notifier.notify(&Notification::transition_succeeded::<R>(target));
            Ok(())
        }
        Ok(TransitionOutcome::Applied { refreshed: false }) => {
            notifier.notify(&Notification::transition_unrefreshed::<R>(target));
            Ok(())
        }
        Err(e) if e.is_local() => Err(e.into()),
        Err(e) => {
            debug!(resource = R::NAME, %id, error = ?e, "Status change failed");
            let mut notification = Notification::transition_failed::<R>(target, &e);
            notification.body = format!("{} ({e})", notification.body);
            Err(Failure(notification))
        }
    }
}

/// Poll until Ctrl+C, printing records that appear
async fn watch<R>(
    panel: ResourcePanel<R>,
    period: Duration,
    assets: &AssetResolver,
    notifier: &dyn Notifier,
) -> CommandResult
where
    R: RemoteResource + ListView,
{
    info!(
        resource = R::NAME,
        interval_seconds = period.as_secs(),
        "Watching for new records. Press Ctrl+C to stop."
    );
    eprintln!("{}", R::LOADING_TEXT);
    let mut watcher = Watcher::spawn(panel, period);

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down gracefully");
                break;
            }
            event = watcher.next_event() => match event {
                Some(WatchEvent::NewRecords(records)) => {
                    notifier.notify(&Notification::new_records::<R>(records.len()));
                    let shown: Vec<&R> = records.iter().collect();
                    print!("{}", R::table(&shown, assets).render());
                }
                Some(WatchEvent::PollFailed(e)) => {
                    warn!(resource = R::NAME, error = %e, "Poll failed");
                    notifier.notify(&Notification::new(
                        NotificationLevel::Warning,
                        "Refresh failed",
                        e.to_string(),
                    ));
                }
                None => {
                    warn!(resource = R::NAME, "Watcher stopped");
                    break;
                }
            }
        }
    }

    watcher.shutdown().await;
    Ok(())
}
