//! Argument parsing and command dispatch.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand, ValueEnum};
use sillage_api_models::VenueKind;
use tracing::{Instrument, info_span};
use uuid::Uuid;

use crate::client::{AppContext, CliResult, init_telemetry, load_config};
use crate::commands::{
    handle_collection_add, handle_collection_create, handle_collection_list,
    handle_collection_remove, handle_login, handle_logout, handle_profile_show,
    handle_profile_update, handle_recommend_create, handle_recommend_history,
    handle_recommend_show, handle_register, handle_search, handle_subscription,
};

/// Parses CLI arguments, executes the requested command, and reports
/// failures on stderr. Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let command_name = command_label(&cli.command);
    let trace_id = Uuid::new_v4().to_string();
    let span = info_span!("command", command = command_name, trace_id = %trace_id);

    match dispatch(cli).instrument(span).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli) -> CliResult<()> {
    let config = load_config(&cli)?;
    init_telemetry(&config);
    let ctx = AppContext::connect(&config, cli.output).await?;

    match cli.command {
        Command::Login(args) => handle_login(&ctx, args).await,
        Command::Register(args) => handle_register(&ctx, args).await,
        Command::Logout => handle_logout(&ctx).await,
        Command::Profile(profile) => match profile {
            ProfileCommand::Show => handle_profile_show(&ctx).await,
            ProfileCommand::Update(args) => handle_profile_update(&ctx, args).await,
            ProfileCommand::Subscription => handle_subscription(&ctx).await,
        },
        Command::Search(args) => handle_search(&ctx, args).await,
        Command::Collection(collection) => match collection {
            CollectionCommand::List => handle_collection_list(&ctx).await,
            CollectionCommand::Add(args) => handle_collection_add(&ctx, args).await,
            CollectionCommand::Remove(args) => handle_collection_remove(&ctx, args).await,
            CollectionCommand::Create(args) => handle_collection_create(&ctx, args).await,
        },
        Command::Recommend(recommend) => match recommend {
            RecommendCommand::Create(args) => handle_recommend_create(&ctx, args).await,
            RecommendCommand::History(args) => handle_recommend_history(&ctx, args).await,
            RecommendCommand::Show(args) => handle_recommend_show(&ctx, args).await,
        },
    }
}

#[derive(Parser)]
#[command(
    name = "sillage",
    version,
    about = "Manage a Sillage perfume collection from the terminal"
)]
pub(crate) struct Cli {
    #[arg(long, global = true, env = "SILLAGE_API_URL", help = "API base URL")]
    pub(crate) api_url: Option<String>,
    #[arg(
        long,
        global = true,
        env = "SILLAGE_HTTP_TIMEOUT_SECS",
        help = "Request timeout in seconds"
    )]
    pub(crate) timeout: Option<u64>,
    #[arg(
        long,
        global = true,
        env = "SILLAGE_STATE_DIR",
        help = "Directory holding the saved session"
    )]
    pub(crate) state_dir: Option<PathBuf>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    pub(crate) output: OutputFormat,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Sign in and remember the session on this device.
    Login(LoginArgs),
    /// Create an account and sign in.
    Register(RegisterArgs),
    /// Sign out and forget the saved session.
    Logout,
    /// Show or edit the signed-in profile.
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Search the perfume catalogue.
    Search(SearchArgs),
    /// Manage the personal collection.
    #[command(subcommand)]
    Collection(CollectionCommand),
    /// Request and browse event recommendations.
    #[command(subcommand)]
    Recommend(RecommendCommand),
}

#[derive(Args)]
pub(crate) struct LoginArgs {
    #[arg(long, alias = "email", help = "Account email")]
    pub(crate) username: Option<String>,
    #[arg(long, help = "Password; prompted without echo when omitted")]
    pub(crate) password: Option<String>,
}

#[derive(Args)]
pub(crate) struct RegisterArgs {
    #[arg(long)]
    pub(crate) email: String,
    #[arg(long)]
    pub(crate) first_name: String,
    #[arg(long)]
    pub(crate) last_name: String,
    #[arg(long, help = "Password; prompted without echo when omitted")]
    pub(crate) password: Option<String>,
}

#[derive(Subcommand)]
pub(crate) enum ProfileCommand {
    /// Print the profile, refreshed from the server when reachable.
    Show,
    /// Change name and/or password.
    Update(ProfileUpdateArgs),
    /// Print the subscription status.
    Subscription,
}

#[derive(Args)]
pub(crate) struct ProfileUpdateArgs {
    #[arg(long)]
    pub(crate) first_name: Option<String>,
    #[arg(long)]
    pub(crate) last_name: Option<String>,
    #[arg(long, help = "Prompt for a new password")]
    pub(crate) change_password: bool,
}

#[derive(Args)]
pub(crate) struct SearchArgs {
    pub(crate) query: String,
    #[arg(long)]
    pub(crate) brand: Option<String>,
    #[arg(long)]
    pub(crate) accord: Option<String>,
    #[arg(long)]
    pub(crate) limit: Option<u32>,
}

#[derive(Subcommand)]
pub(crate) enum CollectionCommand {
    /// List the perfumes in the collection.
    List,
    /// Add a catalogue perfume by id.
    Add(PerfumeIdArgs),
    /// Remove a perfume by id after confirmation.
    Remove(RemoveArgs),
    /// Create a catalogue perfume and add it to the collection.
    Create(CreateArgs),
}

#[derive(Args)]
pub(crate) struct PerfumeIdArgs {
    pub(crate) id: i64,
}

#[derive(Args)]
pub(crate) struct RemoveArgs {
    pub(crate) id: i64,
    #[arg(long, short = 'y', help = "Skip the confirmation prompt")]
    pub(crate) yes: bool,
}

#[derive(Args)]
pub(crate) struct CreateArgs {
    #[arg(long)]
    pub(crate) name: String,
    #[arg(long)]
    pub(crate) brand: String,
    #[arg(long)]
    pub(crate) perfumer: Option<String>,
    #[arg(long, default_value = "", help = "Comma-separated notes")]
    pub(crate) notes: String,
    #[arg(long, default_value = "", help = "Comma-separated accords")]
    pub(crate) accords: String,
}

#[derive(Subcommand)]
pub(crate) enum RecommendCommand {
    /// Ask for a perfume suited to an upcoming event.
    Create(RecommendCreateArgs),
    /// List recent recommendations.
    History(HistoryArgs),
    /// Show one recommendation.
    Show(RecommendationIdArgs),
}

#[derive(Args)]
pub(crate) struct RecommendCreateArgs {
    #[arg(long, value_parser = parse_date, help = "Event date (YYYY-MM-DD)")]
    pub(crate) date: NaiveDate,
    #[arg(long, value_parser = parse_time, help = "Event time (HH:MM)")]
    pub(crate) time: NaiveTime,
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) latitude: f64,
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) longitude: f64,
    #[arg(long)]
    pub(crate) venue: String,
    #[arg(long, value_parser = parse_venue_kind, help = "open or closed")]
    pub(crate) venue_kind: VenueKind,
    #[arg(long)]
    pub(crate) venue_description: String,
    #[arg(long)]
    pub(crate) occasion: String,
    #[arg(long)]
    pub(crate) expectation: String,
    #[arg(long)]
    pub(crate) attire: String,
}

#[derive(Args)]
pub(crate) struct HistoryArgs {
    #[arg(long)]
    pub(crate) limit: Option<u32>,
}

#[derive(Args)]
pub(crate) struct RecommendationIdArgs {
    pub(crate) id: i64,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|err| format!("expected YYYY-MM-DD: {err}"))
}

fn parse_time(value: &str) -> Result<NaiveTime, String> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|err| format!("expected HH:MM: {err}"))
}

fn parse_venue_kind(value: &str) -> Result<VenueKind, String> {
    VenueKind::parse(value).ok_or_else(|| "expected `open` or `closed`".to_string())
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Login(_) => "login",
        Command::Register(_) => "register",
        Command::Logout => "logout",
        Command::Profile(ProfileCommand::Show) => "profile_show",
        Command::Profile(ProfileCommand::Update(_)) => "profile_update",
        Command::Profile(ProfileCommand::Subscription) => "profile_subscription",
        Command::Search(_) => "search",
        Command::Collection(CollectionCommand::List) => "collection_list",
        Command::Collection(CollectionCommand::Add(_)) => "collection_add",
        Command::Collection(CollectionCommand::Remove(_)) => "collection_remove",
        Command::Collection(CollectionCommand::Create(_)) => "collection_create",
        Command::Recommend(RecommendCommand::Create(_)) => "recommend_create",
        Command::Recommend(RecommendCommand::History(_)) => "recommend_history",
        Command::Recommend(RecommendCommand::Show(_)) => "recommend_show",
    }
}
