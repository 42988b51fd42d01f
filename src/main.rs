//! Screener CLI
//!
//! Usage:
//!   screener --serve --file evidence.json          # HTTP API over a collection
//!   screener --review --server http://host:3000    # Interactive terminal review
//!   screener --status --file evidence.json         # Screening progress
//!   screener --status --file evidence.json --json  # Progress as JSON

use clap::Parser;
use colored::Colorize;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use screener::core::{run_server, EvidenceCollection, EvidenceStore, FillPolicy, ReviewSession, SyncClient, SyncState, ToggleOutcome, ViewState};
use screener::types::{Criterion, EvidenceId, NavAction, ScreenError};
use screener::{DEFAULT_ADDR, DEFAULT_LOG_FILTER, DEFAULT_SERVER_URL, VERSION};

#[derive(Parser, Debug)]
#[command(
    name = "screener",
    version = VERSION,
    about = "Screen evidence items against inclusion/exclusion criteria",
    long_about = "Screener records, per evidence item, which exclusion reasons apply.\n\
                  An item is included iff no exclusion reason applies.\n\n\
                  Modes:\n  \
                  --serve   HTTP API over a JSON evidence collection\n  \
                  --review  Interactive terminal review against a running server\n  \
                  --status  Screening progress of a collection file"
)]
struct Args {
    /// Run as HTTP API server
    #[arg(long)]
    serve: bool,

    /// Interactive review against a running server
    #[arg(long)]
    review: bool,

    /// Print screening progress of the collection file
    #[arg(long)]
    status: bool,

    /// Evidence collection (JSON)
    #[arg(short, long, env = "SCREENER_FILE", default_value = "evidence.json")]
    file: String,

    /// Criteria file (JSON); the built-in criteria are used if absent
    #[arg(long, env = "SCREENER_CRITERIA")]
    criteria: Option<String>,

    /// When an item counts as filled: any-decision | all-visited
    #[arg(long, env = "SCREENER_FILL_POLICY", default_value = "any-decision")]
    fill_policy: FillPolicy,

    /// Address to listen on (serve mode)
    #[arg(long, env = "SCREENER_ADDR", default_value = DEFAULT_ADDR)]
    addr: String,

    /// Server URL (review mode)
    #[arg(long, env = "SCREENER_SERVER", default_value = DEFAULT_SERVER_URL)]
    server: String,

    /// Start reviewing at this id instead of the first unfilled item
    #[arg(long)]
    start: Option<String>,

    /// Stay on an item after it is decided
    #[arg(long)]
    no_advance: bool,

    /// Per-request timeout in seconds (review mode)
    #[arg(long, env = "SCREENER_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Output JSON (status mode)
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging();

    if args.no_color {
        colored::control::set_override(false);
    }

    let result = if args.serve {
        run_serve(&args).await
    } else if args.review {
        run_review(&args).await
    } else if args.status {
        run_status(&args)
    } else {
        // Default to status if no mode specified
        run_status(&args)
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_criteria(args: &Args) -> Result<Vec<Criterion>, ScreenError> {
    match &args.criteria {
        Some(path) => Criterion::load_all(path),
        None => Ok(Criterion::defaults()),
    }
}

fn open_store(args: &Args) -> Result<EvidenceStore, ScreenError> {
    EvidenceStore::open(&args.file, load_criteria(args)?, args.fill_policy)
}

/// Run HTTP API server
async fn run_serve(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(args)?;
    println!();
    println!("{}", format!("Screener API {}", VERSION).bold());
    println!("  collection: {} ({} items, {} filled)", args.file, store.len(), store.filled_count());
    println!("  fill policy: {}", store.policy());
    println!();
    run_server(&args.addr, store).await
}

/// Print screening progress
fn run_status(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    #[derive(serde::Serialize)]
    struct Progress {
        items: usize,
        filled: usize,
        included: usize,
        excluded: usize,
        reasons: BTreeMap<String, usize>,
    }

    let store = open_store(args)?;
    let mut progress = Progress {
        items: store.len(),
        filled: store.filled_count(),
        included: 0,
        excluded: 0,
        reasons: BTreeMap::new(),
    };
    for id in store.ordered_ids() {
        let item = store.item(&id)?;
        if !store.is_filled(&id) {
            continue;
        }
        if item.include() {
            progress.included += 1;
        } else {
            progress.excluded += 1;
        }
        for reason in item.exclude_reasons() {
            *progress.reasons.entry(reason.clone()).or_default() += 1;
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&progress)?);
        return Ok(());
    }

    println!("{} {}", "Collection:".bold(), args.file);
    println!("  filled:   {}/{}", progress.filled, progress.items);
    println!("  included: {}", progress.included.to_string().green());
    println!("  excluded: {}", progress.excluded.to_string().red());
    if !progress.reasons.is_empty() {
        println!("{}", "Exclusion reasons:".bold());
        for (reason, count) in &progress.reasons {
            println!("  {:>5}  {}", count, reason);
        }
    }
    Ok(())
}

/// Interactive review against a running server
async fn run_review(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let client = SyncClient::with_timeout(&args.server, args.timeout_secs.map(Duration::from_secs))?;
    let start = args.start.as_deref().map(|s| EvidenceId::from(s.trim()));
    let mut session = ReviewSession::start(client, start).await?;
    if args.no_advance {
        session = session.without_auto_advance();
    }

    print_help();
    print_view(&session.view().await, session.criteria());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line {
            "q" | "quit" | "exit" => break,
            "?" | "h" | "help" => {
                print_help();
                continue;
            }
            "r" => report_nav(session.refresh().await, session.criteria()),
            "n" => report_nav(session.navigate(&NavAction::Next).await, session.criteria()),
            "p" => report_nav(session.navigate(&NavAction::Prev).await, session.criteria()),
            "f" => report_nav(session.navigate(&NavAction::First).await, session.criteria()),
            "l" => report_nav(session.navigate(&NavAction::Last).await, session.criteria()),
            "u" => report_nav(session.navigate(&NavAction::NextUnfilled).await, session.criteria()),
            "U" => report_nav(session.navigate(&NavAction::FirstUnfilled).await, session.criteria()),
            _ if line.starts_with("g ") => {
                let target = EvidenceId::from(line[2..].trim());
                report_nav(session.navigate(&NavAction::Goto(target)).await, session.criteria());
            }
            _ => match line.parse::<usize>() {
                Ok(n) if n >= 1 && n <= session.criteria().len() => {
                    let criterion = session.criteria()[n - 1].clone();
                    let view = session.view().await;
                    let checked = criterion.is_checked(view.displayed.exclude_reasons());
                    match session.toggle(&criterion, !checked).await {
                        Ok(outcome) => report_toggle(&outcome),
                        Err(e) => println!("{} {} (not saved)", "✗".red(), e),
                    }
                    print_view(&session.view().await, session.criteria());
                }
                _ => println!("unknown command '{}', type ? for help", line),
            },
        }
    }

    println!("\nSession ended.");
    Ok(())
}

fn report_nav(result: Result<ViewState, ScreenError>, criteria: &[Criterion]) {
    match result {
        Ok(view) => print_view(&view, criteria),
        Err(ScreenError::NotFound(id)) => println!("{} no evidence with id {}", "✗".red(), id),
        Err(e) => println!("{} {}", "✗".red(), e),
    }
}

fn report_toggle(outcome: &ToggleOutcome) {
    match outcome {
        ToggleOutcome::Stayed(_) => println!("{} saved", "✓".green()),
        ToggleOutcome::Advanced { decided, .. } => {
            println!("{} saved {} - moving to next unfilled", "✓".green(), decided.id())
        }
        ToggleOutcome::AllFilled(_) => println!("{} saved - every item is filled", "✓".green().bold()),
        ToggleOutcome::AdvanceFailed { error, .. } => {
            println!("{} saved, but could not move on: {}", "✓".green(), error)
        }
    }
}

fn print_view(view: &ViewState, criteria: &[Criterion]) {
    let item = &view.displayed;
    let status = if item.include() {
        "INCLUDE".green().bold()
    } else {
        "EXCLUDE".red().bold()
    };

    println!();
    println!("[{}] {}", item.id().to_string().cyan(), item.title().unwrap_or("<untitled>").bold());
    for key in ["publicationVenue", "publishedAt", "doi", "url"] {
        if let Some(value) = item.payload().get(key).and_then(|v| v.as_str()) {
            println!("  {}: {}", key, value.dimmed());
        }
    }
    println!("  status: {}", status);
    if let SyncState::Unconfirmed(reason) = &view.sync {
        println!("  {}", format!("UNSAVED: {}", reason).yellow());
    }
    if view.all_filled {
        println!("  {}", "all items are filled".green());
    }
    for (i, criterion) in criteria.iter().enumerate() {
        let mark = if criterion.is_checked(item.exclude_reasons()) { "x" } else { " " };
        println!("  {:>2}. [{}] ({}) {}", i + 1, mark, criterion.criterion_type, criterion.label);
    }
}

fn print_help() {
    println!("Commands:");
    println!("  <n>     toggle criterion n");
    println!("  n / p   next / previous item");
    println!("  f / l   first / last item");
    println!("  u / U   next unfilled / first unfilled item");
    println!("  g <id>  go to item");
    println!("  r       reload current item (drops unsaved changes)");
    println!("  q       quit");
}
