mod config;
mod db;
mod extract;
mod fetch;
mod notify;

use std::path::{Path, PathBuf};

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(name = "be_covid_scraper", about = "Canton Bern COVID-19 case scraper")]
struct Cli {
    /// SQLite database path
    #[arg(long, global = true, default_value = db::DEFAULT_DB_PATH)]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the canton page, record today's figures, fire the dispatch
    Run {
        /// Never send the repository dispatch
        #[arg(long)]
        no_notify: bool,
        /// Fail instead of skipping when dispatch credentials are missing
        #[arg(long, conflicts_with = "no_notify")]
        require_notify: bool,
    },
    /// Extract an observation from a saved HTML file and print it as JSON
    Parse {
        /// Page snapshot to parse
        file: PathBuf,
    },
    /// Backfill the figures published before this scraper existed
    Seed,
    /// Print recorded observations, newest first
    Show {
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "30")]
        limit: usize,
    },
    /// Recording statistics
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            no_notify,
            require_notify,
        } => run(&cli.db, no_notify, require_notify).await,
        Commands::Parse { file } => {
            let html = std::fs::read_to_string(&file)?;
            let obs = extract::extract_observation(&html)?;
            println!("{}", serde_json::to_string_pretty(&obs)?);
            Ok(())
        }
        Commands::Seed => {
            let conn = db::connect(&cli.db)?;
            db::init_schema(&conn)?;
            let inserted = db::seed_history(&conn)?;
            println!("Seeded {} historical rows", inserted);
            Ok(())
        }
        Commands::Show { limit } => {
            let conn = db::connect(&cli.db)?;
            db::init_schema(&conn)?;
            let rows = db::fetch_recent(&conn, limit)?;
            if rows.is_empty() {
                println!("No observations recorded yet.");
                return Ok(());
            }

            println!(
                "{:<12} | {:<4} | {:>9} | {:>8}",
                "Date", "Area", "Confirmed", "Deceased"
            );
            println!("{}", "-".repeat(42));
            for o in &rows {
                println!(
                    "{:<12} | {:<4} | {:>9} | {:>8}",
                    o.date.to_string(),
                    o.region,
                    fmt_count(o.confirmed),
                    fmt_count(o.deceased)
                );
            }
            println!("\n{} observations", rows.len());
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect(&cli.db)?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("Rows:  {}", s.rows);
            println!("First: {}", fmt_date(s.first_date));
            println!("Last:  {}", fmt_date(s.last_date));
            Ok(())
        }
    }
}

/// The whole pipeline: fetch → extract → record → notify. The connection is
/// scoped to this call and closed on every exit path when it drops.
async fn run(db_path: &Path, no_notify: bool, require_notify: bool) -> anyhow::Result<()> {
    let conn = db::connect(db_path)?;
    db::init_schema(&conn)?;

    let html = fetch::fetch_page(fetch::START_URL).await?;
    let obs = extract::extract_observation(&html)?;

    match db::insert_observation(&conn, &obs)? {
        db::InsertOutcome::Inserted => {
            println!(
                "Recorded {}: {} confirmed, {} deceased",
                obs.date,
                fmt_count(obs.confirmed),
                fmt_count(obs.deceased)
            );
        }
        db::InsertOutcome::AlreadyRecorded => {
            println!("Data for {} has already been recorded", obs.date);
        }
    }

    if no_notify {
        return Ok(());
    }
    match config::NotifyConfig::from_env() {
        Some(cfg) => notify::dispatch(&cfg).await?,
        None if require_notify => bail!(
            "Dispatch credentials missing; set {}, {} and {}",
            config::USER_VAR,
            config::TOKEN_VAR,
            config::REPO_VAR
        ),
        None => info!("Dispatch skipped (no credentials configured)"),
    }
    Ok(())
}

fn fmt_count(v: Option<i64>) -> String {
    v.map(|n| n.to_string()).unwrap_or_else(|| "-".into())
}

fn fmt_date(d: Option<chrono::NaiveDate>) -> String {
    d.map(|d| d.to_string()).unwrap_or_else(|| "-".into())
}
