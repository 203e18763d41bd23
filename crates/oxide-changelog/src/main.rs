//! oxide-changelog CLI
//!
//! Command-line tool for applying changesets to a database.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_changelog::engine::{render_rollback, RunOutcome};
use oxide_changelog::prelude::*;
use oxide_changelog_core::DialectRegistry;

/// Applies versioned changesets to a relational database exactly once.
#[derive(Parser)]
#[command(name = "oxide-changelog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL (`sqlite:`, `postgres://` or `mysql://`).
    #[arg(short, long, env = "DATABASE_URL")]
    url: Option<String>,

    /// JSON changelog file.
    #[arg(short, long, env = "OXIDE_CHANGELOG_FILE", default_value = "changelog.json")]
    changelog: PathBuf,

    /// Force a dialect by short name instead of detecting it.
    #[arg(long)]
    dialect: Option<String>,

    /// Tracking table name.
    #[arg(long)]
    tracking_table: Option<String>,

    /// Lock table name.
    #[arg(long)]
    lock_table: Option<String>,

    /// Schema holding the tracking and lock tables.
    #[arg(long)]
    schema: Option<String>,

    /// Seconds to wait for the lock.
    #[arg(long, default_value_t = 300)]
    lock_timeout: u64,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending changesets.
    Update {
        /// Active contexts (comma separated).
        #[arg(long, value_delimiter = ',')]
        contexts: Vec<String>,

        /// Treat modified changesets as already applied.
        #[arg(long)]
        ignore_checksums: bool,
    },

    /// Print the SQL an update would run.
    UpdateSql {
        /// Active contexts (comma separated).
        #[arg(long, value_delimiter = ',')]
        contexts: Vec<String>,
    },

    /// Show the state of every changeset.
    Status {
        /// Active contexts (comma separated).
        #[arg(long, value_delimiter = ',')]
        contexts: Vec<String>,
    },

    /// Validate the changelog without connecting.
    Validate,

    /// List applied changesets.
    History,

    /// Show who holds the lock.
    ListLocks,

    /// Release the lock whoever holds it.
    ReleaseLocks,

    /// Clear stored checksums so the next update recomputes them.
    ClearChecksums,

    /// Print the rollback SQL of a changeset.
    RollbackSql {
        /// Changeset id.
        id: String,

        /// Changeset author, when the id is ambiguous.
        #[arg(long)]
        author: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match &cli.command {
        Commands::Validate => {
            let changelog = load_changelog(&cli.changelog)?;
            let errors = changelog.validate();
            if errors.is_empty() {
                info!(changesets = changelog.changesets.len(), "Changelog is valid");
            } else {
                return Err(ChangelogError::Validation(errors).into());
            }
        }

        Commands::Update {
            contexts,
            ignore_checksums,
        } => {
            let changelog = load_changelog(&cli.changelog)?;
            let config = engine_config(&cli)
                .ignore_checksum_mismatch(*ignore_checksums)
                .contexts(contexts.clone());
            let mut engine = connect(&cli, config).await?;
            let report = engine.update(&changelog.changesets).await?;
            print_report(&report);
            report.into_result()?;
        }

        Commands::UpdateSql { contexts } => {
            let changelog = load_changelog(&cli.changelog)?;
            let config = engine_config(&cli).contexts(contexts.clone());
            let mut engine = connect(&cli, config).await?;
            for sql in engine.update_sql(&changelog.changesets).await? {
                println!("{sql}");
            }
        }

        Commands::Status { contexts } => {
            let changelog = load_changelog(&cli.changelog)?;
            let config = engine_config(&cli).contexts(contexts.clone());
            let mut engine = connect(&cli, config).await?;
            print_status(&engine.status(&changelog.changesets).await?);
        }

        Commands::History => {
            let mut engine = connect(&cli, engine_config(&cli)).await?;
            print_history(&engine.history().await?);
        }

        Commands::ListLocks => {
            let mut engine = connect(&cli, engine_config(&cli)).await?;
            match engine.list_locks().await? {
                Some(holder) => println!("Locked by {holder}"),
                None => println!("Not locked"),
            }
        }

        Commands::ReleaseLocks => {
            let mut engine = connect(&cli, engine_config(&cli)).await?;
            engine.release_locks().await?;
            info!("Lock released.");
        }

        Commands::ClearChecksums => {
            let mut engine = connect(&cli, engine_config(&cli)).await?;
            let cleared = engine.clear_checksums().await?;
            info!(cleared, "Checksums cleared.");
        }

        Commands::RollbackSql { id, author } => {
            for sql in rollback_sql(&cli, id, author.as_deref()).await? {
                println!("{sql};");
            }
        }
    }

    Ok(())
}

async fn rollback_sql(cli: &Cli, id: &str, author: Option<&str>) -> anyhow::Result<Vec<String>> {
    let changelog = load_changelog(&cli.changelog)?;
    let changeset = changelog
        .changesets
        .iter()
        .find(|cs| cs.id == id && author.iter().all(|author| cs.author == *author))
        .with_context(|| format!("No changeset with id '{id}' in the changelog"))?;
    let sql = match &cli.dialect {
        Some(name) => {
            let dialect = DialectRegistry::with_defaults().by_short_name(name)?;
            render_rollback(dialect.as_ref(), changeset)?
        }
        None => connect(cli, engine_config(cli))
            .await?
            .render_rollback(changeset)?,
    };
    Ok(sql)
}

fn load_changelog(path: &Path) -> anyhow::Result<ChangeLog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read changelog {}", path.display()))?;
    let mut changelog: ChangeLog = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse changelog {}", path.display()))?;
    if changelog.path.is_empty() {
        changelog.path = path.display().to_string();
    }
    changelog.resolve_paths();
    Ok(changelog)
}

fn engine_config(cli: &Cli) -> EngineConfig {
    let mut config = EngineConfig::new().lock(
        LockConfig::default().wait_timeout(Duration::from_secs(cli.lock_timeout)),
    );
    if let Some(table) = &cli.tracking_table {
        config = config.tracking_table(table.as_str());
    }
    if let Some(table) = &cli.lock_table {
        config = config.lock_table(table.as_str());
    }
    if let Some(schema) = &cli.schema {
        config = config.schema(schema.as_str());
    }
    config
}

async fn connect(cli: &Cli, config: EngineConfig) -> anyhow::Result<ChangesetEngine> {
    let url = cli
        .url
        .as_deref()
        .context("A database URL is required (--url or DATABASE_URL)")?;
    Ok(ChangesetEngine::connect(url, config, cli.dialect.as_deref()).await?)
}

fn print_status(statuses: &[ChangesetStatus]) {
    let pending = statuses
        .iter()
        .filter(|s| s.skip.is_none())
        .filter(|s| matches!(s.classification, Classification::Pending | Classification::Rerun))
        .count();
    println!("\n{pending} changeset(s) to run:");
    println!("{:-<60}", "");
    for status in statuses {
        match status.skip {
            Some(reason) => println!(" [-] {} (skipped: {reason})", status.key),
            None => println!(" [{}] {}", status.classification, status.key),
        }
    }
    println!();
}

fn print_history(records: &[TrackingRecord]) {
    if records.is_empty() {
        info!("No changesets have been applied yet.");
        return;
    }
    println!("\nApplied changesets:");
    println!("{:-<60}", "");
    for record in records {
        println!(
            " {:>4} {:<8} {} ({})",
            record.order_executed,
            record.exec_type.as_str(),
            record.key,
            record.date_executed.format("%Y-%m-%d %H:%M:%S")
        );
    }
    println!();
}

fn print_report(report: &RunReport) {
    let counts = &report.counts;
    info!(
        executed = counts.executed,
        reran = counts.reran,
        mark_ran = counts.mark_ran,
        previously_ran = counts.previously_ran,
        skipped = counts.skipped_total(),
        failed = counts.failed,
        deployment_id = %report.deployment_id,
        "Update summary"
    );
    for warning in &report.warnings {
        warn!("{warning}");
    }
    match &report.outcome {
        RunOutcome::Success => {}
        RunOutcome::Cancelled { next } => warn!(next = %next, "Update cancelled"),
        RunOutcome::HaltedOnPrecondition(halt)
        | RunOutcome::HaltedOnChecksumMismatch(halt)
        | RunOutcome::HaltedOnExecutionError(halt) => {
            warn!(
                changeset = %halt.changeset,
                statements_executed = halt.statements_executed,
                applied = report.applied.len(),
                "Update halted"
            );
        }
    }
}
