//! terp CLI
//!
//! Shell access to the course-review admin utilities.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use terp_core::constants::{ADMIN_URL_ENV, WEBHOOK_URL_ENV};
use terp_core::types::{recent_semesters, semester_number, AdminAction, PendingCounts, Semester};
use terp_core::slug_in_use_err;
use terp_webhook::{SendOutcome, UpdatesWebhook};

use crate::config::{load_dotenv, NotifySettings};

/// terp - course-review admin utilities
#[derive(Parser)]
#[command(name = "terp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert between semester numbers and names
    Semester {
        #[command(subcommand)]
        command: SemesterCommand,
    },

    /// List admin moderation action codes
    Actions,

    /// Print the slug-conflict message for a professor edit
    SlugConflict {
        /// Slug that was requested
        slug: String,
        /// Name of the professor already using it
        name: String,
    },

    /// Post the moderation-queue summary to the updates webhook
    Notify {
        /// Number of unverified professors
        #[arg(long, default_value = "0")]
        professors: u64,
        /// Number of unverified reviews
        #[arg(long, default_value = "0")]
        reviews: u64,
        /// Leave professors out of the summary
        #[arg(long)]
        skip_professors: bool,
        /// Leave reviews out of the summary
        #[arg(long)]
        skip_reviews: bool,
        /// Absolute URL of the admin page
        #[arg(long, env = ADMIN_URL_ENV)]
        admin_url: Option<String>,
        /// Webhook endpoint
        #[arg(long, env = WEBHOOK_URL_ENV, hide_env_values = true)]
        webhook_url: Option<String>,
        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
}

#[derive(Subcommand)]
enum SemesterCommand {
    /// Semester numbers to names (202012 -> Winter 2021)
    Name {
        /// One or more semester numbers
        #[arg(required = true)]
        numbers: Vec<String>,
    },
    /// Semester name to number (Winter 2021 -> 202012)
    Number {
        /// Season and year, e.g. `Fall 2020`
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
    /// List recently offered semesters
    Recent {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "terp=debug,info"
    } else {
        "terp=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Semester { command } => cmd_semester(command),
        Commands::Actions => cmd_actions(),
        Commands::SlugConflict { slug, name } => cmd_slug_conflict(&slug, &name),
        Commands::Notify {
            professors,
            reviews,
            skip_professors,
            skip_reviews,
            admin_url,
            webhook_url,
            timeout,
        } => {
            let settings =
                NotifySettings::resolve(webhook_url, admin_url, timeout, skip_professors, skip_reviews)?;
            cmd_notify(settings, PendingCounts::new(professors, reviews)).await
        }
    }
}

fn cmd_semester(command: SemesterCommand) -> Result<()> {
    match command {
        SemesterCommand::Name { numbers } => {
            for (number, name) in numbers.iter().zip(semester_names(&numbers)?) {
                println!("{} {} {}", number.dimmed(), "→".dimmed(), name.green());
            }
        }
        SemesterCommand::Number { name } => {
            let name = name.join(" ");
            let number = semester_number(&name).context("Failed to parse semester name")?;
            println!("{} {} {}", name.dimmed(), "→".dimmed(), number.green());
        }
        SemesterCommand::Recent { json } => {
            let recent = recent_semesters()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&recent)?);
            } else {
                println!("{}", "Recent semesters:".cyan().bold());
                for semester in recent {
                    println!("   {} {}", semester.number().dimmed(), semester.name());
                }
            }
        }
    }
    Ok(())
}

/// Converts every number before anything is printed, so a bad argument
/// produces no partial output.
fn semester_names(numbers: &[String]) -> Result<Vec<String>> {
    numbers
        .iter()
        .map(|number| {
            Semester::from_number(number)
                .map(|s| s.name())
                .with_context(|| format!("Failed to convert {number}"))
        })
        .collect()
}

fn cmd_actions() -> Result<()> {
    println!("{}", "Review actions:".cyan().bold());
    for action in AdminAction::ALL.into_iter().filter(|a| a.is_review_action()) {
        println!("   {action}");
    }
    println!("{}", "Professor actions:".cyan().bold());
    for action in AdminAction::ALL.into_iter().filter(|a| a.is_professor_action()) {
        println!("   {action}");
    }
    Ok(())
}

fn cmd_slug_conflict(slug: &str, name: &str) -> Result<()> {
    println!("{}", slug_in_use_err(slug, name).yellow());
    Ok(())
}

async fn cmd_notify(settings: NotifySettings, counts: PendingCounts) -> Result<()> {
    debug!(?counts, scope = ?settings.scope, "posting moderation summary");
    let webhook = UpdatesWebhook::with_config(settings.webhook)
        .context("Invalid webhook configuration")?;

    let outcome = webhook
        .send_updates(&counts, &settings.admin_url, settings.scope)
        .await
        .context("Failed to post moderation summary")?;

    match outcome {
        SendOutcome::Skipped => {
            println!(
                "{} {} is not set, nothing sent",
                "⚠️ ".yellow(),
                WEBHOOK_URL_ENV
            );
        }
        SendOutcome::Sent { title } => {
            println!("{} {}", "✅ Sent:".green().bold(), title);
        }
    }
    Ok(())
}
