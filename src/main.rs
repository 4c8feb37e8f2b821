use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod analyzer;
mod company;
mod config;
mod content;
mod data;
mod history;
mod orchestrator;
mod report;
mod scoring;
mod skills;
mod storage;
mod validator;

use history::HistoryStore;
use storage::FileStore;

#[derive(Parser)]
#[command(name = "jdprep")]
#[command(about = "jdprep - placement readiness analysis for job descriptions", long_about = None)]
struct Cli {
    /// Directory holding the analysis history
    #[arg(long, global = true, default_value = "data")]
    data_dir: PathBuf,

    /// JSON file overriding the scoring rules
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a job description and save the result
    Analyze {
        /// File containing the job description text
        #[arg(long)]
        jd_file: PathBuf,

        /// Company name
        #[arg(long, default_value = "")]
        company: String,

        /// Role title
        #[arg(long, default_value = "")]
        role: String,

        /// Override company size (startup, mid-size, enterprise)
        #[arg(long)]
        size: Option<String>,
    },

    /// List saved analyses, newest first
    List,

    /// Show one analysis
    Show {
        /// Analysis ID
        #[arg(long)]
        id: String,

        /// Output format (json, md or text)
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// Mark a skill as known or needing practice
    Confidence {
        /// Analysis ID
        #[arg(long)]
        id: String,

        /// Skill keyword as detected (e.g. react)
        #[arg(long)]
        skill: String,

        /// know, practice or toggle
        #[arg(long, default_value = "toggle")]
        level: String,
    },

    /// Export an analysis as a plain-text report
    Export {
        /// Analysis ID
        #[arg(long)]
        id: String,

        /// Output file (default: <company>-<role>-analysis.txt)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Delete one analysis
    Delete {
        /// Analysis ID
        #[arg(long)]
        id: String,
    },

    /// Delete all saved analyses
    Clear,

    /// Report entries whose stored base score does not match a recomputation
    Verify,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let rules = config::load_rules(cli.rules.as_deref())?;
    let history = HistoryStore::new(FileStore::new(&cli.data_dir));

    match cli.command {
        Commands::Analyze {
            jd_file,
            company,
            role,
            size,
        } => {
            tracing::info!(jd_file = ?jd_file, company = %company, role = %role, "Analyzing JD");
            orchestrator::analyze(&history, &rules, &jd_file, &company, &role, size.as_deref())?;
        }
        Commands::List => {
            tracing::info!(data_dir = ?cli.data_dir, "Listing analyses");
            orchestrator::list(&history)?;
        }
        Commands::Show { id, format } => {
            tracing::info!(id = %id, format = %format, "Showing analysis");
            orchestrator::show(&history, &rules, &id, &format)?;
        }
        Commands::Confidence { id, skill, level } => {
            tracing::info!(id = %id, skill = %skill, level = %level, "Updating skill confidence");
            orchestrator::confidence(&history, &rules, &id, &skill, &level)?;
        }
        Commands::Export { id, output } => {
            tracing::info!(id = %id, "Exporting analysis");
            orchestrator::export(&history, &id, output.as_deref())?;
        }
        Commands::Delete { id } => {
            tracing::info!(id = %id, "Deleting analysis");
            orchestrator::delete(&history, &id)?;
        }
        Commands::Clear => {
            tracing::info!(data_dir = ?cli.data_dir, "Clearing history");
            orchestrator::clear(&history)?;
        }
        Commands::Verify => {
            tracing::info!(data_dir = ?cli.data_dir, "Verifying base scores");
            orchestrator::verify(&history, &rules)?;
        }
    }

    Ok(())
}
