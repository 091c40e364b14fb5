use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;

mod db;
mod models;
mod report;
mod stats;
mod validate;

#[derive(Parser)]
#[command(name = "gradebook-stats")]
#[command(about = "Academic-performance statistics over the gradebook record store", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema and indexes
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import score rows from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Class pass-rate statistics, global or scoped to one class
    ClassStats {
        #[arg(long)]
        class_id: Option<i32>,
    },
    /// Enrollment-level performance statistics
    EnrollmentStats,
    /// Advisory conformance check over all grade records
    Validate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} scores from {}.", csv.display());
        }
        Commands::ClassStats { class_id } => {
            let records = db::fetch_records(&pool, class_id).await?;
            let json = match class_id {
                Some(_) => {
                    let stats = report::per_class_stats(&records)?;
                    serde_json::to_string_pretty(&stats)?
                }
                None => {
                    let stats = report::global_class_stats(&records)?;
                    serde_json::to_string_pretty(&stats)?
                }
            };
            println!("{json}");
        }
        Commands::EnrollmentStats => {
            let records = db::fetch_records(&pool, None).await?;
            let stats = report::enrollment_stats(&records)?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Commands::Validate => {
            let records = db::fetch_records(&pool, None).await?;
            let violations = validate::check_records(&records);

            if violations.is_empty() {
                println!("All {} records conform.", records.len());
            } else {
                for violation in &violations {
                    println!("- {violation}");
                }
                println!(
                    "{} advisory violations across {} records.",
                    violations.len(),
                    records.len()
                );
            }
        }
    }

    Ok(())
}
