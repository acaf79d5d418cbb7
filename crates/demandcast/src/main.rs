use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use demandcast_core::{db, horizon, run};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Weekly SKU demand forecasting pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one forecast pass and publish the resulting rows
    Forecast(ForecastArgs),
    /// Run database migrations
    Migrate,
}

#[derive(Args, Debug, Default)]
struct ForecastArgs {
    /// Tenant to forecast for; falls back to DEMANDCAST_TENANT, then to
    /// the first tenant with sales history
    #[arg(long)]
    tenant: Option<String>,

    /// Number of future weeks to project; falls back to
    /// DEMANDCAST_HORIZON_WEEKS, then to the default of 12
    #[arg(long)]
    horizon_weeks: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Forecast(args) => {
            let pool = connect_pool().await?;
            let request = run::RunRequest {
                tenant: args.tenant.or_else(|| std::env::var("DEMANDCAST_TENANT").ok()),
                horizon_weeks: resolve_horizon(args.horizon_weeks)?,
            };
            let receipt = run::run_forecast(&pool, request, chrono::Utc::now()).await?;
            println!("{}", serde_json::to_string_pretty(&receipt)?);
            Ok(())
        }
        Command::Migrate => {
            let pool = connect_pool().await?;
            db::run_migrations(&pool).await?;
            info!("Database migrations applied");
            Ok(())
        }
    }
}

fn resolve_horizon(flag: Option<u32>) -> Result<u32> {
    if let Some(weeks) = flag {
        return Ok(weeks);
    }
    match std::env::var("DEMANDCAST_HORIZON_WEEKS") {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("invalid DEMANDCAST_HORIZON_WEEKS value '{raw}'")),
        Err(_) => Ok(horizon::DEFAULT_HORIZON_WEEKS),
    }
}

async fn connect_pool() -> Result<db::DbPool> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .or_else(|_| std::env::var("DEMANDCAST_DATABASE_URL"))
        .context("DATABASE_URL (or DEMANDCAST_DATABASE_URL) must be set")?;
    db::connect(&database_url).await
}
