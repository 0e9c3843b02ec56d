mod cli;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ndastro::{AppConfig, NdAstroService};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let service = NdAstroService::open(config, cli.db.as_deref()).context("failed to open settings")?;
    let format = cli.format;

    match cli.command {
        Commands::Chart { datetime, place } => {
            cli::chart(&service, datetime.as_deref(), &place, format)?;
        }
        Commands::Positions { datetime, place } => {
            cli::positions(&service, datetime.as_deref(), &place, format)?;
        }
        Commands::Ayanamsa { datetime, place } => {
            cli::ayanamsa(&service, datetime.as_deref(), &place, format)?;
        }
        Commands::Nakshatra { longitude } => {
            cli::nakshatra(&service, longitude, format)?;
        }
        Commands::Dasha {
            birth,
            system,
            at,
            running,
            place,
        } => {
            cli::dasha(
                &service,
                &birth,
                system.as_deref(),
                at.as_deref(),
                running,
                &place,
                format,
            )?;
        }
        Commands::Retrograde { from, to, planet, place } => {
            cli::retrograde(&service, &from, &to, planet.as_deref(), &place, format)?;
        }
        Commands::Sun { date, place } => {
            cli::sun(&service, date.as_deref(), &place, format)?;
        }
        Commands::Settings { command } => {
            cli::settings(&service, command, format).await?;
        }
    }

    Ok(())
}
