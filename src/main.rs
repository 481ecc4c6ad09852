use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crypto_radar::config::AppConfig;
use crypto_radar::models::{ComparisonMode, CoverageBase, Exchange};
use crypto_radar::pipeline::Pipeline;
use crypto_radar::source::{open_source, SourceKind};
use crypto_radar::transform::parity::{filter_comparison, filter_missing};

#[derive(Parser)]
#[command(name = "crypto-radar", about = "Crypto funding, listing and exchange-parity analytics", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Where raw rows come from
    #[arg(long, value_enum, default_value_t = SourceKind::Http, global = true, env = "RADAR_SOURCE")]
    source: SourceKind,

    /// Directory holding funding/listings/parity .json or .csv files (file source)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Serve mock data if the fetch fails
    #[arg(long, global = true)]
    mock_fallback: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Venture funding dashboard: investors, categories, monthly totals
    Funding,

    /// Exchange listings dashboard: deduplicated tokens and derived views
    Listings,

    /// Exchange coverage per token relative to a base exchange
    Parity {
        /// "all" or an exchange name (defaults to parity.base_exchange)
        #[arg(short, long)]
        base: Option<String>,

        /// Keep only tokens missing from any of these exchanges
        #[arg(long, value_delimiter = ',')]
        missing_from: Vec<String>,

        /// Primary exchange for the comparison filter
        #[arg(long, requires = "compare")]
        primary: Option<String>,

        /// Comparison exchanges for the comparison filter
        #[arg(long, value_delimiter = ',', requires = "primary")]
        compare: Vec<String>,

        /// opportunity | gap
        #[arg(long, default_value = "opportunity")]
        mode: String,
    },

    /// List the tracked exchanges
    Exchanges,
}

fn parse_exchanges(names: &[String]) -> Result<Vec<Exchange>> {
    names
        .iter()
        .map(|n| n.parse::<Exchange>().map_err(anyhow::Error::from))
        .collect()
}

fn emit<T: Serialize>(payload: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(payload)?
    } else {
        serde_json::to_string(payload)?
    };
    println!("{}", json);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "crypto_radar=info,warn",
        1 => "crypto_radar=debug,info",
        _ => "trace",
    };

    // Logs go to stderr so stdout stays a clean JSON payload
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::new(filter))
        .init();

    let mut config = AppConfig::load()?;
    if let Some(dir) = cli.data_dir {
        config.source.data_dir = dir;
    }
    if cli.mock_fallback {
        config.source.mock_fallback = true;
    }
    let pretty = config.output.pretty;
    let default_base = config.parity.base_exchange.clone();
    let source_kind = cli.source;
    let pipeline = move || -> Result<Pipeline> {
        let source = open_source(source_kind, &config.source).context("Failed to build data source")?;
        Ok(Pipeline::new(config, source))
    };

    match cli.command {
        Command::Funding => {
            let (dashboard, _stats) = pipeline()?.funding().await?;
            emit(&dashboard, pretty)?;
        }

        Command::Listings => {
            let (dashboard, _stats) = pipeline()?.listings().await?;
            emit(&dashboard, pretty)?;
        }

        Command::Parity {
            base,
            missing_from,
            primary,
            compare,
            mode,
        } => {
            let base: CoverageBase = base
                .as_deref()
                .unwrap_or(&default_base)
                .parse()
                .context("Invalid base exchange")?;

            let (mut dashboard, _stats) = pipeline()?.parity(base).await?;

            if !missing_from.is_empty() {
                let selected = parse_exchanges(&missing_from)?;
                dashboard.tokens = filter_missing(&dashboard.tokens, &selected)
                    .into_iter()
                    .cloned()
                    .collect();
            }

            if let Some(primary) = primary {
                let primary: Exchange = primary.parse()?;
                let peers = parse_exchanges(&compare)?;
                let mode: ComparisonMode = mode.parse()?;
                dashboard.tokens = filter_comparison(&dashboard.tokens, primary, &peers, mode)
                    .into_iter()
                    .cloned()
                    .collect();
            }

            emit(&dashboard, pretty)?;
        }

        Command::Exchanges => {
            for exchange in Exchange::ALL {
                println!("  {:<10} {}", exchange.key(), exchange.display_name());
            }
        }
    }

    Ok(())
}
