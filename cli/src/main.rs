//! eurofx CLI
//!
//! Converts amounts between currencies using the ECB reference rates.

use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eurofx_common::{parse_feed_date, Currency, CurrencyRegistry, Money};
use eurofx_ecb::{EcbClient, EcbClientConfig};
use eurofx_fx::{ConversionRequest, FxEngine, FxEngineConfig};

/// eurofx CLI
#[derive(Parser, Debug)]
#[command(name = "eurofx")]
#[command(about = "Currency conversion with ECB euro reference rates")]
struct Args {
    /// Override the rate document URL
    #[arg(long, global = true)]
    url: Option<String>,

    /// Retries on server errors
    #[arg(long, global = true)]
    retries: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert an amount from one currency to another
    Convert {
        /// Rate date (yyyy-mm-dd)
        #[arg(short, long)]
        date: String,

        /// Amount to convert
        #[arg(short, long)]
        amount: Decimal,

        /// Source currency code
        #[arg(short, long)]
        from: String,

        /// Target currency code
        #[arg(short, long)]
        to: String,

        /// Always fetch fresh rates
        #[arg(long)]
        no_cache: bool,

        /// Print the conversion as JSON
        #[arg(long)]
        json: bool,
    },

    /// List every rate published for a date
    Rates {
        /// Rate date (yyyy-mm-dd)
        #[arg(short, long)]
        date: String,
    },

    /// List recognised currencies
    Currencies {
        /// Only currencies convertible on this date (yyyy-mm-dd)
        #[arg(short, long)]
        date: Option<String>,
    },
}

fn parse_date(token: &str) -> anyhow::Result<NaiveDate> {
    parse_feed_date(token).with_context(|| format!("invalid date {:?}", token))
}

fn build_engine(args: &Args, use_cache: bool) -> anyhow::Result<FxEngine> {
    let mut client_config = EcbClientConfig::from_env();
    if let Some(url) = &args.url {
        client_config.url = url.clone();
    }
    if let Some(retries) = args.retries {
        client_config.max_retries = retries;
    }

    let client = EcbClient::new(client_config)?;

    let mut engine_config = FxEngineConfig::from_env();
    engine_config.use_cache &= use_cache;

    Ok(FxEngine::new(
        Arc::new(client),
        Arc::new(CurrencyRegistry::ecb()),
        engine_config,
    ))
}

async fn run(args: Args) -> anyhow::Result<()> {
    match &args.command {
        Command::Convert {
            date,
            amount,
            from,
            to,
            no_cache,
            json,
        } => {
            let date = parse_date(date)?;
            let engine = build_engine(&args, !no_cache)?;
            let request = ConversionRequest::new(
                date,
                Money::new(*amount, Currency::new(from.as_str())),
                Currency::new(to.as_str()),
            );

            let conversion = engine.execute(request).await?;

            if *json {
                println!("{}", serde_json::to_string_pretty(&conversion)?);
            } else {
                println!(
                    "{} = {} ({})",
                    conversion.input, conversion.output, conversion.date
                );
            }
        }

        Command::Rates { date } => {
            let date = parse_date(date)?;
            let engine = build_engine(&args, true)?;
            let table = engine.get_rates(date).await?;
            table.check_bounds(date)?;

            let rates = table
                .rates_on(date)
                .with_context(|| format!("no rates published on {}", date))?;
            let mut rates: Vec<_> = rates.iter().collect();
            rates.sort_by(|a, b| a.0.cmp(b.0));

            println!("1 {} on {}:", table.base(), date);
            for (currency, rate) in rates {
                println!("  {} {}", currency, rate);
            }
        }

        Command::Currencies { date } => {
            let registry = CurrencyRegistry::ecb();
            let currencies = match date {
                Some(date) => registry.valid_on(parse_date(date)?),
                None => registry.currencies(),
            };

            for currency in currencies {
                match registry.last_valid_date(&currency) {
                    Some(last) => println!("{} (until {})", currency, last),
                    None => println!("{}", currency),
                }
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so results on stdout stay machine readable.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    debug!(?args, "Parsed arguments");

    if let Err(e) = run(args).await {
        error!(error = %e, "Command failed");
        return Err(e);
    }

    Ok(())
}
