use anyhow::Context;
use clap::Parser;
use sentcorr_core::pipeline::{Correlation, Pipeline, TracingObserver};
use sentcorr_core::time::business_days::parse_date;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    name = "sentcorr_worker",
    about = "Correlate daily news sentiment with next-day closing prices"
)]
struct Args {
    /// Security ticker, e.g. AAPL.
    #[arg(long)]
    ticker: String,

    /// First sentiment day (YYYY-MM-DD).
    #[arg(long)]
    start_date: String,

    /// End of the range (YYYY-MM-DD). Sentiment stops the day before; its close is still used.
    #[arg(long)]
    end_date: String,

    /// Print the full analysis report as JSON instead of the bare coefficient.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = sentcorr_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    if let Err(err) = run(&settings, &args).await {
        sentry_anyhow::capture_anyhow(&err);
        tracing::error!(ticker = %args.ticker, error = %err, "correlation run failed");
        return Err(err);
    }

    Ok(())
}

async fn run(settings: &sentcorr_core::config::Settings, args: &Args) -> anyhow::Result<()> {
    let ticker = args.ticker.trim().to_ascii_uppercase();
    anyhow::ensure!(!ticker.is_empty(), "ticker must be non-empty");

    let start = parse_date(&args.start_date).context("invalid --start-date")?;
    let end = parse_date(&args.end_date).context("invalid --end-date")?;
    anyhow::ensure!(
        start <= end,
        "start date must not be after end date (got {start} > {end})"
    );

    let news = sentcorr_core::news::polygon::PolygonNewsClient::from_settings(settings)?;
    let scorer = sentcorr_core::llm::build_scorer(settings)?;
    let prices = sentcorr_core::prices::yahoo::YahooChartClient::from_settings(settings)?;
    let observer = TracingObserver::new(ticker.clone());

    tracing::info!(
        %ticker,
        %start,
        %end,
        provider = ?scorer.provider(),
        "starting sentiment correlation run"
    );

    let pipeline = Pipeline::new(&news, scorer.as_ref(), &prices, &observer);
    let report = pipeline.run(&ticker, start, end).await?;

    tracing::info!(
        %ticker,
        days = report.daily.len(),
        samples = report.samples.len(),
        correlation = ?report.correlation,
        "correlation run finished"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match report.correlation {
        Correlation::Spearman { rho, .. } => println!("{rho}"),
        Correlation::InsufficientData { .. } => {
            println!("Insufficient data points for correlation calculation.")
        }
        Correlation::Undefined { samples } => println!(
            "Correlation undefined: sentiment or price series is constant across {samples} samples."
        ),
    }

    Ok(())
}

fn init_sentry(settings: &sentcorr_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
