use clap::{Parser, ValueEnum};
use sentcorr_core::analysis::{self, Analysis, AnalysisRequest};
use sentcorr_core::config::Settings;
use sentcorr_core::ingest::{NewsApiClient, YahooChartClient};
use sentcorr_core::pipeline::DEFAULT_TOP_N;
use sentcorr_core::time::{parse_period, resolve_window, DEFAULT_PERIOD};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod render;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "sentcorr_worker")]
struct Args {
    /// Ticker whose daily closes are compared with news sentiment.
    #[arg(long, default_value = "AAPL")]
    ticker: String,

    /// News search query.
    #[arg(long, default_value = "finance")]
    query: String,

    /// Lookback period: <n>d, <n>wk, <n>mo or <n>y.
    #[arg(long, default_value = DEFAULT_PERIOD)]
    period: String,

    /// Last day of the window (YYYY-MM-DD). Defaults to today's UTC date.
    #[arg(long)]
    end_date: Option<String>,

    /// How many of the strongest articles to chart.
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    top: usize,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let result = run(&settings, args).await;
    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %err, "analysis run failed");
    }
    result
}

async fn run(settings: &Settings, args: Args) -> anyhow::Result<()> {
    let period = parse_period(&args.period)?;
    let window = resolve_window(period, args.end_date.as_deref(), chrono::Utc::now())?;

    let news = NewsApiClient::from_settings(settings)?;
    let prices = YahooChartClient::from_settings(settings)?;

    let request = AnalysisRequest {
        ticker: args.ticker.trim().to_uppercase(),
        query: args.query,
        period,
        window,
        top_n: args.top,
    };

    tracing::info!(
        ticker = %request.ticker,
        query = %request.query,
        %period,
        start = %window.start,
        end = %window.end,
        "starting analysis"
    );

    match analysis::analyze(&news, &prices, &request).await? {
        Analysis::NoArticles => {
            println!("No news articles fetched. Exiting.");
        }
        Analysis::NoPrices { articles } => {
            tracing::warn!(ticker = %request.ticker, articles, "no price data in window");
            println!("No stock data available. Exiting.");
        }
        Analysis::Complete(report) => match args.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            OutputFormat::Text => {
                let stdout = std::io::stdout();
                render::render_text(&report, &mut stdout.lock())?;
            }
        },
    }

    Ok(())
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
