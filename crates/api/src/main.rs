use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use sentcorr_core::analysis::{self, Analysis, AnalysisRequest};
use sentcorr_core::config::Settings;
use sentcorr_core::ingest::{NewsApiClient, NewsProvider, PriceProvider, YahooChartClient};
use sentcorr_core::pipeline::{Report, DEFAULT_TOP_N};
use sentcorr_core::time::{parse_period, resolve_window, DEFAULT_PERIOD};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_QUERY: &str = "finance";
const MAX_TOP_N: usize = 100;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let news: Option<Arc<dyn NewsProvider>> = match NewsApiClient::from_settings(&settings) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "news provider unavailable; starting API in degraded mode");
            None
        }
    };
    let prices: Arc<dyn PriceProvider> = Arc::new(YahooChartClient::from_settings(&settings)?);

    let state = AppState { news, prices };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/reports/:ticker", get(get_report))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    news: Option<Arc<dyn NewsProvider>>,
    prices: Arc<dyn PriceProvider>,
}

#[derive(Debug, Default, Deserialize)]
struct ReportParams {
    query: Option<String>,
    period: Option<String>,
    end_date: Option<String>,
    top: Option<usize>,
}

async fn get_report(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(params): Query<ReportParams>,
) -> Result<Json<Report>, StatusCode> {
    let Some(news) = &state.news else {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };

    let request = build_request(&ticker, params, Utc::now())?;

    let outcome = analysis::analyze(news.as_ref(), state.prices.as_ref(), &request)
        .await
        .map_err(|e| {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(ticker = %request.ticker, error = %e, "report fetch failed");
            StatusCode::BAD_GATEWAY
        })?;

    report_or_status(outcome).map(Json)
}

fn build_request(
    ticker: &str,
    params: ReportParams,
    now: DateTime<Utc>,
) -> Result<AnalysisRequest, StatusCode> {
    let ticker = ticker.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let period = parse_period(params.period.as_deref().unwrap_or(DEFAULT_PERIOD))
        .map_err(|_| StatusCode::BAD_REQUEST)?;
    let window = resolve_window(period, params.end_date.as_deref(), now)
        .map_err(|_| StatusCode::BAD_REQUEST)?;

    let query = params
        .query
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .unwrap_or_else(|| DEFAULT_QUERY.to_string());

    Ok(AnalysisRequest {
        ticker,
        query,
        period,
        window,
        top_n: params.top.unwrap_or(DEFAULT_TOP_N).min(MAX_TOP_N),
    })
}

fn report_or_status(outcome: Analysis) -> Result<Report, StatusCode> {
    match outcome {
        Analysis::Complete(report) => Ok(*report),
        Analysis::NoArticles | Analysis::NoPrices { .. } => Err(StatusCode::NOT_FOUND),
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn request_defaults() {
        let req = build_request("aapl", ReportParams::default(), now()).unwrap();
        assert_eq!(req.ticker, "AAPL");
        assert_eq!(req.query, "finance");
        assert_eq!(req.period.to_string(), "10d");
        assert_eq!(req.window.end, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(req.top_n, DEFAULT_TOP_N);
    }

    #[test]
    fn request_rejects_bad_period_and_date() {
        let bad_period = ReportParams {
            period: Some("ten days".to_string()),
            ..Default::default()
        };
        assert_eq!(
            build_request("AAPL", bad_period, now()).unwrap_err(),
            StatusCode::BAD_REQUEST
        );

        let bad_date = ReportParams {
            end_date: Some("01/10/2024".to_string()),
            ..Default::default()
        };
        assert_eq!(
            build_request("AAPL", bad_date, now()).unwrap_err(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn request_caps_top_n() {
        let params = ReportParams {
            top: Some(10_000),
            ..Default::default()
        };
        assert_eq!(build_request("AAPL", params, now()).unwrap().top_n, MAX_TOP_N);
    }

    #[tokio::test]
    async fn reports_unavailable_without_news_provider() {
        let settings = Settings {
            news_api_key: None,
            news_api_base_url: None,
            price_provider_base_url: None,
            sentry_dsn: None,
        };
        let state = AppState {
            news: None,
            prices: Arc::new(YahooChartClient::from_settings(&settings).unwrap()),
        };

        let res = get_report(
            State(state),
            Path("AAPL".to_string()),
            Query(ReportParams::default()),
        )
        .await;
        assert_eq!(res.err(), Some(StatusCode::SERVICE_UNAVAILABLE));
    }

    #[test]
    fn missing_inputs_map_to_not_found() {
        assert_eq!(
            report_or_status(Analysis::NoArticles).unwrap_err(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            report_or_status(Analysis::NoPrices { articles: 3 }).unwrap_err(),
            StatusCode::NOT_FOUND
        );
    }
}
