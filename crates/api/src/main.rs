use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use velora_core::chat::assistant;
use velora_core::chat::rules::ChatContext;
use velora_core::chat::session::SessionConfig;
use velora_core::domain::quote::MarketBundle;
use velora_core::domain::symbol::{self, Symbol, SYMBOLS};
use velora_core::market::chart::ChartSeries;
use velora_core::market::generator::MockMarketGenerator;
use velora_core::market::news::{self, NewsItem, Sentiment};
use velora_core::market::portfolio::{self, Portfolio};
use velora_core::market::summary::MarketSummary;
use velora_core::predict::{self, HttpPredictionProvider, PredictionProvider, ResolvedPrediction};

mod chat_ws;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = velora_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let provider: Option<Arc<dyn PredictionProvider>> =
        match settings.prediction_api_base_url.as_deref() {
            Some(_) => match HttpPredictionProvider::from_settings(&settings) {
                Ok(p) => Some(Arc::new(p)),
                Err(e) => {
                    sentry_anyhow::capture_anyhow(&e);
                    tracing::error!(error = %e, "prediction client init failed; serving generated data only");
                    None
                }
            },
            None => {
                tracing::info!("PREDICTION_API_BASE_URL not set; serving generated data only");
                None
            }
        };

    let state = AppState {
        generator: MockMarketGenerator::new(settings.seed_strategy),
        provider,
        hub: chat_ws::ChatHub::default(),
        session_config: SessionConfig {
            quiz_probability: settings.quiz_probability,
            reply_delay_ms: settings.reply_delay_ms.clone(),
        },
        portfolio_seed: settings.portfolio_seed,
    };

    let app = app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], settings.port));
    tracing::info!(%addr, seed_strategy = ?settings.seed_strategy, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/stocks", get(list_stocks))
        .route("/api/search", get(search_stocks))
        .route("/api/stock/:ticker", get(get_stock))
        .route("/api/stock/:ticker/chart", get(get_chart))
        .route("/api/market/summary", get(get_market_summary))
        .route("/api/portfolio", get(get_portfolio))
        .route("/api/news", get(get_news))
        .route("/api/predict", post(predict_stock))
        .route("/api/explain", post(explain_prediction))
        .route("/api/chat", post(chat))
        .route("/ws/chat/:client_id", get(chat_ws::ws_chat))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) generator: MockMarketGenerator,
    pub(crate) provider: Option<Arc<dyn PredictionProvider>>,
    pub(crate) hub: chat_ws::ChatHub,
    pub(crate) session_config: SessionConfig,
    pub(crate) portfolio_seed: u64,
}

impl AppState {
    /// Bundle for a universe ticker; `None` for anything else.
    pub(crate) fn known_bundle(&self, ticker: &str) -> Option<(&'static Symbol, MarketBundle)> {
        let symbol = symbol::lookup(ticker)?;
        let bundle = self.generator.generate(symbol.ticker, None, today());
        Some((symbol, bundle))
    }
}

pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Serialize)]
struct SearchResults {
    results: Vec<&'static Symbol>,
}

#[derive(Debug, Deserialize)]
struct NewsParams {
    limit: Option<usize>,
    sentiment: Option<String>,
}

#[derive(Debug, Serialize)]
struct NewsEntry {
    #[serde(flatten)]
    item: &'static NewsItem,
    time: String,
}

#[derive(Debug, Serialize)]
struct NewsResponse {
    items: Vec<NewsEntry>,
}

#[derive(Debug, Deserialize)]
struct TickerRequest {
    ticker: String,
}

#[derive(Debug, Serialize)]
struct ExplainResponse {
    ticker: String,
    explanation: String,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
    #[serde(default)]
    ticker: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    response: String,
}

async fn list_stocks() -> Json<Vec<Symbol>> {
    Json(SYMBOLS.to_vec())
}

async fn search_stocks(Query(params): Query<SearchParams>) -> Json<SearchResults> {
    Json(SearchResults {
        results: symbol::search(&params.q),
    })
}

async fn get_stock(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<MarketBundle>, StatusCode> {
    let (_, bundle) = state.known_bundle(&ticker).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(bundle))
}

async fn get_chart(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<ChartSeries>, StatusCode> {
    let (_, bundle) = state.known_bundle(&ticker).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(ChartSeries::from_bundle(&bundle)))
}

async fn get_market_summary(State(state): State<AppState>) -> Json<MarketSummary> {
    let as_of_date = today();
    let bundles = state.generator.generate_all(as_of_date);
    Json(MarketSummary::from_bundles(as_of_date, &bundles))
}

async fn get_portfolio(State(state): State<AppState>) -> Json<Portfolio> {
    Json(portfolio::generate_portfolio(state.portfolio_seed))
}

async fn get_news(Query(params): Query<NewsParams>) -> Result<Json<NewsResponse>, StatusCode> {
    let sentiment = match params.sentiment.as_deref() {
        Some(raw) => Some(Sentiment::parse(raw).ok_or(StatusCode::BAD_REQUEST)?),
        None => None,
    };
    let limit = params.limit.unwrap_or(news::DEFAULT_NEWS_LIMIT);
    let items = news::latest(limit, sentiment)
        .into_iter()
        .map(|item| NewsEntry {
            item,
            time: item.time_label(),
        })
        .collect();
    Ok(Json(NewsResponse { items }))
}

async fn predict_stock(
    State(state): State<AppState>,
    Json(req): Json<TickerRequest>,
) -> Result<Json<ResolvedPrediction>, StatusCode> {
    let symbol = symbol::lookup(&req.ticker).ok_or(StatusCode::NOT_FOUND)?;
    let resolved = predict::resolve_prediction(
        state.provider.as_deref(),
        &state.generator,
        symbol.ticker,
        today(),
    )
    .await;
    Ok(Json(resolved))
}

async fn explain_prediction(
    State(state): State<AppState>,
    Json(req): Json<TickerRequest>,
) -> Result<Json<ExplainResponse>, StatusCode> {
    let symbol = symbol::lookup(&req.ticker).ok_or(StatusCode::NOT_FOUND)?;
    let resolved = predict::resolve_prediction(
        state.provider.as_deref(),
        &state.generator,
        symbol.ticker,
        today(),
    )
    .await;

    Ok(Json(ExplainResponse {
        ticker: symbol.ticker.to_string(),
        explanation: velora_core::chat::explain::explain(&resolved.bundle),
    }))
}

async fn chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> Json<ChatResponse> {
    let selected = req.ticker.as_deref().and_then(|t| state.known_bundle(t));
    let ctx = ChatContext {
        selected: selected.as_ref().map(|(s, _)| *s),
        quote: selected.as_ref().map(|(_, b)| b),
    };

    let reply = assistant::respond(&req.message, &ctx);
    tracing::debug!(rule = ?reply.kind, "chat reply");
    Json(ChatResponse { response: reply.text })
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &velora_core::config::Settings) -> Option<sentry::ClientInitGuard> {
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
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use velora_core::chat::rules::{BUY_TEXT, FALLBACK_TEXT};

    fn test_state() -> AppState {
        AppState {
            generator: MockMarketGenerator::default(),
            provider: None,
            hub: chat_ws::ChatHub::default(),
            session_config: SessionConfig {
                quiz_probability: 0.0,
                reply_delay_ms: 0..=0,
            },
            portfolio_seed: 42,
        }
    }

    async fn send(req: Request<Body>) -> (StatusCode, Value) {
        let res = app(test_state()).oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, v: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn healthz_is_ok() {
        let res = app(test_state()).oneshot(get("/healthz")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn lists_universe() {
        let (status, body) = send(get("/api/stocks")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 46);
        assert_eq!(body[0], json!({"ticker": "AAPL", "name": "Apple Inc."}));
    }

    #[tokio::test]
    async fn search_caps_results() {
        let (_, body) = send(get("/api/search?q=corp")).await;
        assert_eq!(body["results"].as_array().unwrap().len(), 5);

        let (_, body) = send(get("/api/search?q=a")).await;
        assert!(body["results"].as_array().unwrap().is_empty());

        let (_, body) = send(get("/api/search")).await;
        assert!(body["results"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn stock_bundle_shape() {
        let (status, body) = send(get("/api/stock/aapl")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ticker"], "AAPL");
        assert_eq!(body["name"], "Apple Inc.");
        assert_eq!(body["predictions"].as_array().unwrap().len(), 3);
        assert_eq!(body["historical"].as_array().unwrap().len(), 30);
        assert!(["BUY", "SELL", "HOLD"].contains(&body["recommendation"].as_str().unwrap()));
    }

    #[tokio::test]
    async fn unknown_ticker_is_not_found() {
        let (status, _) = send(get("/api/stock/WMT")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(post_json("/api/predict", json!({"ticker": "WMT"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn chart_has_thirty_three_points() {
        let (status, body) = send(get("/api/stock/TSLA/chart")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["labels"].as_array().unwrap().len(), 33);
    }

    #[tokio::test]
    async fn predict_falls_back_to_mock_without_provider() {
        let (status, body) = send(post_json("/api/predict", json!({"ticker": "nvda"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "mock");
        assert_eq!(body["bundle"]["ticker"], "NVDA");
    }

    #[tokio::test]
    async fn explain_mentions_company() {
        let (status, body) = send(post_json("/api/explain", json!({"ticker": "KO"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ticker"], "KO");
        assert!(body["explanation"].as_str().unwrap().contains("Coca-Cola Co. (KO)"));
    }

    #[tokio::test]
    async fn chat_uses_assistant_then_keyword_selector() {
        let (_, body) = send(post_json("/api/chat", json!({"message": "Why buy?"}))).await;
        assert_eq!(body["response"], BUY_TEXT);

        let (_, body) = send(post_json("/api/chat", json!({"message": "market update"}))).await;
        assert_eq!(body["response"], FALLBACK_TEXT);

        let (_, body) = send(post_json(
            "/api/chat",
            json!({"message": "what about ibm", "ticker": "IBM"}),
        ))
        .await;
        assert!(body["response"]
            .as_str()
            .unwrap()
            .starts_with("I can help with questions about IBM's price predictions"));

        let (_, body) = send(post_json(
            "/api/chat",
            json!({"message": "forecast please", "ticker": "ibm"}),
        ))
        .await;
        assert!(body["response"]
            .as_str()
            .unwrap()
            .starts_with("Here's my price forecast for IBM:\n"));

        let (_, body) = send(post_json("/api/chat", json!({"message": "hello"}))).await;
        assert_eq!(body["response"], velora_core::chat::assistant::GREETING_TEXT);
    }

    #[tokio::test]
    async fn summary_and_portfolio() {
        let (status, body) = send(get("/api/market/summary")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["gainers"].as_array().unwrap().len(), 5);
        assert_eq!(body["indexes"].as_array().unwrap().len(), 3);
        assert_eq!(body["indexes"][0]["name"], "S&P 500");
        assert_eq!(body["watchlist"].as_array().unwrap().len(), 5);

        let (status, body) = send(get("/api/portfolio")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["holdings"].as_array().unwrap().len(), 46);
        assert_eq!(body["seed"], 42);
    }

    #[tokio::test]
    async fn news_lists_latest_items() {
        let (status, body) = send(get("/api/news")).await;
        assert_eq!(status, StatusCode::OK);
        let items = body["items"].as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0]["title"], "Tech Stocks Surge on AI Breakthrough");
        assert_eq!(items[0]["time"], "2 hours ago");
        assert_eq!(items[0]["sentiment"], "positive");

        let (_, body) = send(get("/api/news?sentiment=negative&limit=10")).await;
        let items = body["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i["sentiment"] == "negative"));

        let (status, _) = send(get("/api/news?sentiment=bullish")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
