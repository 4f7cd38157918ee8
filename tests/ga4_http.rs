use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use news_pulse::clients::ga4::{Ga4Client, MetricsSource};
use news_pulse::clients::site::PageFetcher;
use news_pulse::config::Config;
use news_pulse::error::AppError;
use news_pulse::services::analytics::AnalyticsService;
use news_pulse::services::title_store::JsonFileStore;
use news_pulse::services::titles::TitleService;
use news_pulse::state::AppState;
use news_pulse::web::router::build_router;

const PRIVATE_KEY: &str = include_str!("fixtures/service_account_key.pem");

/// Stands in for both the OAuth token endpoint and the Data API.
struct Upstream {
    token_status: StatusCode,
    expires_in: i64,
    exchanges: AtomicUsize,
    report_status: StatusCode,
    report_body: String,
    seen: Mutex<Vec<(String, String, Value)>>,
}

impl Upstream {
    fn new(report_status: StatusCode, report_body: impl Into<String>) -> Self {
        Self {
            token_status: StatusCode::OK,
            expires_in: 3600,
            exchanges: AtomicUsize::new(0),
            report_status,
            report_body: report_body.into(),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn exchanges(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }
}

async fn token(State(up): State<Arc<Upstream>>, body: String) -> Response {
    let n = up.exchanges.fetch_add(1, Ordering::SeqCst) + 1;
    if !body.contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer") || !body.contains("assertion=") {
        return (StatusCode::BAD_REQUEST, "bad grant").into_response();
    }
    if up.token_status != StatusCode::OK {
        return (up.token_status, r#"{"error":"invalid_grant"}"#).into_response();
    }
    Json(json!({ "access_token": format!("tok-{n}"), "expires_in": up.expires_in, "token_type": "Bearer" }))
        .into_response()
}

async fn run_report(
    State(up): State<Arc<Upstream>>,
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    up.seen.lock().unwrap().push((call, auth, body));
    (up.report_status, up.report_body.clone()).into_response()
}

async fn serve(up: Arc<Upstream>) -> String {
    let app = Router::new()
        .route("/token", post(token))
        .route("/v1beta/properties/:call", post(run_report))
        .with_state(up);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}")
}

async fn client(up: Arc<Upstream>) -> Ga4Client {
    let base = serve(up).await;
    let key = json!({
        "type": "service_account",
        "client_email": "reporter@example.iam.gserviceaccount.com",
        "private_key": PRIVATE_KEY,
        "token_uri": format!("{base}/token"),
    })
    .to_string();
    let cfg = Config::from_lookup(|name| match name {
        "GA_PROPERTY_ID" => Some("123".to_string()),
        "GOOGLE_APPLICATION_CREDENTIALS_JSON" => Some(key.clone()),
        _ => None,
    })
    .unwrap();
    Ga4Client::new(&cfg).unwrap().with_api_base(format!("{base}/v1beta/"))
}

fn report(rows: &[(&str, &str, &str, &str)]) -> String {
    let rows: Vec<Value> = rows
        .iter()
        .map(|(path, views, users, secs)| {
            json!({
                "dimensionValues": [{ "value": path }],
                "metricValues": [{ "value": views }, { "value": users }, { "value": secs }]
            })
        })
        .collect();
    let count = rows.len();
    json!({ "rows": rows, "rowCount": count }).to_string()
}

fn upstream_message(err: AppError) -> String {
    match err {
        AppError::Upstream(message) => message,
        other => panic!("expected an upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn token_is_reused_across_reports() {
    let body = report(&[("/noticia-2-b", "90", "30", "900"), ("/noticia-1-a", "10", "5", "25.5")]);
    let up = Arc::new(Upstream::new(StatusCode::OK, body));
    let ga4 = client(up.clone()).await;

    let first = ga4.fetch_page_metrics(None).await.unwrap();
    ga4.fetch_page_metrics(Some("/noticia-1-a")).await.unwrap();
    assert_eq!(up.exchanges(), 1);
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].page_path, "/noticia-2-b");
    assert_eq!(first[0].active_users, 30);
    assert_eq!(first[1].engagement_seconds, 25.5);
    assert_eq!(first[0].page_title, None);

    let seen = up.seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    let (call, auth, listing) = &seen[0];
    assert_eq!(call, "123:runReport");
    assert_eq!(auth, "Bearer tok-1");
    assert_eq!(listing["dimensions"], json!([{ "name": "pagePath" }]));
    assert_eq!(listing["dimensionFilter"]["filter"]["stringFilter"]["matchType"], "CONTAINS");
    assert_eq!(seen[1].2["dimensionFilter"]["filter"]["stringFilter"]["value"], "/noticia-1-a");
}

#[tokio::test]
async fn token_inside_refresh_margin_is_renewed() {
    let mut up = Upstream::new(StatusCode::OK, report(&[]));
    up.expires_in = 30;
    let up = Arc::new(up);
    let ga4 = client(up.clone()).await;

    ga4.fetch_page_metrics(None).await.unwrap();
    ga4.fetch_page_metrics(None).await.unwrap();
    assert_eq!(up.exchanges(), 2);
    let seen = up.seen.lock().unwrap();
    assert_eq!(seen[1].1, "Bearer tok-2");
}

#[tokio::test]
async fn rejected_token_exchange_is_upstream_error() {
    let mut up = Upstream::new(StatusCode::OK, report(&[]));
    up.token_status = StatusCode::UNAUTHORIZED;
    let up = Arc::new(up);
    let ga4 = client(up.clone()).await;

    let message = upstream_message(ga4.fetch_page_metrics(None).await.unwrap_err());
    assert!(message.contains("token exchange rejected (401)"), "{message}");
    assert!(message.contains("invalid_grant"), "{message}");
    assert!(up.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn report_errors_are_upstream_errors() {
    let denied = Arc::new(Upstream::new(StatusCode::FORBIDDEN, r#"{"error":{"message":"permission denied"}}"#));
    let message = upstream_message(client(denied).await.fetch_page_metrics(None).await.unwrap_err());
    assert!(message.contains("runReport returned 403"), "{message}");
    assert!(message.contains("permission denied"), "{message}");

    let garbled = Arc::new(Upstream::new(StatusCode::OK, "<html>not json</html>"));
    let message = upstream_message(client(garbled).await.fetch_page_metrics(None).await.unwrap_err());
    assert!(message.contains("decoding runReport response"), "{message}");

    let bad_counter = Arc::new(Upstream::new(StatusCode::OK, report(&[("/noticia-1", "many", "1", "0")])));
    let message = upstream_message(client(bad_counter).await.fetch_page_metrics(None).await.unwrap_err());
    assert!(message.contains("screenPageViews"), "{message}");
}

struct NoSite;

#[async_trait::async_trait]
impl PageFetcher for NoSite {
    async fn fetch_page(&self, _path: &str) -> anyhow::Result<String> {
        anyhow::bail!("offline")
    }
}

#[tokio::test]
async fn forbidden_report_surfaces_as_500_with_message() {
    let up = Arc::new(Upstream::new(StatusCode::FORBIDDEN, r#"{"error":{"message":"permission denied"}}"#));
    let ga4 = client(up).await;
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path().join("titles-cache.json")).await;
    let titles = TitleService::new(Arc::new(store), Arc::new(NoSite));
    let app = build_router(AppState::new(AnalyticsService::new(Arc::new(ga4), Arc::new(titles), 4)));

    let res = app
        .oneshot(Request::builder().uri("/api/analytics/pages").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("permission denied"));
}
