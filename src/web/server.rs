use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tracing::info;

use crate::catalog::store::CorpusIndex;
use crate::cli::ServeArgs;
use crate::core::feature::FeatureSequence;
use crate::core::stroke::Stroke;
use crate::matching::engine::{MatchingConfig, RankedMatch, Ranker};
use crate::matching::MatchError;
use crate::utils::validation::{check_stroke_limit, clamp_result_limit, validate_strokes};

/// Largest accepted request body
pub const MAX_REQUEST_BODY: usize = 1024 * 1024; // 1MB

/// Results returned when a request does not say how many it wants
pub const DEFAULT_RESULT_COUNT: usize = 5;

/// Shared application state
pub struct AppState {
    pub corpus: CorpusIndex,
    pub config: MatchingConfig,
    /// Upper bound on `k` for a single request
    pub max_results: usize,
}

/// Body of `POST /api/rank`
#[derive(Debug, Deserialize)]
pub struct RankRequest {
    pub strokes: Vec<Stroke>,
    #[serde(default = "default_result_count")]
    pub k: usize,
}

fn default_result_count() -> usize {
    DEFAULT_RESULT_COUNT
}

/// Enhanced error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_type: String,
    pub details: Option<String>,
}

/// Create a safe error response that prevents information disclosure
/// while logging detailed errors server-side for debugging
pub fn create_safe_error_response(
    error_type: &str,
    user_message: &str,
    internal_error: Option<&str>,
) -> ErrorResponse {
    if let Some(internal_msg) = internal_error {
        tracing::error!("Internal error ({}): {}", error_type, internal_msg);
    }

    ErrorResponse {
        error: user_message.to_string(),
        error_type: error_type.to_string(),
        details: None, // Never expose internal details to prevent information disclosure
    }
}

fn error_response(
    status: StatusCode,
    error_type: &str,
    user_message: &str,
    internal_error: Option<&str>,
) -> Response {
    (
        status,
        Json(create_safe_error_response(
            error_type,
            user_message,
            internal_error,
        )),
    )
        .into_response()
}

/// Run the web server
///
/// # Errors
///
/// Returns an error if the corpus cannot be loaded, the tokio runtime cannot be created,
/// or the server fails to start.
pub fn run(args: ServeArgs) -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move { run_server(args).await })
}

/// Application routes without middleware
pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/rank", post(rank_handler))
        .route("/api/corpus", get(corpus_handler))
        .with_state(state)
}

/// Create the application router with all routes and middleware configured.
///
/// # Errors
///
/// Returns an error if the rate limiter configuration is rejected.
pub fn create_router(state: Arc<AppState>) -> anyhow::Result<Router> {
    // Configure IP-based rate limiting
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(10) // 10 requests per second per IP
        .burst_size(50) // Allow bursts of 50 requests
        .finish()
        .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?;

    let app = routes(state).layer(
        ServiceBuilder::new()
            // Security headers for browser protection
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("x-content-type-options"),
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("x-frame-options"),
                HeaderValue::from_static("DENY"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("referrer-policy"),
                HeaderValue::from_static("strict-origin-when-cross-origin"),
            ))
            .layer(GovernorLayer {
                config: Arc::new(governor_conf),
            })
            // A ranking over a large corpus is the slowest request we serve
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(30),
            ))
            .layer(ConcurrencyLimitLayer::new(100))
            .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY)),
    );

    Ok(app)
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    let corpus = args.source.load()?;
    info!(
        "Loaded corpus with {} entries from {}",
        corpus.len(),
        args.source.corpus.display()
    );

    let state = Arc::new(AppState {
        corpus,
        config: args.search.to_config(),
        max_results: args.max_results,
    });
    let app = create_router(state)?;

    let addr = format!("{}:{}", args.address, args.port);
    println!("Starting sketch-ranker web server at http://{addr}");

    if args.open {
        let _ = open::that(format!("http://{addr}"));
    }

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Main page handler
async fn index_handler() -> Html<&'static str> {
    Html(include_str!("templates/index.html"))
}

/// API endpoint for ranking a drawing against the corpus
async fn rank_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RankRequest>, JsonRejection>,
) -> Response {
    let start_time = Instant::now();

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "invalid_json",
                "Request body must be JSON of the form {\"strokes\": [...], \"k\": 5}",
                Some(&rejection.body_text()),
            );
        }
    };

    if let Some(message) = check_stroke_limit(request.strokes.len()) {
        return error_response(StatusCode::BAD_REQUEST, "invalid_query", &message, None);
    }
    if let Err(e) = validate_strokes(&request.strokes) {
        return error_response(
            StatusCode::BAD_REQUEST,
            "invalid_query",
            &e.to_string(),
            None,
        );
    }

    let query = FeatureSequence::from_strokes(&request.strokes);
    let k = clamp_result_limit(request.k, state.max_results);
    let query_len = query.len();

    let ranking_state = Arc::clone(&state);
    let ranked = tokio::task::spawn_blocking(move || {
        Ranker::new(&ranking_state.corpus, ranking_state.config.clone()).rank(&query, k)
    })
    .await;

    let matches = match ranked {
        Ok(Ok(matches)) => matches,
        Ok(Err(MatchError::EmptyQuery)) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "empty_query",
                "Draw at least one stroke before searching",
                None,
            );
        }
        Ok(Err(MatchError::InvalidQuery(message))) => {
            return error_response(StatusCode::BAD_REQUEST, "invalid_query", &message, None);
        }
        Ok(Err(e @ MatchError::SearchBudgetExceeded(_))) => {
            return error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                "search_budget_exceeded",
                "The drawing is too complex to compare within the search budget",
                Some(&e.to_string()),
            );
        }
        Ok(Err(e)) => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Ranking failed",
                Some(&e.to_string()),
            );
        }
        Err(join_error) => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Ranking failed",
                Some(&join_error.to_string()),
            );
        }
    };

    #[allow(clippy::cast_possible_truncation)] // Processing time won't exceed u64
    let processing_time = start_time.elapsed().as_millis() as u64;

    Json(serde_json::json!({
        "query": {
            "stroke_count": query_len,
        },
        "matches": matches_to_json(&matches),
        "processing_info": {
            "processing_time_ms": processing_time,
            "corpus_size": state.corpus.len(),
            "result_limit": k,
            "configuration": state.config,
        }
    }))
    .into_response()
}

fn matches_to_json(matches: &[RankedMatch]) -> Vec<serde_json::Value> {
    matches
        .iter()
        .enumerate()
        .map(|(i, m)| {
            serde_json::json!({
                "rank": i + 1,
                "id": m.id.as_str(),
                "description": m.description,
                "score": m.score.value,
                "assigned": m.score.assigned,
                "unassigned": m.score.unassigned,
                "unused": m.score.unused,
            })
        })
        .collect()
}

/// API endpoint listing the corpus
async fn corpus_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let entries: Vec<serde_json::Value> = state
        .corpus
        .all_entries()
        .map(|e| {
            serde_json::json!({
                "id": e.id.as_str(),
                "description": e.description,
                "feature_count": e.features.len(),
            })
        })
        .collect();

    Json(serde_json::json!({
        "count": entries.len(),
        "entries": entries,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::store::CorpusEntry;
    use crate::core::feature::Feature;
    use crate::core::types::DirectionCode;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_state() -> Arc<AppState> {
        let mut corpus = CorpusIndex::new();
        corpus
            .add_entry(
                CorpusEntry::new(
                    "line",
                    FeatureSequence::new(vec![Feature::new(DirectionCode::Right, 0.0, 0.0)]),
                )
                .with_description("a horizontal line"),
            )
            .unwrap();
        corpus
            .add_entry(CorpusEntry::new(
                "dots",
                FeatureSequence::new(vec![
                    Feature::new(DirectionCode::Dot, 0.0, 0.0),
                    Feature::new(DirectionCode::Dot, 5.0, 5.0),
                ]),
            ))
            .unwrap();

        Arc::new(AppState {
            corpus,
            config: MatchingConfig::default(),
            max_results: 50,
        })
    }

    async fn post_rank(body: &str) -> (StatusCode, serde_json::Value) {
        let response = routes(test_state())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/rank")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), MAX_REQUEST_BODY).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_rank_returns_best_match_first() {
        let (status, json) = post_rank(r#"{"strokes": [[[1, 1], [30, 1]]], "k": 5}"#).await;
        assert_eq!(status, StatusCode::OK);

        let matches = json["matches"].as_array().unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0]["id"], "line");
        assert_eq!(matches[0]["rank"], 1);
        assert_eq!(matches[0]["description"], "a horizontal line");
        assert_eq!(matches[0]["score"], 0.0);
        assert_eq!(matches[1]["id"], "dots");
        assert!(matches[1]["description"].is_null());
    }

    #[tokio::test]
    async fn test_rank_accepts_polylines() {
        let (status, json) =
            post_rank(r#"{"strokes": [[[1, 1], [10, 1.5], [30, 1]]], "k": 1}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["matches"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rank_default_k() {
        let (status, json) = post_rank(r#"{"strokes": [[[0, 0], [0, 0]]]}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["processing_info"]["result_limit"], 5);
    }

    #[tokio::test]
    async fn test_rank_k_zero_is_empty() {
        let (status, json) = post_rank(r#"{"strokes": [[[0, 0], [4, 0]]], "k": 0}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["matches"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let (status, json) = post_rank(r#"{"strokes": [], "k": 3}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error_type"], "empty_query");
    }

    #[tokio::test]
    async fn test_invalid_json_rejected() {
        let (status, json) = post_rank(r#"{"strokes": "#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error_type"], "invalid_json");
        assert!(json["details"].is_null());
    }

    #[tokio::test]
    async fn test_overflowing_coordinates_rejected() {
        let (status, json) = post_rank(
            r#"{"strokes": [[[0, 1e308], [1, 1e308]], [[0, -1e308], [1, -1e308]]], "k": 5}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error_type"], "invalid_query");
    }

    #[tokio::test]
    async fn test_stroke_without_points_rejected() {
        let (status, json) = post_rank(r#"{"strokes": [[]], "k": 3}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error_type"], "invalid_json");
    }

    #[tokio::test]
    async fn test_corpus_listing() {
        let response = routes(test_state())
            .oneshot(
                Request::builder()
                    .uri("/api/corpus")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), MAX_REQUEST_BODY).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["count"], 2);
        assert_eq!(json["entries"][0]["id"], "line");
        assert_eq!(json["entries"][1]["feature_count"], 2);
    }

    #[tokio::test]
    async fn test_index_page_served() {
        let response = routes(test_state())
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_safe_error_response_hides_details() {
        let response =
            create_safe_error_response("internal_error", "Ranking failed", Some("secret detail"));
        assert_eq!(response.error, "Ranking failed");
        assert!(response.details.is_none());
    }
}
