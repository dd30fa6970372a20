use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    artifacts::{load_artifacts, Artifacts},
    config::Config,
    handlers::{
        self,
        page::{AppState, ModelSummary},
    },
    metrics,
    predictor::Predictor,
    signals::setup_signal_handlers,
};

/// Form posts are a handful of short fields
const MAX_BODY_BYTES: usize = 16 * 1024;

/// Start the prediction server
///
/// This function:
/// 1. Loads the scaler and model (fatal on failure)
/// 2. Initializes metrics if enabled
/// 3. Sets up signal handlers for graceful shutdown
/// 4. Binds to the configured address and serves until shutdown
pub async fn start_server(config: Config) -> Result<()> {
    let artifacts = load_artifacts(&config.artifacts)
        .context("Cannot start without the scaler and model artifacts")?;
    let app_state = build_state(&config, artifacts);

    let metrics_route = if config.metrics.enabled {
        info!("Initializing Prometheus metrics...");
        let handle = Arc::new(metrics::init_metrics()?);
        metrics::record_model_info(app_state.model.n_trees);
        Some((config.metrics.endpoint.clone(), handle))
    } else {
        None
    };

    let (shutdown_tx, signal_handle) = setup_signal_handlers();
    let mut shutdown_rx = shutdown_tx.subscribe();

    let app = create_router(app_state, metrics_route);

    let addr = SocketAddr::from((
        config
            .server
            .host
            .parse::<std::net::IpAddr>()
            .with_context(|| format!("Invalid server.host '{}'", config.server.host))?,
        config.server.port,
    ));

    info!("Starting insurance cost predictor on http://{}", addr);
    info!(
        "Configuration: result delay {} ms, category policy {:?}, metrics {}",
        config.prediction.result_delay_ms,
        config.prediction.category_policy,
        if config.metrics.enabled { "enabled" } else { "disabled" }
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("Shutdown signal received, draining connections...");
        })
        .await?;

    signal_handle.await?;
    info!("Server stopped gracefully");

    Ok(())
}

/// Wrap loaded artifacts into shared, read-only request state
pub fn build_state(config: &Config, artifacts: Artifacts) -> AppState {
    let model = ModelSummary {
        n_trees: artifacts.model.n_trees(),
        max_depth: artifacts.model.max_depth(),
    };

    AppState {
        predictor: Predictor::from_artifacts(artifacts),
        model,
        prediction: Arc::new(config.prediction.clone()),
    }
}

/// Create the Axum router with all routes and middleware
pub fn create_router(
    app_state: AppState,
    metrics_route: Option<(String, Arc<PrometheusHandle>)>,
) -> Router {
    let page_routes = Router::new()
        .route("/", get(handlers::page::index))
        .route("/predict", post(handlers::page::handle_predict))
        .route("/bmi", post(handlers::page::handle_bmi))
        .route("/ready", get(handlers::health::readiness_check))
        .with_state(app_state);

    let mut router = Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(page_routes);

    if let Some((endpoint, handle)) = metrics_route {
        router = router.merge(
            Router::new()
                .route(&endpoint, get(handlers::metrics_handler::metrics))
                .with_state(handle),
        );
    }

    router
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::N_FEATURES;
    use crate::forest::{RandomForestRegressor, RegressionTree, TreeNode};
    use crate::scaler::StandardScaler;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let mut config = Config::default();
        config.prediction.result_delay_ms = 0;

        let artifacts = Artifacts {
            scaler: StandardScaler::new(vec![0.0; N_FEATURES], vec![1.0; N_FEATURES]),
            model: RandomForestRegressor::new(
                N_FEATURES,
                vec![RegressionTree::new(TreeNode::split(
                    3,
                    0.5,
                    TreeNode::leaf(8000.0),
                    TreeNode::leaf(30000.0),
                ))],
            ),
        };
        build_state(&config, artifacts)
    }

    fn form_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_build_state_summarizes_model() {
        let state = test_state();
        assert_eq!(state.model, ModelSummary { n_trees: 1, max_depth: 1 });
        assert_eq!(state.prediction.result_delay_ms, 0);
    }

    #[tokio::test]
    async fn test_predict_route() {
        let app = create_router(test_state(), None);
        let response = app
            .oneshot(form_post(
                "/predict",
                "age=45&sex=Female&bmi=31.20&smoker=Yes&region=Northwest&children=2",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Your predicted medical insurance cost is $30000.00"));
    }

    #[tokio::test]
    async fn test_predict_route_with_empty_selects() {
        let app = create_router(test_state(), None);
        let response = app
            .oneshot(form_post(
                "/predict",
                "age=45&sex=&bmi=31.20&smoker=&region=&children=2",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Please kindly fill up all the required fields"));
    }

    #[tokio::test]
    async fn test_bmi_route() {
        let app = create_router(test_state(), None);
        let response = app
            .oneshot(form_post("/bmi", "weight=0.00&height=0.00"))
            .await
            .unwrap();

        let html = body_text(response).await;
        assert!(html.contains("Please enter a value for your height and weight!"));
    }

    #[tokio::test]
    async fn test_metrics_route_only_when_enabled() {
        let app = create_router(test_state(), None);
        let response = app
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        let handle = Arc::new(recorder.handle());
        let app = create_router(test_state(), Some(("/internal/metrics".to_string(), handle)));
        let response = app
            .oneshot(Request::get("/internal/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_routes() {
        let app = create_router(test_state(), None);
        let response = app
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
