use crate::cli::ServeArgs;
use crate::infra::{build_store, AppState};
use crate::routes::with_board_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use sports_careers::board::{HttpGeocoder, JobBoardService};
use sports_careers::config::AppConfig;
use sports_careers::error::AppError;
use sports_careers::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(build_store(&config.board)?);
    let geocoder = Arc::new(HttpGeocoder::new(&config.geocode)?);
    let board_service = Arc::new(JobBoardService::new(store, geocoder, &config.board));

    let app = with_board_routes(board_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        duplicate_policy = ?config.board.duplicate_policy,
        "sports careers job board ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
