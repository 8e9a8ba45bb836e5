use metrics_exporter_prometheus::PrometheusHandle;
use sports_careers::board::{CatalogImporter, InMemoryBoardStore};
use sports_careers::config::BoardConfig;
use sports_careers::error::AppError;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Listing store seeded from the configured CSV catalog, if any.
pub(crate) fn build_store(config: &BoardConfig) -> Result<InMemoryBoardStore, AppError> {
    match config.jobs_csv.as_deref() {
        Some(path) => load_catalog(path),
        None => Ok(InMemoryBoardStore::default()),
    }
}

pub(crate) fn load_catalog(path: &Path) -> Result<InMemoryBoardStore, AppError> {
    let jobs = CatalogImporter::from_path(path)?;
    info!(path = %path.display(), count = jobs.len(), "loaded job catalog");
    Ok(InMemoryBoardStore::with_jobs(jobs))
}
