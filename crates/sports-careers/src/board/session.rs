use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::domain::{JobId, UserId};
use super::geocode::Geocoder;
use super::page::{JobBoardPage, PageEvent};
use super::repository::BoardStore;
use super::service::{BoardServiceError, JobBoardService};

/// One live page plus the asynchronous work started on its behalf.
///
/// Every task races its work against the session token; once [`close`]
/// returns, no task mutates the page. Loads superseded by a newer
/// [`refresh`] are dropped by the page's generation check.
///
/// [`close`]: BoardSession::close
/// [`refresh`]: BoardSession::refresh
pub struct BoardSession<S, G> {
    service: Arc<JobBoardService<S, G>>,
    page: Arc<Mutex<JobBoardPage>>,
    token: CancellationToken,
}

impl<S, G> BoardSession<S, G>
where
    S: BoardStore + 'static,
    G: Geocoder + 'static,
{
    pub fn new(service: Arc<JobBoardService<S, G>>, identity: Option<UserId>) -> Self {
        Self {
            service,
            page: Arc::new(Mutex::new(JobBoardPage::new(identity))),
            token: CancellationToken::new(),
        }
    }

    /// Copy of the current page state.
    pub async fn snapshot(&self) -> JobBoardPage {
        self.page.lock().await.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancels outstanding tasks. Waits for any in-flight page update to finish.
    pub async fn close(&self) {
        let _page = self.page.lock().await;
        self.token.cancel();
    }

    /// Applies a transition unless the session is closed.
    pub async fn dispatch(&self, event: PageEvent) {
        transition(&self.page, &self.token, event).await;
    }

    /// Starts a load of listings and user data under a new generation.
    pub async fn refresh(&self) -> JoinHandle<()> {
        let (generation, identity) = {
            let mut page = self.page.lock().await;
            if self.token.is_cancelled() {
                return tokio::spawn(async {});
            }
            let current = std::mem::take(&mut *page);
            *page = current.apply(PageEvent::LoadStarted);
            (page.generation(), page.identity().cloned())
        };

        let service = self.service.clone();
        let page = self.page.clone();
        let token = self.token.clone();

        tokio::spawn(async move {
            let load = tokio::task::spawn_blocking(move || service.load(identity.as_ref()));
            tokio::select! {
                _ = token.cancelled() => {
                    debug!(generation, "board load cancelled");
                }
                joined = load => match joined {
                    Ok(snapshot) => {
                        let mut guard = page.lock().await;
                        if token.is_cancelled() {
                            return;
                        }
                        let current = std::mem::take(&mut *guard);
                        *guard = current
                            .apply(PageEvent::JobsLoaded {
                                generation,
                                jobs: snapshot.jobs,
                            })
                            .apply(PageEvent::UserDataLoaded {
                                generation,
                                profile: snapshot.profile,
                                applications: snapshot.applications,
                                saved: snapshot.saved,
                            });
                    }
                    Err(err) => warn!(generation, error = %err, "board load task failed"),
                },
            }
        })
    }

    /// Geocodes a listing location and opens the map, or records a failure notice.
    pub fn show_map(&self, location: impl Into<String>) -> JoinHandle<()> {
        let location = location.into();
        let service = self.service.clone();
        let page = self.page.clone();
        let token = self.token.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!(%location, "map lookup cancelled");
                }
                result = service.locate(&location) => {
                    let event = match result {
                        Ok(point) => PageEvent::MapOpened(point),
                        Err(err) => {
                            warn!(%location, error = %err, "map lookup failed");
                            PageEvent::ActionFailed(match &err {
                                BoardServiceError::Geocode(geocode) => {
                                    geocode.user_message(&location)
                                }
                                other => other.user_message(),
                            })
                        }
                    };
                    transition(&page, &token, event).await;
                }
            }
        })
    }

    /// Opens the apply draft for a listing.
    pub async fn open_application(&self, job_id: JobId) {
        self.dispatch(PageEvent::ApplyOpened(job_id)).await;
    }

    /// Submits the open draft. Local state only changes after the write succeeds.
    pub async fn confirm_application(&self) {
        let (identity, draft) = {
            let page = self.page.lock().await;
            if self.token.is_cancelled() {
                return;
            }
            (page.identity().cloned(), page.draft().cloned())
        };
        let Some(draft) = draft else {
            return;
        };

        let service = self.service.clone();
        let job_id = draft.job_id.clone();
        let written = tokio::task::spawn_blocking(move || {
            service.confirm_application(identity.as_ref(), &draft.job_id, draft.profile)
        })
        .await;

        let event = match written {
            Ok(Ok(record)) => PageEvent::ApplicationSubmitted(record),
            Ok(Err(err)) => {
                warn!(%job_id, error = %err, "application failed");
                PageEvent::ActionFailed(err.user_message())
            }
            Err(err) => {
                warn!(%job_id, error = %err, "application task failed");
                return;
            }
        };
        self.dispatch(event).await;
    }

    pub async fn save_job(&self, job_id: JobId) {
        let identity = {
            let page = self.page.lock().await;
            if self.token.is_cancelled() {
                return;
            }
            page.identity().cloned()
        };

        let service = self.service.clone();
        let target = job_id.clone();
        let written =
            tokio::task::spawn_blocking(move || service.save_job(identity.as_ref(), &target))
                .await;

        let event = match written {
            Ok(Ok(record)) => PageEvent::JobSaved(record),
            Ok(Err(err)) => {
                warn!(%job_id, error = %err, "saving job failed");
                PageEvent::ActionFailed(err.user_message())
            }
            Err(err) => {
                warn!(%job_id, error = %err, "save task failed");
                return;
            }
        };
        self.dispatch(event).await;
    }
}

async fn transition(page: &Mutex<JobBoardPage>, token: &CancellationToken, event: PageEvent) {
    let mut guard = page.lock().await;
    if token.is_cancelled() {
        return;
    }
    let current = std::mem::take(&mut *guard);
    *guard = current.apply(event);
}
