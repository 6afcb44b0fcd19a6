//! Fetch lifecycle: loading/error state, automatic retry after a failed
//! fetch, and the create/delete commands issued from the presentation layer.

use std::{sync::Arc, time::Duration};

use futures::future::{BoxFuture, FutureExt};
use shared::{
    domain::{Movie, MovieId, NewMovie},
    mapper::to_movies,
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    error::{ControllerError, StoreError},
    store::MovieStore,
};

pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(5000);
pub const FETCH_FAILED_MESSAGE: &str = "Something went wrong! Retrying...";
pub const CREATE_FAILED_MESSAGE: &str = "Failed to add movie.";
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete movie.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPhase {
    #[default]
    Idle,
    Loading,
    Success,
    Failed,
    Retrying,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchEvent {
    /// Mount, manual refresh, or the retry timer firing.
    Start,
    Succeeded,
    Failed,
    ScheduleRetry,
    CancelRetry,
}

impl FetchPhase {
    /// The transition table. `None` means the event is not accepted in this
    /// phase and nothing changes.
    pub fn next(self, event: FetchEvent) -> Option<FetchPhase> {
        use FetchEvent as E;
        use FetchPhase as P;

        match (self, event) {
            (_, E::Start) => Some(P::Loading),
            (P::Loading, E::Succeeded) => Some(P::Success),
            (P::Loading, E::Failed) => Some(P::Failed),
            (P::Failed, E::ScheduleRetry) => Some(P::Retrying),
            (P::Retrying, E::CancelRetry) => Some(P::Idle),
            _ => None,
        }
    }
}

/// What the presentation layer renders from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchState {
    pub movies: Vec<Movie>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub is_retrying: bool,
}

#[derive(Debug, Clone)]
pub enum ControllerEvent {
    StateChanged { phase: FetchPhase, state: FetchState },
}

struct PendingRetry {
    token: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct ControllerState {
    phase: FetchPhase,
    view: FetchState,
    latest_request: u64,
    next_retry_token: u64,
    pending_retry: Option<PendingRetry>,
}

impl ControllerState {
    fn apply(&mut self, event: FetchEvent) -> bool {
        match self.phase.next(event) {
            Some(next) => {
                self.phase = next;
                true
            }
            None => false,
        }
    }

    /// Enters `Loading` and returns the sequence number of the new attempt.
    fn begin_fetch(&mut self) -> u64 {
        if let Some(pending) = self.pending_retry.take() {
            pending.handle.abort();
            debug!(token = pending.token, "fetch supersedes pending retry");
        }
        self.apply(FetchEvent::Start);
        self.latest_request += 1;
        self.view.is_loading = true;
        self.view.error = None;
        self.view.is_retrying = false;
        self.latest_request
    }
}

pub struct MovieController {
    store: Arc<dyn MovieStore>,
    retry_delay: Duration,
    inner: Mutex<ControllerState>,
    events: broadcast::Sender<ControllerEvent>,
}

impl MovieController {
    pub fn new(store: Arc<dyn MovieStore>) -> Arc<Self> {
        Self::with_retry_delay(store, DEFAULT_RETRY_DELAY)
    }

    pub fn with_retry_delay(store: Arc<dyn MovieStore>, retry_delay: Duration) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            store,
            retry_delay,
            inner: Mutex::new(ControllerState::default()),
            events,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> FetchState {
        self.inner.lock().await.view.clone()
    }

    pub async fn phase(&self) -> FetchPhase {
        self.inner.lock().await.phase
    }

    /// Fetches the collection and replaces `movies` on success. Failures are
    /// recorded in the state rather than returned. The returned future is
    /// `'static` so callers can spawn it.
    pub fn fetch_movies(self: &Arc<Self>) -> BoxFuture<'static, ()> {
        let controller = Arc::clone(self);
        async move {
            let request = {
                let mut guard = controller.inner.lock().await;
                let request = guard.begin_fetch();
                controller.emit(&guard);
                request
            };
            controller.finish_fetch(request).await;
        }
        .boxed()
    }

    /// Schedules the single automatic retry. Returns `false` when the
    /// current phase does not allow it or a retry is already pending.
    pub async fn schedule_retry(self: &Arc<Self>) -> bool {
        let mut guard = self.inner.lock().await;
        self.schedule_retry_locked(&mut guard)
    }

    /// Cancels exactly the pending retry timer, if any. Leaves `error` set.
    pub async fn cancel_retry(&self) -> bool {
        let mut guard = self.inner.lock().await;
        let Some(pending) = guard.pending_retry.take() else {
            return false;
        };
        pending.handle.abort();
        guard.apply(FetchEvent::CancelRetry);
        guard.view.is_retrying = false;
        debug!(token = pending.token, "cancelled pending retry");
        self.emit(&guard);
        true
    }

    /// Creates a movie remotely. `movies` is not updated; the new record
    /// shows up on the next fetch.
    pub async fn create_movie(&self, movie: NewMovie) -> Result<Movie, ControllerError> {
        if let Some(reason) = movie.validation_error() {
            return Err(ControllerError::Validation(reason));
        }

        match self.store.create_movie(&movie).await {
            Ok(created) => {
                info!(id = %created.id, title = %created.title, "created movie");
                Ok(created)
            }
            Err(err) => {
                warn!(error = %err, "create movie failed");
                self.record_error(CREATE_FAILED_MESSAGE).await;
                Err(err.into())
            }
        }
    }

    /// Deletes remotely, then drops the matching entry from `movies`. On
    /// failure `movies` is left as it was.
    pub async fn delete_movie(&self, id: &MovieId) -> Result<(), ControllerError> {
        if let Err(err) = self.store.delete_movie(id).await {
            warn!(%id, error = %err, "delete movie failed");
            self.record_error(DELETE_FAILED_MESSAGE).await;
            return Err(err.into());
        }

        let mut guard = self.inner.lock().await;
        if let Some(index) = guard.view.movies.iter().position(|m| m.id.same_as(id)) {
            guard.view.movies.remove(index);
        }
        info!(%id, "deleted movie");
        self.emit(&guard);
        Ok(())
    }

    async fn finish_fetch(self: &Arc<Self>, request: u64) {
        let result = self.store.list_movies().await;

        let mut guard = self.inner.lock().await;
        if guard.latest_request != request {
            debug!(
                request,
                latest = guard.latest_request,
                "discarding result of superseded fetch"
            );
            return;
        }

        match result {
            Ok(raw) => {
                let movies = to_movies(raw);
                info!(count = movies.len(), "fetched movies");
                guard.apply(FetchEvent::Succeeded);
                guard.view.movies = movies;
                guard.view.is_loading = false;
                guard.view.error = None;
                self.emit(&guard);
            }
            Err(err) => {
                log_fetch_failure(&err);
                guard.apply(FetchEvent::Failed);
                guard.view.is_loading = false;
                guard.view.error = Some(FETCH_FAILED_MESSAGE.to_string());
                self.emit(&guard);
                self.schedule_retry_locked(&mut guard);
            }
        }
    }

    fn schedule_retry_locked(self: &Arc<Self>, state: &mut ControllerState) -> bool {
        if state.pending_retry.is_some() {
            debug!("retry already pending");
            return false;
        }
        if !state.apply(FetchEvent::ScheduleRetry) {
            return false;
        }

        state.next_retry_token += 1;
        let token = state.next_retry_token;
        let delay = self.retry_delay;
        let controller = Arc::clone(self);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            controller.fire_retry(token).await;
        });

        state.pending_retry = Some(PendingRetry { token, handle });
        state.view.is_retrying = true;
        warn!(?delay, "scheduled automatic retry");
        self.emit(state);
        true
    }

    fn fire_retry(self: Arc<Self>, token: u64) -> BoxFuture<'static, ()> {
        async move {
            let request = {
                let mut guard = self.inner.lock().await;
                match &guard.pending_retry {
                    Some(pending) if pending.token == token => {}
                    _ => {
                        debug!(token, "retry timer no longer pending");
                        return;
                    }
                }
                // Detach rather than abort: this is the timer's own task.
                guard.pending_retry = None;
                let request = guard.begin_fetch();
                self.emit(&guard);
                request
            };
            info!("retrying movie fetch");
            self.finish_fetch(request).await;
        }
        .boxed()
    }

    async fn record_error(&self, message: &str) {
        let mut guard = self.inner.lock().await;
        guard.view.error = Some(message.to_string());
        self.emit(&guard);
    }

    fn emit(&self, state: &ControllerState) {
        let _ = self.events.send(ControllerEvent::StateChanged {
            phase: state.phase,
            state: state.view.clone(),
        });
    }
}

fn log_fetch_failure(err: &StoreError) {
    match err {
        StoreError::Status { status, url } => {
            warn!(status, %url, "fetch movies rejected by remote store")
        }
        other => warn!(error = %other, "fetch movies failed"),
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
