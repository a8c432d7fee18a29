use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use regressivos_client::{ClientResult, CycleDetail, RegressivosClient};

use crate::view::{ApplyOutcome, FetchTicket, ViewState};

/// Where the live view gets its data from.
#[async_trait]
pub trait DetailSource: Send + Sync + 'static {
    async fn fetch_detail(&self, cycle_id: &str) -> ClientResult<CycleDetail>;
}

#[async_trait]
impl DetailSource for RegressivosClient {
    async fn fetch_detail(&self, cycle_id: &str) -> ClientResult<CycleDetail> {
        self.cycle_detail(cycle_id).await
    }
}

/// Events emitted by the refresh task after each fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Updated,
    FetchFailed(String),
    /// The view moved to another cycle; the task has stopped.
    Superseded,
}

/// Owns a running refresh task. Dropping it cancels the task.
pub struct RefreshHandle {
    handle: JoinHandle<()>,
    events: mpsc::UnboundedReceiver<ViewEvent>,
}

impl RefreshHandle {
    /// Next event, or `None` once the task has ended.
    pub async fn next_event(&mut self) -> Option<ViewEvent> {
        self.events.recv().await
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Fetches the ticket's cycle right away and then every `period`, applying
/// each result to `state`. Stops by itself once the ticket is superseded.
pub fn spawn_refresh<S: DetailSource>(
    source: Arc<S>,
    state: Arc<Mutex<ViewState>>,
    ticket: FetchTicket,
    period: Duration,
) -> RefreshHandle {
    let (sender, events) = mpsc::unbounded_channel();

    info!(
        cycle_id = ticket.cycle_id(),
        "Starting live refresh (interval: {} seconds)",
        period.as_secs()
    );

    let handle = tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            if !state.lock().await.is_current(&ticket) {
                let _ = sender.send(ViewEvent::Superseded);
                break;
            }

            debug!(cycle_id = ticket.cycle_id(), "Refreshing cycle");
            let result = source.fetch_detail(ticket.cycle_id()).await;

            let outcome = state.lock().await.apply(&ticket, result, Utc::now());
            let event = match outcome {
                ApplyOutcome::Applied => ViewEvent::Updated,
                ApplyOutcome::Failed(message) => ViewEvent::FetchFailed(message),
                ApplyOutcome::Stale => ViewEvent::Superseded,
            };

            let stop = event == ViewEvent::Superseded;
            if sender.send(event).is_err() || stop {
                break;
            }
        }

        debug!(cycle_id = ticket.cycle_id(), "Live refresh stopped");
    });

    RefreshHandle { handle, events }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use regressivos_client::ClientError;
    use regressivos_core::ReleaseTestCycle;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    /// Replays scripted results, then keeps answering with a healthy detail.
    struct ScriptedSource {
        calls: AtomicUsize,
        script: std::sync::Mutex<VecDeque<bool>>,
    }

    impl ScriptedSource {
        fn new(script: &[bool]) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                script: std::sync::Mutex::new(script.iter().copied().collect()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DetailSource for ScriptedSource {
        async fn fetch_detail(&self, cycle_id: &str) -> ClientResult<CycleDetail> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            let ok = self.script.lock().unwrap().pop_front().unwrap_or(true);
            if !ok {
                return Err(ClientError::Network("connection refused".to_string()));
            }
            Ok(CycleDetail {
                cycle: ReleaseTestCycle {
                    id: cycle_id.to_string(),
                    release: format!("fetch-{}", n),
                    ..Default::default()
                },
                records: Vec::new(),
                sla_expired: false,
                time_remaining: None,
            })
        }
    }

    fn view_for(cycle_id: &str) -> (Arc<Mutex<ViewState>>, FetchTicket) {
        let mut view = ViewState::new();
        let ticket = view.switch_to(cycle_id);
        (Arc::new(Mutex::new(view)), ticket)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_immediately_then_every_period() {
        let source = ScriptedSource::new(&[]);
        let (state, ticket) = view_for("r1");
        let start = Instant::now();

        let mut handle = spawn_refresh(source.clone(), state.clone(), ticket, Duration::from_secs(30));

        for _ in 0..3 {
            assert_eq!(handle.next_event().await, Some(ViewEvent::Updated));
        }

        assert_eq!(source.calls(), 3);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(60) && elapsed < Duration::from_secs(61));
        let view = state.lock().await;
        assert_eq!(view.cycle().map(|c| c.release.as_str()), Some("fetch-2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_previous_view() {
        let source = ScriptedSource::new(&[true, false]);
        let (state, ticket) = view_for("r1");

        let mut handle = spawn_refresh(source, state.clone(), ticket, Duration::from_secs(30));

        assert_eq!(handle.next_event().await, Some(ViewEvent::Updated));
        assert!(matches!(
            handle.next_event().await,
            Some(ViewEvent::FetchFailed(_))
        ));

        let view = state.lock().await;
        assert_eq!(view.cycle().map(|c| c.release.as_str()), Some("fetch-0"));
        assert!(view.last_error().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_fetching() {
        let source = ScriptedSource::new(&[]);
        let (state, ticket) = view_for("r1");

        let mut handle = spawn_refresh(source.clone(), state, ticket, Duration::from_secs(30));
        assert_eq!(handle.next_event().await, Some(ViewEvent::Updated));

        handle.cancel();
        assert_eq!(handle.next_event().await, None);

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_aborts_task() {
        let source = ScriptedSource::new(&[]);
        let (state, ticket) = view_for("r1");

        let mut handle = spawn_refresh(source.clone(), state, ticket, Duration::from_secs(30));
        assert_eq!(handle.next_event().await, Some(ViewEvent::Updated));
        drop(handle);

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_switching_view_stops_old_task() {
        let source = ScriptedSource::new(&[]);
        let (state, ticket) = view_for("r1");

        let mut handle = spawn_refresh(source.clone(), state.clone(), ticket, Duration::from_secs(30));
        assert_eq!(handle.next_event().await, Some(ViewEvent::Updated));

        let new_ticket = state.lock().await.switch_to("r2");

        assert_eq!(handle.next_event().await, Some(ViewEvent::Superseded));
        assert_eq!(handle.next_event().await, None);
        assert_eq!(source.calls(), 1);

        let view = state.lock().await;
        assert!(view.is_current(&new_ticket));
        assert!(view.cycle().is_none());
    }
}
