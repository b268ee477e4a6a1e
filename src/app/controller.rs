use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::error::{FetchError, FETCH_SYMBOL_REQUIRED, START_SYMBOL_REQUIRED};
use crate::fetch::{
    FetchCompletion, FetchCoordinator, QuoteProvider, RequestId, RequestOrigin, RequestTag,
};
use crate::records::RowStore;
use crate::utils::normalize_symbol;

use super::scheduler::{FetchIssuer, PollingScheduler, RefreshPeriod};
use super::state::{SessionPhase, SessionView, TrackingSession};
use super::SessionEvent;

/// Result of feeding one event to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// A row was upserted.
    Applied(String),
    /// The request failed and the error message was set.
    Failed(String),
    /// The response belonged to a superseded session.
    Discarded(String),
    /// A tick started a new request.
    Issued(RequestId),
    /// Tick from a timer that is no longer armed.
    Ignored,
}

impl EventOutcome {
    pub fn changes_view(&self) -> bool {
        matches!(self, EventOutcome::Applied(_) | EventOutcome::Failed(_))
    }
}

/// Requests in flight and the channel their completions come back on.
struct RequestLedger {
    coordinator: FetchCoordinator,
    in_flight: HashMap<RequestId, RequestOrigin>,
    events: UnboundedSender<SessionEvent>,
}

impl RequestLedger {
    fn dispatch(&mut self, symbol: &str, origin: RequestOrigin) -> RequestId {
        let events = self.events.clone();
        let (id, _task) = self.coordinator.dispatch(
            symbol.to_string(),
            origin.clone(),
            move |completion| {
                let _ = events.send(SessionEvent::Completed(completion));
            },
        );
        self.in_flight.insert(id, origin);
        id
    }

    fn any_applicable(&self, active_symbol: &str) -> bool {
        self.in_flight
            .values()
            .any(|origin| origin.applies_to(active_symbol))
    }
}

impl FetchIssuer for RequestLedger {
    fn issue(&mut self, symbol: &str) {
        self.dispatch(symbol, RequestOrigin::Tracked(RequestTag::new(symbol)));
    }
}

/// Coordinates start/stop/fetch-once actions, the row store and user-facing flags.
pub struct SessionController {
    session: TrackingSession,
    scheduler: PollingScheduler,
    requests: RequestLedger,
    events_rx: UnboundedReceiver<SessionEvent>,
    rows: RowStore,
    error: Option<String>,
    auto_refresh_message: String,
}

impl SessionController {
    pub fn new(provider: Arc<dyn QuoteProvider>) -> Self {
        let (events, events_rx) = mpsc::unbounded_channel();
        Self {
            session: TrackingSession::default(),
            scheduler: PollingScheduler::new(),
            requests: RequestLedger {
                coordinator: FetchCoordinator::new(provider),
                in_flight: HashMap::new(),
                events,
            },
            events_rx,
            rows: RowStore::new(),
            error: None,
            auto_refresh_message: String::new(),
        }
    }

    /// Mirror the symbol text field.
    pub fn set_symbol_input(&mut self, raw: &str) {
        self.session.symbol_input = raw.to_uppercase();
    }

    /// Start tracking from raw minute/second fields.
    pub fn start_tracking(
        &mut self,
        symbol: &str,
        minutes: &str,
        seconds: &str,
    ) -> Result<(), FetchError> {
        self.start_tracking_with(symbol, RefreshPeriod::from_inputs(minutes, seconds))
    }

    pub fn start_tracking_with(
        &mut self,
        symbol: &str,
        period: RefreshPeriod,
    ) -> Result<(), FetchError> {
        let Some(symbol) = normalize_symbol(symbol) else {
            self.error = Some(START_SYMBOL_REQUIRED.to_string());
            return Err(FetchError::InvalidSymbol);
        };

        info!("tracking {symbol} every {}s", period.total_seconds());
        self.error = None;
        self.session.active.set(&symbol);
        self.session.symbol_input = symbol.clone();
        self.session.period = period;

        self.scheduler.arm(
            &symbol,
            period,
            self.session.active.clone(),
            self.requests.events.clone(),
            &mut self.requests,
        );
        self.auto_refresh_message = period.describe(&symbol);
        Ok(())
    }

    /// Fetch the symbol field once without touching the timer.
    pub fn manual_refresh(&mut self) -> Result<RequestId, FetchError> {
        let Some(symbol) = normalize_symbol(&self.session.symbol_input) else {
            self.error = Some(FETCH_SYMBOL_REQUIRED.to_string());
            return Err(FetchError::InvalidSymbol);
        };
        self.error = None;
        Ok(self.requests.dispatch(&symbol, RequestOrigin::Manual))
    }

    /// Disarm the timer; rows stay, in-flight tracked responses become stale.
    pub fn stop_tracking(&mut self) {
        self.scheduler.disarm();
        self.session.active.clear();
        self.auto_refresh_message.clear();
        info!("tracking stopped");
    }

    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events_rx.recv().await
    }

    pub fn try_next_event(&mut self) -> Option<SessionEvent> {
        self.events_rx.try_recv().ok()
    }

    pub fn handle_event(&mut self, event: SessionEvent) -> EventOutcome {
        match event {
            SessionEvent::Tick { timer, symbol } => {
                if !self.scheduler.is_current(timer) {
                    debug!("ignoring tick from disarmed timer #{timer}");
                    return EventOutcome::Ignored;
                }
                let id = self
                    .requests
                    .dispatch(&symbol, RequestOrigin::Tracked(RequestTag::new(&symbol)));
                EventOutcome::Issued(id)
            }
            SessionEvent::Completed(completion) => self.complete(completion),
        }
    }

    fn complete(&mut self, completion: FetchCompletion) -> EventOutcome {
        self.requests.in_flight.remove(&completion.id);
        let symbol = completion.symbol.clone();
        let active = self.session.active.get();

        match completion.into_fresh_result(&active) {
            Ok(observation) => {
                let key = observation.symbol.clone();
                self.rows.upsert(observation);
                self.error = None;
                info!("updated {key}");
                EventOutcome::Applied(key)
            }
            Err(err @ FetchError::Stale { .. }) => {
                debug!("discarding response: {err}");
                EventOutcome::Discarded(symbol)
            }
            Err(err) => {
                self.error = Some(err.user_message().to_string());
                EventOutcome::Failed(symbol)
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.requests.any_applicable(&self.session.active.get())
    }

    pub fn phase(&self) -> SessionPhase {
        if self.is_loading() {
            SessionPhase::Loading
        } else if self.scheduler.is_armed() {
            SessionPhase::Tracking
        } else {
            SessionPhase::Idle
        }
    }

    pub fn rows(&self) -> &RowStore {
        &self.rows
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn auto_refresh_message(&self) -> &str {
        &self.auto_refresh_message
    }

    pub fn active_symbol(&self) -> String {
        self.session.active.get()
    }

    pub fn period(&self) -> RefreshPeriod {
        self.session.period
    }

    pub fn provider_name(&self) -> &str {
        self.requests.coordinator.provider_name()
    }

    pub fn view(&self) -> SessionView<'_> {
        SessionView {
            rows: self.rows.snapshot(),
            auto_refresh_message: &self.auto_refresh_message,
            loading: self.is_loading(),
            error: self.error.as_deref(),
            phase: self.phase(),
            active_symbol: self.session.active.get(),
            symbol_input: &self.session.symbol_input,
        }
    }
}
