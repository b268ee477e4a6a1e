use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::utils::coerce_non_negative;

use super::state::ActiveSymbol;
use super::SessionEvent;

pub type TimerId = u64;

/// Upper bound for each interval field, in seconds (one year).
pub const MAX_REFRESH_SECONDS: u64 = 365 * 24 * 60 * 60;

/// Repeat interval split the way the user entered it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshPeriod {
    pub minutes: u64,
    pub seconds: u64,
}

impl RefreshPeriod {
    /// Fields are clamped so the timer deadline always fits in an `Instant`.
    pub fn new(minutes: u64, seconds: u64) -> Self {
        Self {
            minutes: minutes.min(MAX_REFRESH_SECONDS / 60),
            seconds: seconds.min(MAX_REFRESH_SECONDS),
        }
    }

    /// Build from raw form fields; anything non-numeric or negative counts as 0.
    pub fn from_inputs(minutes: &str, seconds: &str) -> Self {
        Self::new(coerce_non_negative(minutes), coerce_non_negative(seconds))
    }

    pub fn total_seconds(&self) -> u64 {
        self.minutes.saturating_mul(60).saturating_add(self.seconds)
    }

    pub fn is_repeating(&self) -> bool {
        self.total_seconds() > 0
    }

    pub fn as_duration(&self) -> Option<Duration> {
        self.is_repeating()
            .then(|| Duration::from_secs(self.total_seconds()))
    }

    /// Human-readable auto-refresh line; empty when nothing repeats.
    pub fn describe(&self, symbol: &str) -> String {
        if !self.is_repeating() {
            return String::new();
        }

        let mut parts = Vec::with_capacity(2);
        if self.minutes > 0 {
            parts.push(format!("{} minute(s)", self.minutes));
        }
        if self.seconds > 0 {
            parts.push(format!("{} second(s)", self.seconds));
        }
        format!("Auto-refreshing {symbol} every {}.", parts.join(" and "))
    }
}

/// Receives the immediate fetch issued when a session is armed.
pub trait FetchIssuer {
    fn issue(&mut self, symbol: &str);
}

struct TimerHandle {
    id: TimerId,
    task: JoinHandle<()>,
}

/// Owns the single repeat timer of a tracking session.
pub struct PollingScheduler {
    timer: Option<TimerHandle>,
    next_id: TimerId,
}

impl Default for PollingScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl PollingScheduler {
    pub fn new() -> Self {
        Self {
            timer: None,
            next_id: 1,
        }
    }

    /// Disarm, fetch `symbol` once, then tick every period for the symbol
    /// held in `active` at tick time. A zero period arms no timer.
    pub fn arm<I: FetchIssuer>(
        &mut self,
        symbol: &str,
        period: RefreshPeriod,
        active: ActiveSymbol,
        ticks: UnboundedSender<SessionEvent>,
        issuer: &mut I,
    ) -> Option<TimerId> {
        self.disarm();
        issuer.issue(symbol);

        let every = period.as_duration()?;
        let Some(first_tick) = Instant::now().checked_add(every) else {
            warn!("refresh interval of {}s is out of range", every.as_secs());
            return None;
        };
        let id = self.next_id;
        self.next_id += 1;

        info!("arming refresh timer #{id} every {}s", every.as_secs());
        let task = tokio::spawn(async move {
            let mut ticker = interval_at(first_tick, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let symbol = active.get();
                if symbol.is_empty() {
                    continue;
                }
                debug!("timer #{id} tick for {symbol}");
                if ticks.send(SessionEvent::Tick { timer: id, symbol }).is_err() {
                    break;
                }
            }
        });

        self.timer = Some(TimerHandle { id, task });
        Some(id)
    }

    /// Cancel the live timer, if any. In-flight requests are left alone.
    pub fn disarm(&mut self) {
        if let Some(timer) = self.timer.take() {
            info!("disarming refresh timer #{}", timer.id);
            timer.task.abort();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.timer.is_some()
    }

    /// Ticks from a disarmed timer may still sit in the event queue.
    pub fn is_current(&self, timer: TimerId) -> bool {
        self.timer.as_ref().map_or(false, |handle| handle.id == timer)
    }
}

impl Drop for PollingScheduler {
    fn drop(&mut self) {
        self.disarm();
    }
}
