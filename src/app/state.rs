use std::sync::{Arc, PoisonError, RwLock};

use crate::fetch::Observation;

use super::scheduler::RefreshPeriod;

/// Shared cell holding the tracked symbol.
///
/// Written only by the session controller; the repeat timer reads it on every
/// tick so a changed symbol is refreshed without re-arming.
#[derive(Debug, Clone, Default)]
pub struct ActiveSymbol(Arc<RwLock<String>>);

impl ActiveSymbol {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> String {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn set(&self, symbol: &str) {
        let mut guard = self.0.write().unwrap_or_else(PoisonError::into_inner);
        guard.clear();
        guard.push_str(symbol);
    }

    pub(crate) fn clear(&self) {
        self.set("");
    }

    pub fn is_empty(&self) -> bool {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

/// What the user is tracking and how often.
#[derive(Debug, Default)]
pub struct TrackingSession {
    pub active: ActiveSymbol,
    pub period: RefreshPeriod,
    /// Contents of the symbol field, upper-cased as typed.
    pub symbol_input: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Loading,
    Tracking,
}

/// Read-only state handed to renderers.
#[derive(Debug)]
pub struct SessionView<'a> {
    pub rows: &'a [Observation],
    pub auto_refresh_message: &'a str,
    pub loading: bool,
    pub error: Option<&'a str>,
    pub phase: SessionPhase,
    pub active_symbol: String,
    pub symbol_input: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_symbol() {
        let active = ActiveSymbol::new();
        let reader = active.clone();
        assert!(reader.is_empty());

        active.set("SBIN");
        assert_eq!(reader.get(), "SBIN");

        active.clear();
        assert!(reader.is_empty());
    }
}
