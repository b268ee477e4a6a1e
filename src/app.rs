pub mod bootstrap;
pub mod controller;
pub mod scheduler;
pub mod state;

use crate::fetch::FetchCompletion;

pub use bootstrap::run;
pub use controller::{EventOutcome, SessionController};
pub use scheduler::{PollingScheduler, RefreshPeriod, TimerId};
pub use state::{ActiveSymbol, SessionPhase, SessionView, TrackingSession};

/// Everything the cooperative session loop reacts to.
#[derive(Debug)]
pub enum SessionEvent {
    /// A repeat timer fired for the symbol it read from the shared cell.
    Tick { timer: TimerId, symbol: String },
    Completed(FetchCompletion),
}
