//! The drill session controller: a single-session state machine run as a
//! tokio actor. Commands go in over a channel, snapshots come back, and every
//! mutation is broadcast to subscribers. The actor owns the countdown, the
//! feedback display windows, the advance decision and the history mediation;
//! the presentation layer only ever sees snapshots and the
//! start/submit/quit surface.

pub mod actor;
pub mod commands;
pub mod events;
pub mod handle;
pub mod notify;
pub mod persistence;
pub mod snapshot;
pub mod state;

use std::sync::Arc;

use quiz_client::QuestionService;
use tokio::sync::{broadcast, mpsc};

use actor::run_session_actor;
pub use commands::SessionError;
pub use events::SessionEvent;
pub use handle::SessionHandle;
pub use notify::{NoopNotify, Notify};
pub use persistence::{HistoryStore, PersistenceError, DEFAULT_HISTORY_CAPACITY};
pub use snapshot::{Feedback, SessionSnapshot, SessionStatus};
use state::SessionState;

/// Spawn a session controller actor and return its handle. One controller
/// instance owns exactly one session at a time; `start()` on a running
/// controller begins a fresh run.
pub fn spawn_controller(
    service: Arc<dyn QuestionService>,
    history: Arc<HistoryStore>,
    notify: Arc<dyn Notify>,
) -> SessionHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    let (event_tx, _) = broadcast::channel(100);

    let state = SessionState::new(service, history, notify);
    tokio::spawn(run_session_actor(state, cmd_rx, event_tx));

    SessionHandle::new(cmd_tx)
}
