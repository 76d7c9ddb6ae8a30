use quiz::SessionConfig;
use tokio::sync::{broadcast, oneshot};

use super::events::SessionEvent;
use super::snapshot::SessionSnapshot;

#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid session config: {0}")]
    InvalidConfig(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Commands sent to the session actor. Each embeds a oneshot for the reply.
///
/// Submit and Quit always reply with the resulting snapshot: an out-of-window
/// submission is a silent no-op, so there is no error to report.
pub enum SessionCommand {
    Start {
        config: SessionConfig,
        reply: oneshot::Sender<Result<SessionSnapshot, SessionError>>,
    },
    Submit {
        answer: i64,
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Quit {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    GetSnapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Subscribe {
        reply: oneshot::Sender<(SessionSnapshot, broadcast::Receiver<SessionEvent>)>,
    },
    Shutdown,
}
