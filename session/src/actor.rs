use std::sync::Arc;
use std::time::Duration;

use quiz::{HistoryEntry, Question, QuestionResult, Verdict};
use quiz_client::ServiceResult;
use tokio::sync::{broadcast, mpsc};
use tokio::time;
use tracing::Instrument;

use super::commands::{SessionCommand, SessionError};
use super::events::SessionEvent;
use super::state::{Advance, SessionState, Tick};

/// Coarse cadence for the countdown; the timer itself is deadline-based, the
/// interval only bounds display latency.
const TICK_PERIOD: Duration = Duration::from_millis(200);

/// Completion of a spawned service round trip, tagged with the epoch current
/// when it was issued. A completion from an older epoch is stale and dropped.
pub(crate) struct ServiceOutcome {
    epoch: u64,
    kind: OutcomeKind,
}

enum OutcomeKind {
    Fetched(ServiceResult<Question>),
    Checked(ServiceResult<Verdict>),
}

/// The main session actor loop.
/// Owns all mutable state. Processes commands, service completions, the
/// countdown and the pending advance sequentially, never two at once.
pub(crate) async fn run_session_actor(
    state: SessionState,
    cmd_rx: mpsc::Receiver<SessionCommand>,
    event_tx: broadcast::Sender<SessionEvent>,
) {
    run_session_actor_inner(state, cmd_rx, event_tx)
        .instrument(tracing::info_span!("session"))
        .await;
}

async fn run_session_actor_inner(
    mut state: SessionState,
    mut cmd_rx: mpsc::Receiver<SessionCommand>,
    event_tx: broadcast::Sender<SessionEvent>,
) {
    tracing::debug!("Session actor started");

    let (io_tx, mut io_rx) = mpsc::channel::<ServiceOutcome>(16);

    let mut ticker = time::interval(TICK_PERIOD);
    ticker.set_missed_tick_behavior(time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(SessionCommand::Shutdown) | None => {
                        tracing::debug!("Session actor shutting down");
                        break;
                    }
                    Some(cmd) => handle_command(&mut state, cmd, &event_tx, &io_tx),
                }
            }

            Some(outcome) = io_rx.recv() => {
                handle_service_outcome(&mut state, outcome, &event_tx);
            }

            _ = advance_elapsed(&state) => {
                handle_advance(&mut state, &event_tx, &io_tx);
            }

            _ = ticker.tick(), if state.countdown_running() => {
                match state.tick_countdown() {
                    Tick::Expired => {
                        // The question ran out of time with no verdict.
                        record_attempt(&state, QuestionResult::TimedOut, state.time_per_question());
                        state.notify.verdict(QuestionResult::TimedOut);
                        let _ = event_tx.send(SessionEvent::StateChanged(state.snapshot()));
                    }
                    Tick::Display => {
                        let _ = event_tx.send(SessionEvent::StateChanged(state.snapshot()));
                    }
                    Tick::Quiet => {}
                }
            }
        }
    }

    tracing::debug!("Session actor exited");
}

/// Resolves when the pending advance deadline passes; parked forever when no
/// advance is pending.
async fn advance_elapsed(state: &SessionState) {
    match state.advance_deadline() {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn handle_command(
    state: &mut SessionState,
    cmd: SessionCommand,
    event_tx: &broadcast::Sender<SessionEvent>,
    io_tx: &mpsc::Sender<ServiceOutcome>,
) {
    match cmd {
        SessionCommand::Start { config, reply } => {
            if let Err(e) = config.validate() {
                let _ = reply.send(Err(SessionError::InvalidConfig(e.to_string())));
                return;
            }
            state.begin_session(config);
            spawn_fetch(state, io_tx);
            let snap = state.snapshot();
            let _ = event_tx.send(SessionEvent::StateChanged(snap.clone()));
            let _ = reply.send(Ok(snap));
        }
        SessionCommand::Submit { answer, reply } => {
            if state.accept_submission().is_some() {
                spawn_check(state, answer, io_tx);
            } else {
                tracing::debug!(answer, "Submission ignored outside an answerable window");
            }
            let _ = reply.send(state.snapshot());
        }
        SessionCommand::Quit { reply } => {
            state.reset_to_idle();
            let snap = state.snapshot();
            let _ = event_tx.send(SessionEvent::StateChanged(snap.clone()));
            let _ = reply.send(snap);
        }
        SessionCommand::GetSnapshot { reply } => {
            let _ = reply.send(state.snapshot());
        }
        SessionCommand::Subscribe { reply } => {
            let snapshot = state.snapshot();
            let rx = event_tx.subscribe();
            let _ = reply.send((snapshot, rx));
        }
        SessionCommand::Shutdown => unreachable!(),
    }
}

fn handle_service_outcome(
    state: &mut SessionState,
    outcome: ServiceOutcome,
    event_tx: &broadcast::Sender<SessionEvent>,
) {
    if outcome.epoch != state.epoch {
        tracing::debug!("Dropping stale service completion");
        return;
    }

    match outcome.kind {
        OutcomeKind::Fetched(Ok(question)) => {
            if !state.expecting_question() {
                return;
            }
            state.install_question(question);
            let _ = event_tx.send(SessionEvent::StateChanged(state.snapshot()));
        }
        OutcomeKind::Fetched(Err(e)) => {
            // No retry: the session aborts with no partial state retained.
            tracing::warn!("Question fetch failed: {e}");
            state.reset_to_idle();
            let _ = event_tx.send(SessionEvent::Error(format!("Unable to load a question: {e}")));
            let _ = event_tx.send(SessionEvent::StateChanged(state.snapshot()));
        }
        OutcomeKind::Checked(Ok(verdict)) => {
            let Some((result, elapsed)) = state.apply_verdict(verdict.correct) else {
                return;
            };
            record_attempt(state, result, elapsed);
            state.notify.verdict(result);
            let _ = event_tx.send(SessionEvent::StateChanged(state.snapshot()));
        }
        OutcomeKind::Checked(Err(e)) => {
            // State unchanged; the caller may resubmit.
            tracing::warn!("Answer check failed: {e}");
            state.check_failed();
            let _ = event_tx.send(SessionEvent::Error(format!("Could not check the answer: {e}")));
        }
    }
}

fn handle_advance(
    state: &mut SessionState,
    event_tx: &broadcast::Sender<SessionEvent>,
    io_tx: &mpsc::Sender<ServiceOutcome>,
) {
    match state.take_advance() {
        Advance::Finish => {
            let _ = event_tx.send(SessionEvent::StateChanged(state.snapshot()));
        }
        Advance::FetchNext => {
            // Feedback stays on screen until the new question lands.
            spawn_fetch(state, io_tx);
        }
    }
}

fn spawn_fetch(state: &SessionState, io_tx: &mpsc::Sender<ServiceOutcome>) {
    let Some(config) = state.config.clone() else {
        return;
    };
    let service = Arc::clone(&state.service);
    let epoch = state.epoch;
    let tx = io_tx.clone();
    tokio::spawn(async move {
        let result = service.fetch_question(&config).await;
        let _ = tx
            .send(ServiceOutcome {
                epoch,
                kind: OutcomeKind::Fetched(result),
            })
            .await;
    });
}

fn spawn_check(state: &SessionState, answer: i64, io_tx: &mpsc::Sender<ServiceOutcome>) {
    let Some(question) = state.question.clone() else {
        return;
    };
    let Some(mode) = state.mode() else {
        return;
    };
    let service = Arc::clone(&state.service);
    let epoch = state.epoch;
    let tx = io_tx.clone();
    tokio::spawn(async move {
        let result = service.check_answer(&question.operands, answer, mode).await;
        let _ = tx
            .send(ServiceOutcome {
                epoch,
                kind: OutcomeKind::Checked(result),
            })
            .await;
    });
}

/// Append exactly one history entry for a terminal verdict. Failures are
/// logged, never fatal to the session.
fn record_attempt(state: &SessionState, result: QuestionResult, time_taken_secs: u32) {
    let Some(label) = state.question_label() else {
        return;
    };
    let entry = HistoryEntry::new(label, result, time_taken_secs);
    if let Err(e) = state.history.append(&entry) {
        tracing::warn!("Failed to record attempt: {e}");
    }
}
