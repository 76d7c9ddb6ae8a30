use std::sync::Arc;
use std::time::Duration;

use quiz::{OpKind, Question, SessionConfig};
use quiz_client::QuestionService;
use tokio::time::Instant;

use super::notify::Notify;
use super::persistence::HistoryStore;
use super::snapshot::{Feedback, SessionSnapshot, SessionStatus};

/// Display window after a correct answer, tuned short to keep the pace brisk.
pub(crate) const CORRECT_FEEDBACK_DELAY: Duration = Duration::from_millis(400);
/// Display window after a wrong or timed-out answer.
pub(crate) const WRONG_FEEDBACK_DELAY: Duration = Duration::from_millis(1500);

/// Internal mutable state, owned entirely by the session actor. No locks.
pub(crate) struct SessionState {
    pub service: Arc<dyn QuestionService>,
    pub history: Arc<HistoryStore>,
    pub notify: Arc<dyn Notify>,

    pub config: Option<SessionConfig>,
    pub status: SessionStatus,
    pub question: Option<Question>,
    pub score: u32,
    pub streak: u32,
    pub question_count: u32,
    pub feedback: Feedback,
    pub countdown: CountdownTimer,

    /// Elapsed whole seconds latched when a submission was accepted; Some
    /// while the answer check round trip is outstanding.
    pub check_in_flight: Option<u32>,
    /// Deadline of the single pending advance. Owned here, nowhere else, so
    /// the timeout and correct/wrong paths cannot race each other.
    pub advance_at: Option<Instant>,
    /// Set between the advance decision and the next question's arrival.
    pub advancing: bool,
    /// Generation counter; service completions from an older epoch are stale.
    pub epoch: u64,
}

/// What to do once the feedback display window has elapsed.
pub(crate) enum Advance {
    Finish,
    FetchNext,
}

/// Outcome of one countdown tick.
pub(crate) enum Tick {
    /// Remaining time hit zero; the TimedOut transition was applied.
    Expired,
    /// The displayed whole-seconds value changed.
    Display,
    Quiet,
}

impl SessionState {
    pub fn new(
        service: Arc<dyn QuestionService>,
        history: Arc<HistoryStore>,
        notify: Arc<dyn Notify>,
    ) -> Self {
        Self {
            service,
            history,
            notify,
            config: None,
            status: SessionStatus::Idle,
            question: None,
            score: 0,
            streak: 0,
            question_count: 0,
            feedback: Feedback::None,
            countdown: CountdownTimer::idle(),
            check_in_flight: None,
            advance_at: None,
            advancing: false,
            epoch: 0,
        }
    }

    /// Build a full snapshot of the current state.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            question: self.question.clone(),
            score: self.score,
            streak: self.streak,
            question_count: self.question_count,
            total_questions: self.total_questions(),
            time_per_question: self.time_per_question(),
            time_left: self.countdown.secs_left(),
            feedback: self.feedback,
            mode: self.mode(),
        }
    }

    pub fn mode(&self) -> Option<OpKind> {
        self.config.as_ref().map(|c| c.mode())
    }

    pub fn time_per_question(&self) -> u32 {
        self.config.as_ref().map_or(0, |c| c.time_per_question)
    }

    pub fn total_questions(&self) -> u32 {
        self.config.as_ref().map_or(0, |c| c.total_questions)
    }

    /// Display label of the current question, if any.
    pub fn question_label(&self) -> Option<String> {
        let question = self.question.as_ref()?;
        Some(question.label(self.mode()?))
    }

    /// Reset everything and enter Loading for a fresh run. Bumps the epoch so
    /// completions belonging to a previous run are discarded.
    pub fn begin_session(&mut self, config: SessionConfig) {
        self.epoch += 1;
        self.config = Some(config);
        self.status = SessionStatus::Loading;
        self.question = None;
        self.score = 0;
        self.streak = 0;
        self.question_count = 0;
        self.feedback = Feedback::None;
        self.countdown = CountdownTimer::idle();
        self.check_in_flight = None;
        self.advance_at = None;
        self.advancing = false;
    }

    /// Discard the run entirely: quit, or an aborting fetch failure. The only
    /// path back to Idle. Invalidates in-flight fetches and checks and stops
    /// the countdown.
    pub fn reset_to_idle(&mut self) {
        self.epoch += 1;
        self.config = None;
        self.status = SessionStatus::Idle;
        self.question = None;
        self.score = 0;
        self.streak = 0;
        self.question_count = 0;
        self.feedback = Feedback::None;
        self.countdown = CountdownTimer::idle();
        self.check_in_flight = None;
        self.advance_at = None;
        self.advancing = false;
    }

    /// True while a fetched question would be welcome: the initial load, or
    /// the gap between an advance decision and the next question's arrival.
    pub fn expecting_question(&self) -> bool {
        self.status == SessionStatus::Loading || self.advancing
    }

    /// Install a freshly fetched question and (re-)enter Active with a full
    /// countdown. The first install serves index 0; later installs advance
    /// the index and clear the feedback window atomically.
    pub fn install_question(&mut self, question: Question) {
        if self.status != SessionStatus::Loading {
            self.question_count += 1;
        }
        self.advancing = false;
        self.question = Some(question);
        self.feedback = Feedback::None;
        self.status = SessionStatus::Active;
        self.countdown
            .start(Duration::from_secs(u64::from(self.time_per_question())));
    }

    /// Gate a submission. Returns the latched elapsed whole seconds when the
    /// submission is accepted; None means the silent no-op case (not Active,
    /// feedback window open, no question, or a check already in flight).
    pub fn accept_submission(&mut self) -> Option<u32> {
        if self.status != SessionStatus::Active
            || !self.feedback.is_none()
            || self.question.is_none()
            || self.check_in_flight.is_some()
        {
            return None;
        }
        self.countdown.stop();
        let elapsed = self
            .time_per_question()
            .saturating_sub(self.countdown.secs_left());
        self.check_in_flight = Some(elapsed);
        Some(elapsed)
    }

    /// Apply a verdict for the in-flight check. Returns the terminal result
    /// and the latched elapsed seconds, or None when no check was in flight
    /// (e.g. the check resolved after a restart bumped the epoch guard).
    pub fn apply_verdict(&mut self, correct: bool) -> Option<(quiz::QuestionResult, u32)> {
        let elapsed = self.check_in_flight.take()?;
        let (result, delay) = if correct {
            self.score += 1;
            self.streak += 1;
            self.feedback = Feedback::Correct;
            (quiz::QuestionResult::Correct, CORRECT_FEEDBACK_DELAY)
        } else {
            self.streak = 0;
            self.feedback = Feedback::Wrong;
            (quiz::QuestionResult::Wrong, WRONG_FEEDBACK_DELAY)
        };
        self.advance_at = Some(Instant::now() + delay);
        Some((result, elapsed))
    }

    /// The check round trip failed: no transition, no history write. The
    /// countdown resumes so the caller can retry against the same clock.
    pub fn check_failed(&mut self) {
        if self.check_in_flight.take().is_some() {
            self.countdown.resume();
        }
    }

    /// Forced transition when the countdown expires with no verdict.
    pub fn expire_question(&mut self) {
        self.streak = 0;
        self.feedback = Feedback::TimedOut;
        self.advance_at = Some(Instant::now() + WRONG_FEEDBACK_DELAY);
    }

    /// Whether ticks should be processed at all.
    pub fn countdown_running(&self) -> bool {
        self.status == SessionStatus::Active
            && self.feedback.is_none()
            && self.check_in_flight.is_none()
            && self.countdown.is_running()
    }

    /// Deduct elapsed time; applies the TimedOut transition on expiry.
    pub fn tick_countdown(&mut self) -> Tick {
        let before = self.countdown.secs_left();
        if self.countdown.tick() {
            self.expire_question();
            Tick::Expired
        } else if self.countdown.secs_left() != before {
            Tick::Display
        } else {
            Tick::Quiet
        }
    }

    pub fn advance_deadline(&self) -> Option<Instant> {
        self.advance_at
    }

    /// The display window has elapsed: either the run is over, or the next
    /// question must be fetched. Feedback stays visible until the next
    /// question is installed.
    pub fn take_advance(&mut self) -> Advance {
        self.advance_at = None;
        if self.question_count + 1 >= self.total_questions() {
            self.status = SessionStatus::Finished;
            self.question = None;
            self.feedback = Feedback::None;
            self.countdown = CountdownTimer::idle();
            Advance::Finish
        } else {
            self.advancing = true;
            Advance::FetchNext
        }
    }
}

/// Per-question countdown. Deadline-based: remaining time is deducted from a
/// monotonic last-tick instant rather than counted in whole ticks, so a
/// coarse tick interval still yields accurate whole-second displays.
///
/// Uses `tokio::time::Instant` so the whole state machine can be driven
/// under paused test time.
pub(crate) struct CountdownTimer {
    remaining: Duration,
    running: bool,
    last_tick: Instant,
}

impl CountdownTimer {
    pub fn idle() -> Self {
        Self {
            remaining: Duration::ZERO,
            running: false,
            last_tick: Instant::now(),
        }
    }

    /// Arm the countdown with the full per-question budget.
    pub fn start(&mut self, full: Duration) {
        self.remaining = full;
        self.running = true;
        self.last_tick = Instant::now();
    }

    /// Deduct time elapsed since the previous tick.
    /// Returns true when the countdown just expired.
    pub fn tick(&mut self) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_tick);
        self.last_tick = now;
        self.tick_with_elapsed(elapsed)
    }

    /// Tick with a specific elapsed duration (useful for testing).
    pub fn tick_with_elapsed(&mut self, elapsed: Duration) -> bool {
        if !self.running {
            return false;
        }
        self.remaining = self.remaining.saturating_sub(elapsed);
        if self.remaining.is_zero() {
            self.running = false;
            true
        } else {
            false
        }
    }

    /// Flush any outstanding elapsed time, then stop.
    pub fn stop(&mut self) {
        self.tick();
        self.running = false;
    }

    /// Re-arm after a stop without refunding time.
    pub fn resume(&mut self) {
        if !self.remaining.is_zero() {
            self.last_tick = Instant::now();
            self.running = true;
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Remaining whole seconds, rounded up so a freshly armed countdown
    /// displays the full budget and only reads 0 at expiry.
    pub fn secs_left(&self) -> u32 {
        (self.remaining + Duration::from_millis(999)).as_secs() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NoopNotify;
    use quiz::{ModeParams, QuestionResult};
    use quiz_client::MockQuestionService;

    fn test_config() -> SessionConfig {
        SessionConfig {
            params: ModeParams::Multiply {
                start_table: 2,
                end_table: 12,
            },
            time_per_question: 10,
            total_questions: 2,
        }
    }

    fn test_question() -> Question {
        Question {
            operands: vec![3, 7],
            options: vec![21, 20, 24],
        }
    }

    fn test_state() -> SessionState {
        let dir = tempfile::tempdir().unwrap();
        let history = Arc::new(HistoryStore::new(dir.path().join("history.json")));
        // Leak the TempDir so it lives for the test duration.
        std::mem::forget(dir);
        SessionState::new(
            Arc::new(MockQuestionService::new().with_standard_question()),
            history,
            Arc::new(NoopNotify),
        )
    }

    fn active_state() -> SessionState {
        let mut state = test_state();
        state.begin_session(test_config());
        state.install_question(test_question());
        state
    }

    #[test]
    fn initial_snapshot_is_idle() {
        let state = test_state();
        let snap = state.snapshot();
        assert_eq!(snap.status, SessionStatus::Idle);
        assert!(snap.question.is_none());
        assert_eq!(snap.score, 0);
        assert_eq!(snap.time_left, 0);
    }

    #[test]
    fn begin_session_enters_loading_and_bumps_epoch() {
        let mut state = test_state();
        let before = state.epoch;
        state.begin_session(test_config());
        assert_eq!(state.status, SessionStatus::Loading);
        assert_eq!(state.epoch, before + 1);
        assert!(state.question.is_none());
    }

    #[test]
    fn first_install_serves_index_zero_with_full_countdown() {
        let state = active_state();
        let snap = state.snapshot();
        assert_eq!(snap.status, SessionStatus::Active);
        assert_eq!(snap.question_count, 0);
        assert_eq!(snap.time_left, 10);
        assert_eq!(snap.feedback, Feedback::None);
        assert!(state.countdown_running());
    }

    #[test]
    fn later_install_advances_index_and_clears_feedback() {
        let mut state = active_state();
        state.accept_submission().unwrap();
        state.apply_verdict(false).unwrap();
        let Advance::FetchNext = state.take_advance() else {
            panic!("expected FetchNext with one question remaining");
        };
        assert!(state.expecting_question());

        state.install_question(test_question());
        assert_eq!(state.question_count, 1);
        assert_eq!(state.feedback, Feedback::None);
        assert_eq!(state.snapshot().time_left, 10);
    }

    #[test]
    fn submission_latches_elapsed_seconds() {
        let mut state = active_state();
        state.countdown.tick_with_elapsed(Duration::from_secs(3));
        let elapsed = state.accept_submission().unwrap();
        assert_eq!(elapsed, 3);
        assert!(!state.countdown_running());
    }

    #[test]
    fn submission_rejected_outside_active() {
        let mut state = test_state();
        assert!(state.accept_submission().is_none());
        state.begin_session(test_config());
        assert!(state.accept_submission().is_none());
    }

    #[test]
    fn submission_rejected_during_feedback_window() {
        let mut state = active_state();
        state.accept_submission().unwrap();
        state.apply_verdict(true).unwrap();
        assert!(state.accept_submission().is_none());
    }

    #[test]
    fn submission_rejected_while_check_in_flight() {
        let mut state = active_state();
        assert!(state.accept_submission().is_some());
        assert!(state.accept_submission().is_none());
    }

    #[test]
    fn correct_verdict_updates_score_and_streak() {
        let mut state = active_state();
        state.accept_submission().unwrap();
        let (result, _) = state.apply_verdict(true).unwrap();
        assert_eq!(result, QuestionResult::Correct);
        assert_eq!(state.score, 1);
        assert_eq!(state.streak, 1);
        assert_eq!(state.feedback, Feedback::Correct);
        assert!(state.advance_deadline().is_some());
    }

    #[test]
    fn wrong_verdict_resets_streak_only() {
        let mut state = active_state();
        state.accept_submission().unwrap();
        state.apply_verdict(true).unwrap();
        state.feedback = Feedback::None;

        state.accept_submission().unwrap();
        let (result, _) = state.apply_verdict(false).unwrap();
        assert_eq!(result, QuestionResult::Wrong);
        assert_eq!(state.score, 1);
        assert_eq!(state.streak, 0);
        assert_eq!(state.feedback, Feedback::Wrong);
    }

    #[test]
    fn check_failure_resumes_countdown_unchanged() {
        let mut state = active_state();
        state.countdown.tick_with_elapsed(Duration::from_secs(4));
        state.accept_submission().unwrap();
        state.check_failed();

        assert_eq!(state.feedback, Feedback::None);
        assert_eq!(state.score, 0);
        assert!(state.countdown_running());
        assert_eq!(state.snapshot().time_left, 6);
        // Retry is accepted against the same clock.
        assert_eq!(state.accept_submission(), Some(4));
    }

    #[test]
    fn expiry_applies_timed_out_transition() {
        let mut state = active_state();
        state.streak = 3;
        assert!(state.countdown.tick_with_elapsed(Duration::from_secs(10)));
        state.expire_question();
        assert_eq!(state.feedback, Feedback::TimedOut);
        assert_eq!(state.streak, 0);
        assert!(state.advance_deadline().is_some());
        assert_eq!(state.snapshot().time_left, 0);
    }

    #[test]
    fn advance_on_last_question_finishes() {
        let mut state = active_state();
        state.question_count = 1; // serving the final question of two
        state.accept_submission().unwrap();
        state.apply_verdict(true).unwrap();
        let Advance::Finish = state.take_advance() else {
            panic!("expected Finish on the final question");
        };
        let snap = state.snapshot();
        assert_eq!(snap.status, SessionStatus::Finished);
        assert!(snap.question.is_none());
        assert_eq!(snap.feedback, Feedback::None);
        // Score was applied before the transition.
        assert_eq!(snap.score, 1);
    }

    #[test]
    fn reset_to_idle_discards_everything() {
        let mut state = active_state();
        state.accept_submission().unwrap();
        let before = state.epoch;
        state.reset_to_idle();
        assert_eq!(state.status, SessionStatus::Idle);
        assert_eq!(state.epoch, before + 1);
        assert!(state.advance_deadline().is_none());
        assert!(!state.countdown_running());
        assert!(state.check_in_flight.is_none());
    }

    #[test]
    fn countdown_rounds_seconds_up() {
        let mut timer = CountdownTimer::idle();
        timer.start(Duration::from_secs(10));
        assert_eq!(timer.secs_left(), 10);
        timer.tick_with_elapsed(Duration::from_millis(2500));
        assert_eq!(timer.secs_left(), 8);
        timer.tick_with_elapsed(Duration::from_millis(7300));
        assert_eq!(timer.secs_left(), 1);
    }

    #[test]
    fn countdown_expires_exactly_once() {
        let mut timer = CountdownTimer::idle();
        timer.start(Duration::from_secs(2));
        assert!(!timer.tick_with_elapsed(Duration::from_secs(1)));
        assert!(timer.tick_with_elapsed(Duration::from_secs(5)));
        assert_eq!(timer.secs_left(), 0);
        // Expired timers stay quiet.
        assert!(!timer.tick_with_elapsed(Duration::from_secs(1)));
        assert!(!timer.is_running());
    }

    #[test]
    fn resume_does_not_refund_time() {
        let mut timer = CountdownTimer::idle();
        timer.start(Duration::from_secs(10));
        timer.tick_with_elapsed(Duration::from_secs(4));
        timer.stop();
        assert!(!timer.is_running());
        timer.resume();
        assert!(timer.is_running());
        assert_eq!(timer.secs_left(), 6);
    }

    #[test]
    fn expired_timer_does_not_resume() {
        let mut timer = CountdownTimer::idle();
        timer.start(Duration::from_secs(1));
        timer.tick_with_elapsed(Duration::from_secs(1));
        timer.resume();
        assert!(!timer.is_running());
    }
}
