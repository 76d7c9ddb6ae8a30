use std::sync::Arc;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind};
use futures::StreamExt;
use quiz::{HistoryEntry, ModeParams, OpKind, SessionConfig};
use ratatui::Terminal;
use session::{
    HistoryStore, SessionEvent, SessionHandle, SessionSnapshot, SessionStatus,
};
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Setup,
    Drill,
    History,
}

/// Value stepper bounds for the setup form.
const TABLE_RANGE: (u32, u32) = (1, 20);
const DIGITS_RANGE: (u32, u32) = (1, 6);
const TERMS_RANGE: (u32, u32) = (2, 6);
const TIME_RANGE: (u32, u32) = (3, 60);
const QUESTIONS_RANGE: (u32, u32) = (1, 50);

/// Setup screen state: one row per config field, adjusted with left/right.
pub struct SetupForm {
    pub mode: OpKind,
    pub start_table: u32,
    pub end_table: u32,
    pub digits: u32,
    pub term_count: u32,
    pub time_per_question: u32,
    pub total_questions: u32,
    pub field: usize,
}

impl Default for SetupForm {
    fn default() -> Self {
        let defaults = SessionConfig::default();
        let (start_table, end_table) = match defaults.params {
            ModeParams::Multiply {
                start_table,
                end_table,
            } => (start_table, end_table),
            ModeParams::Add { .. } => (2, 12),
        };
        Self {
            mode: defaults.mode(),
            start_table,
            end_table,
            digits: 2,
            term_count: 2,
            time_per_question: defaults.time_per_question,
            total_questions: defaults.total_questions,
            field: 0,
        }
    }
}

impl SetupForm {
    pub const FIELD_COUNT: usize = 5;

    /// Label/value rows in display order. Rows 1 and 2 depend on the mode.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let mut rows = vec![(
            "Mode",
            match self.mode {
                OpKind::Multiply => "multiplication".to_string(),
                OpKind::Add => "addition".to_string(),
            },
        )];
        match self.mode {
            OpKind::Multiply => {
                rows.push(("Start table", self.start_table.to_string()));
                rows.push(("End table", self.end_table.to_string()));
            }
            OpKind::Add => {
                rows.push(("Digits per term", self.digits.to_string()));
                rows.push(("Terms", self.term_count.to_string()));
            }
        }
        rows.push(("Seconds per question", self.time_per_question.to_string()));
        rows.push(("Questions", self.total_questions.to_string()));
        rows
    }

    pub fn next_field(&mut self) {
        self.field = (self.field + 1) % Self::FIELD_COUNT;
    }

    pub fn prev_field(&mut self) {
        self.field = (self.field + Self::FIELD_COUNT - 1) % Self::FIELD_COUNT;
    }

    /// Step the selected field. The mode row toggles regardless of direction.
    pub fn adjust(&mut self, delta: i32) {
        match self.field {
            0 => {
                self.mode = match self.mode {
                    OpKind::Multiply => OpKind::Add,
                    OpKind::Add => OpKind::Multiply,
                };
            }
            1 => match self.mode {
                OpKind::Multiply => {
                    self.start_table = bump(self.start_table, delta, TABLE_RANGE)
                }
                OpKind::Add => self.digits = bump(self.digits, delta, DIGITS_RANGE),
            },
            2 => match self.mode {
                OpKind::Multiply => self.end_table = bump(self.end_table, delta, TABLE_RANGE),
                OpKind::Add => self.term_count = bump(self.term_count, delta, TERMS_RANGE),
            },
            3 => self.time_per_question = bump(self.time_per_question, delta, TIME_RANGE),
            _ => self.total_questions = bump(self.total_questions, delta, QUESTIONS_RANGE),
        }
    }

    pub fn config(&self) -> SessionConfig {
        let params = match self.mode {
            OpKind::Multiply => ModeParams::Multiply {
                start_table: self.start_table,
                end_table: self.end_table,
            },
            OpKind::Add => ModeParams::Add {
                digits: self.digits,
                term_count: self.term_count,
            },
        };
        SessionConfig {
            params,
            time_per_question: self.time_per_question,
            total_questions: self.total_questions,
        }
    }
}

fn bump(value: u32, delta: i32, (lo, hi): (u32, u32)) -> u32 {
    value.saturating_add_signed(delta).clamp(lo, hi)
}

/// All client-side state. The session snapshot is the single source of truth
/// for the drill screen; everything else is navigation and form state.
pub struct App {
    pub handle: SessionHandle,
    pub history: Arc<HistoryStore>,
    pub snapshot: SessionSnapshot,
    pub screen: Screen,
    pub setup: SetupForm,
    pub selected_option: usize,
    pub status_message: Option<String>,
    pub history_entries: Vec<HistoryEntry>,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        handle: SessionHandle,
        history: Arc<HistoryStore>,
        snapshot: SessionSnapshot,
    ) -> Self {
        Self {
            handle,
            history,
            snapshot,
            screen: Screen::Setup,
            setup: SetupForm::default(),
            selected_option: 0,
            status_message: None,
            history_entries: Vec::new(),
            should_quit: false,
        }
    }

    pub fn question_label(&self) -> Option<String> {
        let question = self.snapshot.question.as_ref()?;
        Some(question.label(self.snapshot.mode?))
    }

    pub fn on_snapshot(&mut self, snapshot: SessionSnapshot) {
        if self.screen == Screen::Drill && snapshot.status == SessionStatus::Idle {
            // Session aborted out from under us; back to the form.
            self.screen = Screen::Setup;
        }
        if snapshot.question != self.snapshot.question {
            self.selected_option = 0;
        }
        self.snapshot = snapshot;
    }

    pub async fn on_key(&mut self, key: KeyEvent) -> anyhow::Result<()> {
        match self.screen {
            Screen::Setup => self.on_setup_key(key).await?,
            Screen::Drill => self.on_drill_key(key).await?,
            Screen::History => self.on_history_key(key),
        }
        Ok(())
    }

    async fn on_setup_key(&mut self, key: KeyEvent) -> anyhow::Result<()> {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('h') => {
                self.load_history();
                self.screen = Screen::History;
            }
            KeyCode::Up | KeyCode::Char('k') => self.setup.prev_field(),
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => self.setup.next_field(),
            KeyCode::Left => self.setup.adjust(-1),
            KeyCode::Right => self.setup.adjust(1),
            KeyCode::Enter => self.start_session().await?,
            _ => {}
        }
        Ok(())
    }

    async fn on_drill_key(&mut self, key: KeyEvent) -> anyhow::Result<()> {
        if self.snapshot.status == SessionStatus::Finished {
            match key.code {
                KeyCode::Char('r') => self.start_session().await?,
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q') => {
                    self.screen = Screen::Setup;
                }
                _ => {}
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.snapshot = self.handle.quit().await?;
                self.screen = Screen::Setup;
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = (c as usize) - ('1' as usize);
                self.submit_option(index).await?;
            }
            KeyCode::Left => {
                self.selected_option = self.selected_option.saturating_sub(1);
            }
            KeyCode::Right => {
                let count = self
                    .snapshot
                    .question
                    .as_ref()
                    .map_or(0, |q| q.options.len());
                if count > 0 && self.selected_option + 1 < count {
                    self.selected_option += 1;
                }
            }
            KeyCode::Enter => self.submit_option(self.selected_option).await?,
            _ => {}
        }
        Ok(())
    }

    fn on_history_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') => {
                if let Err(e) = self.history.clear() {
                    tracing::warn!("Failed to clear history: {e}");
                }
                self.load_history();
            }
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('h') => {
                self.screen = Screen::Setup;
            }
            _ => {}
        }
    }

    async fn start_session(&mut self) -> anyhow::Result<()> {
        match self.handle.start(self.setup.config()).await {
            Ok(snapshot) => {
                self.snapshot = snapshot;
                self.screen = Screen::Drill;
                self.selected_option = 0;
                self.status_message = None;
            }
            Err(e) => {
                tracing::warn!("Failed to start session: {e}");
                self.status_message = Some(e.to_string());
            }
        }
        Ok(())
    }

    async fn submit_option(&mut self, index: usize) -> anyhow::Result<()> {
        let Some(question) = self.snapshot.question.as_ref() else {
            return Ok(());
        };
        let Some(&answer) = question.options.get(index) else {
            return Ok(());
        };
        self.selected_option = index;
        self.snapshot = self.handle.submit(answer).await?;
        Ok(())
    }

    fn load_history(&mut self) {
        self.history_entries = self.history.list().unwrap_or_else(|e| {
            tracing::warn!("Failed to load history: {e}");
            Vec::new()
        });
    }
}

/// Draw + input/event loop. Redraws on every key and on every broadcast
/// from the controller (which includes one tick per displayed second).
pub async fn run<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    mut events: broadcast::Receiver<SessionEvent>,
) -> anyhow::Result<()> {
    let mut input = EventStream::new();

    loop {
        terminal.draw(|frame| crate::ui::render(frame, &app))?;

        tokio::select! {
            maybe_event = input.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        app.on_key(key).await?;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                }
            }
            event = events.recv() => {
                match event {
                    Ok(SessionEvent::StateChanged(snapshot)) => app.on_snapshot(snapshot),
                    Ok(SessionEvent::Error(message)) => {
                        app.status_message = Some(message);
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Missed session events; resyncing");
                        let snapshot = app.handle.get_snapshot().await?;
                        app.on_snapshot(snapshot);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_defaults_match_session_defaults() {
        let form = SetupForm::default();
        assert_eq!(form.config(), SessionConfig::default());
    }

    #[test]
    fn mode_row_toggles_and_swaps_parameter_rows() {
        let mut form = SetupForm::default();
        assert_eq!(form.rows()[1].0, "Start table");
        form.adjust(1);
        assert_eq!(form.mode, OpKind::Add);
        assert_eq!(form.rows()[1].0, "Digits per term");
        form.adjust(-1);
        assert_eq!(form.mode, OpKind::Multiply);
    }

    #[test]
    fn steppers_respect_bounds() {
        let mut form = SetupForm::default();
        form.field = 3; // seconds per question
        form.time_per_question = TIME_RANGE.0;
        form.adjust(-1);
        assert_eq!(form.time_per_question, TIME_RANGE.0);
        form.time_per_question = TIME_RANGE.1;
        form.adjust(1);
        assert_eq!(form.time_per_question, TIME_RANGE.1);
    }

    #[test]
    fn field_navigation_wraps() {
        let mut form = SetupForm::default();
        form.prev_field();
        assert_eq!(form.field, SetupForm::FIELD_COUNT - 1);
        form.next_field();
        assert_eq!(form.field, 0);
    }

    #[tokio::test]
    async fn aborted_session_bounces_back_to_setup() {
        let dir = tempfile::tempdir().unwrap();
        let history = Arc::new(HistoryStore::new(dir.path().join("history.json")));
        let handle = session::spawn_controller(
            Arc::new(quiz_client::MockQuestionService::new().with_standard_question()),
            Arc::clone(&history),
            Arc::new(session::NoopNotify),
        );
        let (snapshot, _events) = handle.subscribe().await.unwrap();

        let mut app = App::new(handle, history, snapshot.clone());
        app.screen = Screen::Drill;
        app.on_snapshot(snapshot);
        assert_eq!(app.screen, Screen::Setup);
    }

    #[test]
    fn add_mode_config_carries_digits_and_terms() {
        let mut form = SetupForm::default();
        form.mode = OpKind::Add;
        form.digits = 3;
        form.term_count = 4;
        assert_eq!(
            form.config().params,
            ModeParams::Add {
                digits: 3,
                term_count: 4
            }
        );
        assert!(form.config().validate().is_ok());
    }
}
