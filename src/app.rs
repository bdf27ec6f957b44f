use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{debug, error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::{Duration, Instant};

use crate::codec::{decode, encode, token_from_fragment};
use crate::form::{Control, SettingsControls, SettingsForm};
use crate::question::{Question, QuestionError, QuestionGenerator};
use crate::runtime::Flow;
use crate::session::{Session, SessionTuning};
use crate::settings::Settings;
use crate::store::SettingsCache;

/// How long a broken fragment stays around before it is cleared.
pub const RESET_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Setup,
    Game,
}

/// Sample question under the settings form.
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    Empty,
    Question(Question),
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum GameAction {
    Correct,
    Wrong,
    Reveal,
    NewGame,
}

impl GameAction {
    /// r = riktig, f = feil, v = vis, n = nytt spill
    pub fn from_key(key: &KeyEvent) -> Option<Self> {
        match key.code {
            KeyCode::Char(c) => match c.to_ascii_lowercase() {
                'r' => Some(Self::Correct),
                'f' => Some(Self::Wrong),
                'v' => Some(Self::Reveal),
                'n' => Some(Self::NewGame),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Application context: one per process, owns everything the screens need.
#[derive(Debug)]
pub struct App {
    screen: Screen,
    form: SettingsForm,
    focus: usize,
    preview: Preview,
    session: Option<Session>,
    fragment: Option<String>,
    notice: Option<String>,
    pending_reset: Option<Instant>,
    cache: SettingsCache,
    tuning: SessionTuning,
    seed: Option<u64>,
    preview_rng: StdRng,
    now: Instant,
}

impl App {
    pub fn new(cache: SettingsCache, tuning: SessionTuning) -> Self {
        let mut app = Self {
            screen: Screen::Setup,
            form: SettingsForm::default(),
            focus: 0,
            preview: Preview::Empty,
            session: None,
            fragment: None,
            notice: None,
            pending_reset: None,
            cache,
            tuning,
            seed: None,
            preview_rng: StdRng::from_entropy(),
            now: Instant::now(),
        };
        app.show_setup();
        app
    }

    /// Deterministic questions, for tests and reproducible runs
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self.preview_rng = StdRng::seed_from_u64(seed);
        self.refresh_preview(false);
        self
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn form(&self) -> &SettingsForm {
        &self.form
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn preview(&self) -> &Preview {
        &self.preview
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Countdown of the current question as of the last event
    pub fn time_remaining(&self) -> Option<Duration> {
        self.session.as_ref()?.time_remaining(self.now)
    }

    /// `#<token>` of the running quiz, if any
    pub fn fragment(&self) -> Option<String> {
        self.fragment.as_ref().map(|token| format!("#{token}"))
    }

    /// Change the form before the user sees it. Nothing is persisted.
    pub fn prefill<F: FnOnce(&mut SettingsForm)>(&mut self, fill: F) {
        fill(&mut self.form);
        self.refresh_preview(false);
    }

    /// Load a fragment: start its quiz, or fall back to setup.
    pub fn open(&mut self, fragment: Option<&str>, now: Instant) -> Result<(), QuestionError> {
        self.now = now;
        let Some(token) = fragment.and_then(token_from_fragment) else {
            self.fragment = None;
            self.show_setup();
            return Ok(());
        };

        match decode(token) {
            Ok(mut settings) => {
                if let Some(stored) = self.cache.load() {
                    if settings.resume_counts_from(&stored) {
                        info!("resuming counts from stored settings");
                    }
                }
                self.cache.save(&settings);
                self.fragment = Some(token.to_string());
                self.start_game(settings, now)
            }
            Err(err) => {
                error!("invalid quiz token: {err}");
                self.fragment = Some(token.to_string());
                self.pending_reset = Some(now + RESET_DELAY);
                self.show_setup();
                self.notice = Some(format!("Ugyldig lenke: {err}"));
                Ok(())
            }
        }
    }

    /// The start button: read the form and begin if there is anyone to ask.
    pub fn start(&mut self, now: Instant) -> Result<(), QuestionError> {
        let settings = match self.form.read_settings() {
            Ok(settings) => settings,
            Err(err) => {
                self.notice = Some(err.to_string());
                return Ok(());
            }
        };
        self.cache.save(&settings);

        if !settings.has_names() {
            self.notice = Some("Legg inn minst ett navn".to_string());
            return Ok(());
        }
        self.fragment = Some(encode(&settings));
        self.start_game(settings, now)
    }

    /// Clear the fragment and go back to setup.
    pub fn reset(&mut self) {
        info!("new game");
        self.fragment = None;
        self.pending_reset = None;
        self.show_setup();
    }

    pub fn on_key(&mut self, key: KeyEvent, now: Instant) -> Result<Flow, QuestionError> {
        self.now = now;
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(Flow::Quit);
        }
        if key.code == KeyCode::Esc {
            return Ok(Flow::Quit);
        }

        match self.screen {
            Screen::Setup => self.on_setup_key(key, now)?,
            Screen::Game => self.on_game_key(key, now),
        }
        Ok(Flow::Continue)
    }

    pub fn on_tick(&mut self, now: Instant) -> Result<Flow, QuestionError> {
        self.now = now;
        if self.pending_reset.is_some_and(|at| at <= now) {
            info!("clearing invalid fragment");
            self.pending_reset = None;
            self.fragment = None;
        }
        if let Some(session) = self.session.as_mut() {
            session.on_tick(now)?;
        }
        Ok(Flow::Continue)
    }

    fn start_game(&mut self, settings: Settings, now: Instant) -> Result<(), QuestionError> {
        info!(
            "starting quiz with {} participants, {}..{} %",
            settings.names.len(),
            settings.from,
            settings.to
        );
        let mut session = match self.seed {
            Some(seed) => Session::with_rng(
                settings,
                self.tuning,
                self.cache.clone(),
                StdRng::seed_from_u64(seed),
            ),
            None => Session::new(settings, self.tuning, self.cache.clone()),
        };
        if let Err(err) = session.next(now) {
            error!("cannot generate a question: {err}");
            return Err(err);
        }
        self.session = Some(session);
        self.pending_reset = None;
        self.screen = Screen::Game;
        self.notice = None;
        Ok(())
    }

    fn show_setup(&mut self) {
        self.session = None;
        self.screen = Screen::Setup;
        self.notice = None;
        self.form
            .write_settings(&self.cache.load().unwrap_or_default());
        self.refresh_preview(false);
    }

    fn refresh_preview(&mut self, persist: bool) {
        self.preview = match self.form.read_settings() {
            Err(err) => Preview::Invalid(err.to_string()),
            Ok(settings) => {
                if persist {
                    self.cache.save(&settings);
                }
                if !settings.has_names() {
                    Preview::Empty
                } else {
                    match QuestionGenerator::new(self.tuning.max_attempts)
                        .generate(&settings, &mut self.preview_rng)
                    {
                        Ok(question) => Preview::Question(question),
                        Err(err) => Preview::Invalid(err.to_string()),
                    }
                }
            }
        };
    }

    fn on_setup_key(&mut self, key: KeyEvent, now: Instant) -> Result<(), QuestionError> {
        let len = self.form.len().max(1);
        match key.code {
            KeyCode::Enter => return self.start(now),
            KeyCode::Tab | KeyCode::Down => {
                self.focus = (self.focus + 1) % len;
                return Ok(());
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = (self.focus + len - 1) % len;
                return Ok(());
            }
            _ => {}
        }

        // Ctrl and Alt chords are not text
        let typed = key.modifiers.difference(KeyModifiers::SHIFT).is_empty();
        let edited = match (key.code, self.form.control_at_mut(self.focus)) {
            (KeyCode::Char(' '), Some(Control::Checkbox(checked))) => {
                *checked = !*checked;
                true
            }
            (KeyCode::Char(c), Some(Control::Number(value) | Control::Text(value)))
                if typed =>
            {
                value.push(c);
                true
            }
            (KeyCode::Backspace, Some(Control::Number(value) | Control::Text(value))) => {
                value.pop().is_some()
            }
            _ => false,
        };

        if edited {
            self.notice = None;
            self.refresh_preview(true);
        }
        Ok(())
    }

    fn on_game_key(&mut self, key: KeyEvent, now: Instant) {
        let Some(action) = GameAction::from_key(&key) else {
            return;
        };
        if action == GameAction::NewGame {
            self.reset();
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let accepted = match action {
            GameAction::Correct => session.mark_correct(now),
            GameAction::Wrong => session.mark_wrong(now),
            GameAction::Reveal => session.reveal(now),
            GameAction::NewGame => false,
        };
        if !accepted {
            debug!("{action} ignored");
        }
    }
}
