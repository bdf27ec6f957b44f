use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::{Duration, Instant};

use crate::question::{Question, QuestionError, QuestionGenerator, MAX_ATTEMPTS};
use crate::store::SettingsCache;
use crate::settings::Settings;

/// Minimum gap between two accepted actions.
pub const DEBOUNCE: Duration = Duration::from_millis(1500);
/// Pause on a resolved question before the next one is shown.
pub const ADVANCE_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTuning {
    pub debounce: Duration,
    pub advance_delay: Duration,
    pub max_attempts: usize,
}

impl Default for SessionTuning {
    fn default() -> Self {
        Self {
            debounce: DEBOUNCE,
            advance_delay: ADVANCE_DELAY,
            max_attempts: MAX_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Resolution {
    Correct,
    Wrong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Showing,
    Revealed(Resolution),
}

/// Background colour of the question card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Signal {
    #[default]
    Neutral,
    Success,
    Failure,
}

/// Lifecycle of the question currently on screen.
///
/// Timers are deadlines; the owner calls [`Session::on_tick`] to fire the
/// ones that are due. Every action takes the current monotonic instant.
#[derive(Debug)]
pub struct Session {
    settings: Settings,
    tuning: SessionTuning,
    generator: QuestionGenerator,
    cache: SettingsCache,
    rng: StdRng,
    question: Option<Question>,
    phase: Phase,
    answer_visible: bool,
    signal: Signal,
    auto_fail_at: Option<Instant>,
    advance_at: Option<Instant>,
    last_accepted: Option<Instant>,
}

impl Session {
    pub fn new(settings: Settings, tuning: SessionTuning, cache: SettingsCache) -> Self {
        Self::with_rng(settings, tuning, cache, StdRng::from_entropy())
    }

    pub fn with_rng(
        settings: Settings,
        tuning: SessionTuning,
        cache: SettingsCache,
        rng: StdRng,
    ) -> Self {
        Self {
            settings,
            tuning,
            generator: QuestionGenerator::new(tuning.max_attempts),
            cache,
            rng,
            question: None,
            phase: Phase::Idle,
            answer_visible: false,
            signal: Signal::Neutral,
            auto_fail_at: None,
            advance_at: None,
            last_accepted: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn signal(&self) -> Signal {
        self.signal
    }

    pub fn answer_visible(&self) -> bool {
        self.answer_visible
    }

    /// Time left before the current question fails on its own.
    pub fn time_remaining(&self, now: Instant) -> Option<Duration> {
        self.auto_fail_at
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    pub fn next_question_at(&self) -> Option<Instant> {
        self.advance_at
    }

    /// Replace the current question with a fresh one and arm auto-fail.
    pub fn next(&mut self, now: Instant) -> Result<&Question, QuestionError> {
        let question = self.generator.generate(&self.settings, &mut self.rng)?;
        info!("asking {}: {} ({})", question.who, question.text, question.answer);

        self.phase = Phase::Showing;
        self.answer_visible = false;
        self.signal = Signal::Neutral;
        self.advance_at = None;
        self.auto_fail_at = Some(now + self.settings.timeout_duration());
        Ok(self.question.insert(question))
    }

    pub fn mark_correct(&mut self, now: Instant) -> bool {
        if !self.can_resolve() || !self.debounce_ok(now) {
            return false;
        }
        let Some(question) = &self.question else {
            return false;
        };
        let correct = question.correct;
        if self.settings.apply_correct(&correct) {
            self.cache.save(&self.settings);
        }
        self.resolve(Resolution::Correct, now);
        true
    }

    pub fn mark_wrong(&mut self, now: Instant) -> bool {
        if !self.can_resolve() || !self.debounce_ok(now) {
            return false;
        }
        self.resolve(Resolution::Wrong, now);
        true
    }

    /// Show the answer without resolving the question. Auto-fail stays armed.
    pub fn reveal(&mut self, now: Instant) -> bool {
        if self.question.is_none() || !self.debounce_ok(now) {
            return false;
        }
        self.answer_visible = true;
        true
    }

    /// Fire due deadlines: auto-fail first, then the scheduled next question.
    pub fn on_tick(&mut self, now: Instant) -> Result<(), QuestionError> {
        if self.auto_fail_at.is_some_and(|deadline| deadline <= now) {
            self.auto_fail_at = None;
            if !self.mark_wrong(now) && self.can_resolve() {
                // inside the debounce window; try again once it closes
                self.auto_fail_at = self.last_accepted.map(|at| at + self.tuning.debounce);
            }
        }

        if self.advance_at.is_some_and(|deadline| deadline <= now) {
            self.next(now)?;
        }
        Ok(())
    }

    fn can_resolve(&self) -> bool {
        self.phase == Phase::Showing
    }

    fn debounce_ok(&mut self, now: Instant) -> bool {
        let ok = self
            .last_accepted
            .map_or(true, |at| now.saturating_duration_since(at) >= self.tuning.debounce);
        if ok {
            self.last_accepted = Some(now);
        } else {
            debug!("dropping action inside the debounce window");
        }
        ok
    }

    fn resolve(&mut self, resolution: Resolution, now: Instant) {
        self.auto_fail_at = None;
        self.answer_visible = true;
        self.phase = Phase::Revealed(resolution);
        self.signal = match resolution {
            Resolution::Correct => Signal::Success,
            Resolution::Wrong => Signal::Failure,
        };
        self.advance_at = Some(now + self.tuning.advance_delay);
        if let Some(question) = &self.question {
            info!("{} answered {}: {resolution}", question.who, question.text);
        }
    }
}
