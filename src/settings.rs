use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Someone who can be asked. Identity is the position in [`Settings::names`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    pub name: String,
    /// Number of questions this participant answered correctly
    pub count: u32,
}

impl Participant {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            count: 0,
        }
    }
}

/// Quiz configuration, shared through the fragment and kept in the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// ask with one decimal of precision
    pub comma: bool,
    /// ask for growth factors instead of plain percentage factors
    pub growth: bool,
    /// show the factor and ask for the percentage
    pub reverse: bool,
    pub from: f64,
    pub to: f64,
    /// seconds before an unanswered question counts as wrong
    pub timeout: f64,
    pub names: Vec<Participant>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            comma: false,
            growth: false,
            reverse: false,
            from: 0.0,
            to: 100.0,
            timeout: 10.0,
            names: Vec::new(),
        }
    }
}

/// Counter update bound to one question.
///
/// The target count is frozen when the question is generated, so replaying
/// the command can never count the same answer twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrectCommand {
    pub participant: usize,
    pub count_if_correct: u32,
}

impl Settings {
    pub fn has_names(&self) -> bool {
        !self.names.is_empty()
    }

    /// Auto-fail delay. Negative or non-finite timeouts fire immediately.
    pub fn timeout_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout.max(0.0)).unwrap_or(Duration::ZERO)
    }

    /// Returns false if the command points past the participant list.
    pub fn apply_correct(&mut self, cmd: &CorrectCommand) -> bool {
        match self.names.get_mut(cmd.participant) {
            Some(participant) => {
                participant.count = cmd.count_if_correct;
                true
            }
            None => false,
        }
    }

    /// Carry counts over from `stored` when both describe the same roster.
    ///
    /// A shared token always starts at zero; reopening it on the machine that
    /// ran the quiz continues the rotation instead.
    pub fn resume_counts_from(&mut self, stored: &Settings) -> bool {
        let same_roster = self.names.len() == stored.names.len()
            && self
                .names
                .iter()
                .zip(&stored.names)
                .all(|(a, b)| a.name == b.name);
        if !same_roster {
            return false;
        }
        for (current, previous) in self.names.iter_mut().zip(&stored.names) {
            current.count = current.count.max(previous.count);
        }
        true
    }
}

/// `"arve, knut\nkari"` => arve, knut, kari, each with a zero count.
pub fn parse_names(input: &str) -> Vec<Participant> {
    input
        .split([',', '\n'])
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(Participant::new)
        .collect()
}
