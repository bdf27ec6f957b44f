use log::debug;
use rand::Rng;
use thiserror::Error;

use crate::fair_pick::select_candidate_indices;
use crate::rng::{pick_uniform, random_integer};
use crate::settings::{CorrectCommand, Participant, Settings};

/// Attempts before a range that keeps producing negative answers is reported.
pub const MAX_ATTEMPTS: usize = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuestionError {
    #[error("no participants to ask")]
    NoParticipants,
    #[error(
        "gave up after {attempts} attempts: the range keeps producing negative answers, check from/to"
    )]
    RetryBudgetExhausted { attempts: usize },
}

/// One round of the quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub who: String,
    /// Position of `who` in the participant list
    pub participant: usize,
    pub title: String,
    pub text: String,
    pub answer: String,
    pub correct: CorrectCommand,
    /// The tie group `who` was drawn from
    pub names_remaining: Vec<Participant>,
}

/// What a view shows for a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDisplay {
    pub title: String,
    pub who: String,
    pub equation: String,
}

impl Question {
    pub fn display(&self, revealed: bool) -> QuestionDisplay {
        let answer = if revealed { self.answer.as_str() } else { "" };
        QuestionDisplay {
            title: self.title.clone(),
            who: self.who.clone(),
            equation: format!("{} = {}", self.text, answer).trim_end().to_string(),
        }
    }
}

/// Builds questions from settings and the participants' counters.
#[derive(Debug, Clone, Copy)]
pub struct QuestionGenerator {
    max_attempts: usize,
}

impl Default for QuestionGenerator {
    fn default() -> Self {
        Self::new(MAX_ATTEMPTS)
    }
}

impl QuestionGenerator {
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn generate<R: Rng + ?Sized>(
        &self,
        settings: &Settings,
        rng: &mut R,
    ) -> Result<Question, QuestionError> {
        let candidates = select_candidate_indices(&settings.names);
        let participant = *pick_uniform(rng, &candidates).ok_or(QuestionError::NoParticipants)?;
        let subject = &settings.names[participant];

        for attempt in 0..self.max_attempts {
            let (text, value) = draw_factor(settings, rng);
            if value < 0.0 {
                debug!("attempt {attempt}: {text} gives {value}, drawing again");
                continue;
            }

            let kind = if settings.growth { "vekst" } else { "prosent" };
            let answer = if settings.comma {
                format!("{value:.3}")
            } else {
                format!("{value:.2}")
            };
            let (title, text, answer) = if settings.reverse {
                (format!("Hva er {kind}en til faktoren?"), answer, text)
            } else {
                (format!("Hva er {kind}faktoren?"), text, answer)
            };

            return Ok(Question {
                who: subject.name.clone(),
                participant,
                title,
                text,
                answer,
                correct: CorrectCommand {
                    participant,
                    count_if_correct: subject.count.saturating_add(1),
                },
                names_remaining: candidates
                    .iter()
                    .map(|&idx| settings.names[idx].clone())
                    .collect(),
            });
        }

        Err(QuestionError::RetryBudgetExhausted {
            attempts: self.max_attempts,
        })
    }
}

/// Draw one percentage and compute its factor: `"7 %"` => 0.07,
/// `"7 % nedgang"` => 0.93.
fn draw_factor<R: Rng + ?Sized>(settings: &Settings, rng: &mut R) -> (String, f64) {
    let from = settings.from.floor() as i64;
    let to = settings.to.floor() as i64;
    let whole = random_integer(rng, from, to);
    // work in tenths so "7.3" never prints as 7.300000000000001
    let percent = if settings.comma {
        whole
            .saturating_mul(10)
            .saturating_add(random_integer(rng, 1, 9)) as f64
            / 10.0
    } else {
        whole as f64
    };
    let mut text = format!("{percent} %");

    let mut value = percent / 100.0;
    if settings.growth {
        let up = random_integer(rng, 0, 1) == 1;
        text.push_str(if up { " oppgang" } else { " nedgang" });
        value = if up { 1.0 + value } else { 1.0 - value };
    }

    (text, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::parse_names;
    use assert_matches::assert_matches;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn scenario() -> Settings {
        Settings {
            comma: false,
            growth: false,
            reverse: false,
            from: 0.0,
            to: 10.0,
            timeout: 5.0,
            names: parse_names("arve, knut"),
        }
    }

    #[test]
    fn test_plain_percent_question() {
        let settings = scenario();
        let generator = QuestionGenerator::default();
        let mut rng = StdRng::seed_from_u64(21);

        for _ in 0..500 {
            let q = generator.generate(&settings, &mut rng).unwrap();
            assert_eq!(q.title, "Hva er prosentfaktoren?");

            let percent: u32 = q.text.strip_suffix(" %").unwrap().parse().unwrap();
            assert!(percent <= 10);
            assert_eq!(q.answer, format!("{:.2}", percent as f64 / 100.0));
            assert!(["arve", "knut"].contains(&q.who.as_str()));
        }
    }

    #[test]
    fn test_growth_question() {
        let settings = Settings {
            growth: true,
            ..scenario()
        };
        let generator = QuestionGenerator::default();
        let mut rng = StdRng::seed_from_u64(22);
        let (mut ups, mut downs) = (0, 0);

        for _ in 0..500 {
            let q = generator.generate(&settings, &mut rng).unwrap();
            assert_eq!(q.title, "Hva er vekstfaktoren?");
            if q.text.ends_with(" oppgang") {
                ups += 1;
            } else if q.text.ends_with(" nedgang") {
                downs += 1;
            } else {
                panic!("unexpected text {}", q.text);
            }

            let answer: f64 = q.answer.parse().unwrap();
            assert!((0.90..=1.10).contains(&answer), "answer {answer}");
        }
        assert!(ups > 0 && downs > 0);
    }

    #[test]
    fn test_comma_question_has_one_decimal_and_three_in_answer() {
        let settings = Settings {
            comma: true,
            ..scenario()
        };
        let generator = QuestionGenerator::default();
        let mut rng = StdRng::seed_from_u64(23);

        for _ in 0..200 {
            let q = generator.generate(&settings, &mut rng).unwrap();
            let percent = q.text.strip_suffix(" %").unwrap();
            let (_, decimals) = percent.split_once('.').unwrap();
            assert_eq!(decimals.len(), 1);
            assert_ne!(decimals, "0");

            let (_, answer_decimals) = q.answer.split_once('.').unwrap();
            assert_eq!(answer_decimals.len(), 3);
        }
    }

    #[test]
    fn test_reverse_swaps_text_and_answer() {
        let plain = Settings {
            growth: true,
            ..scenario()
        };
        let reversed = Settings {
            reverse: true,
            ..plain.clone()
        };
        let generator = QuestionGenerator::default();

        for seed in 0..50 {
            let a = generator
                .generate(&plain, &mut StdRng::seed_from_u64(seed))
                .unwrap();
            let b = generator
                .generate(&reversed, &mut StdRng::seed_from_u64(seed))
                .unwrap();
            assert_eq!(a.text, b.answer);
            assert_eq!(a.answer, b.text);
            assert_eq!(a.who, b.who);
            assert_eq!(b.title, "Hva er veksten til faktoren?");
        }
    }

    #[test]
    fn test_negative_answers_are_redrawn() {
        // -5..5 gives a negative factor about half of the time
        let settings = Settings {
            from: -5.0,
            to: 5.0,
            ..scenario()
        };
        let generator = QuestionGenerator::default();
        let mut rng = StdRng::seed_from_u64(24);
        for _ in 0..300 {
            let q = generator.generate(&settings, &mut rng).unwrap();
            assert!(!q.answer.starts_with('-'), "answer {}", q.answer);
        }
    }

    #[test]
    fn test_retry_budget_exhausted() {
        let settings = Settings {
            from: -10.0,
            to: -1.0,
            ..scenario()
        };
        let mut rng = StdRng::seed_from_u64(25);
        assert_matches!(
            QuestionGenerator::default().generate(&settings, &mut rng),
            Err(QuestionError::RetryBudgetExhausted { attempts: 100 })
        );
        assert_matches!(
            QuestionGenerator::new(3).generate(&settings, &mut rng),
            Err(QuestionError::RetryBudgetExhausted { attempts: 3 })
        );
    }

    #[test]
    fn test_no_participants() {
        let settings = Settings::default();
        let mut rng = StdRng::seed_from_u64(26);
        assert_matches!(
            QuestionGenerator::default().generate(&settings, &mut rng),
            Err(QuestionError::NoParticipants)
        );
    }

    #[test]
    fn test_subject_comes_from_lowest_count_group() {
        let mut settings = scenario();
        settings.names = parse_names("a, b, c");
        settings.names[0].count = 2;
        let generator = QuestionGenerator::default();
        let mut rng = StdRng::seed_from_u64(27);

        for _ in 0..200 {
            let q = generator.generate(&settings, &mut rng).unwrap();
            assert_ne!(q.who, "a");
            let remaining: Vec<&str> = q.names_remaining.iter().map(|p| p.name.as_str()).collect();
            assert_eq!(remaining, vec!["b", "c"]);
        }
    }

    #[test]
    fn test_correct_command_is_frozen_at_generation() {
        let mut settings = scenario();
        settings.names[0].count = 4;
        settings.names[1].count = 4;
        let mut rng = StdRng::seed_from_u64(28);
        let q = QuestionGenerator::default()
            .generate(&settings, &mut rng)
            .unwrap();

        assert_eq!(q.correct.participant, q.participant);
        assert_eq!(q.correct.count_if_correct, 5);

        // applying twice still lands on the frozen value
        settings.apply_correct(&q.correct);
        settings.apply_correct(&q.correct);
        assert_eq!(settings.names[q.participant].count, 5);
    }

    #[test]
    fn test_count_at_maximum_does_not_overflow() {
        let mut settings = scenario();
        for participant in &mut settings.names {
            participant.count = u32::MAX;
        }
        let mut rng = StdRng::seed_from_u64(30);
        let q = QuestionGenerator::default()
            .generate(&settings, &mut rng)
            .unwrap();

        assert_eq!(q.correct.count_if_correct, u32::MAX);
        settings.apply_correct(&q.correct);
        assert_eq!(settings.names[q.participant].count, u32::MAX);
    }

    #[test]
    fn test_display_hides_answer_until_revealed() {
        let mut rng = StdRng::seed_from_u64(29);
        let q = QuestionGenerator::default()
            .generate(&scenario(), &mut rng)
            .unwrap();

        let hidden = q.display(false);
        assert_eq!(hidden.equation, format!("{} =", q.text));
        let shown = q.display(true);
        assert_eq!(shown.equation, format!("{} = {}", q.text, q.answer));
        assert_eq!(shown.who, q.who);
    }
}
