//! Quiz session state machine
//!
//! Two states: awaiting an answer and answered. The first answer to a
//! question is binding; a repeat selection returns the recorded result
//! without touching the streak. Moving on requires generating the next
//! question.

use serde::Serialize;

use super::generator::GeneratedQuestion;

/// Outcome of an answered question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Correct,
    Incorrect,
}

/// Result returned from an answer selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerResult {
    pub outcome: Outcome,
    /// The target's display name, revealed once answered
    pub correct_name: String,
    /// Streak after this answer
    pub streak: u32,
    /// False when this selection repeated an already-answered question
    pub first_answer: bool,
}

#[derive(Debug)]
struct ActiveQuestion {
    question: GeneratedQuestion,
    selection: Option<String>,
    outcome: Option<Outcome>,
}

/// Tracks the active question, the selected answer, and the running streak
#[derive(Debug, Default)]
pub struct QuizSession {
    streak: u32,
    active: Option<ActiveQuestion>,
}

impl QuizSession {
    /// Start the next question, clearing any previous selection and outcome
    pub fn begin(&mut self, question: GeneratedQuestion) {
        self.active = Some(ActiveQuestion {
            question,
            selection: None,
            outcome: None,
        });
    }

    /// The question currently posed, if any
    pub fn question(&self) -> Option<&GeneratedQuestion> {
        self.active.as_ref().map(|a| &a.question)
    }

    /// Running correct-answer streak
    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// The selection made for the active question, once answered
    pub fn selection(&self) -> Option<&str> {
        self.active.as_ref().and_then(|a| a.selection.as_deref())
    }

    /// Verdict for the active question, once answered
    pub fn outcome(&self) -> Option<Outcome> {
        self.active.as_ref().and_then(|a| a.outcome)
    }

    /// Answer the active question.
    ///
    /// Returns `None` when no question is posed. Once answered, further
    /// selections are no-ops that return the recorded result.
    pub fn select_answer(&mut self, choice: &str) -> Option<AnswerResult> {
        let active = self.active.as_mut()?;
        let correct_name = active.question.target.display_name().to_string();

        if let Some(outcome) = active.outcome {
            return Some(AnswerResult {
                outcome,
                correct_name,
                streak: self.streak,
                first_answer: false,
            });
        }

        let outcome = if choice == correct_name {
            Outcome::Correct
        } else {
            Outcome::Incorrect
        };

        self.streak = match outcome {
            Outcome::Correct => self.streak + 1,
            Outcome::Incorrect => 0,
        };

        active.selection = Some(choice.to_string());
        active.outcome = Some(outcome);

        Some(AnswerResult {
            outcome,
            correct_name,
            streak: self.streak,
            first_answer: true,
        })
    }

    /// Drop the active question and zero the streak (new quiz, list load,
    /// list clear)
    pub fn reset(&mut self) {
        self.streak = 0;
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::generator::Modality;
    use lifer_common::SpeciesRecord;

    fn question(target_name: &str, wrong: &str) -> GeneratedQuestion {
        GeneratedQuestion {
            target: SpeciesRecord {
                id: 1,
                common_name: Some(target_name.to_string()),
                scientific_name: "Avis exempli".to_string(),
                photo_url: None,
            },
            modality: Modality::Photo,
            options: vec![target_name.to_string(), wrong.to_string()],
        }
    }

    #[test]
    fn answer_without_question_is_none() {
        let mut session = QuizSession::default();
        assert!(session.select_answer("Amani Sunbird").is_none());
    }

    #[test]
    fn correct_answer_increments_streak() {
        let mut session = QuizSession::default();
        session.begin(question("Amani Sunbird", "Sokoke Pipit"));

        let result = session.select_answer("Amani Sunbird").unwrap();
        assert_eq!(result.outcome, Outcome::Correct);
        assert_eq!(result.streak, 1);
        assert!(result.first_answer);
    }

    #[test]
    fn incorrect_answer_zeroes_streak() {
        let mut session = QuizSession::default();
        session.begin(question("Amani Sunbird", "Sokoke Pipit"));
        session.select_answer("Amani Sunbird").unwrap();

        session.begin(question("Amani Sunbird", "Sokoke Pipit"));
        let result = session.select_answer("Sokoke Pipit").unwrap();
        assert_eq!(result.outcome, Outcome::Incorrect);
        assert_eq!(result.streak, 0);
        assert_eq!(result.correct_name, "Amani Sunbird");
    }

    #[test]
    fn selection_and_outcome_are_exposed_once_answered() {
        let mut session = QuizSession::default();
        session.begin(question("Amani Sunbird", "Sokoke Pipit"));
        assert_eq!(session.selection(), None);
        assert_eq!(session.outcome(), None);

        session.select_answer("Sokoke Pipit").unwrap();
        assert_eq!(session.selection(), Some("Sokoke Pipit"));
        assert_eq!(session.outcome(), Some(Outcome::Incorrect));
    }

    #[test]
    fn first_answer_is_binding() {
        let mut session = QuizSession::default();
        session.begin(question("Amani Sunbird", "Sokoke Pipit"));

        session.select_answer("Sokoke Pipit").unwrap();
        let second = session.select_answer("Amani Sunbird").unwrap();

        // The second selection neither rescues the outcome nor moves the
        // streak.
        assert_eq!(second.outcome, Outcome::Incorrect);
        assert_eq!(second.streak, 0);
        assert!(!second.first_answer);
        assert_eq!(session.streak(), 0);
    }

    #[test]
    fn streak_accumulates_across_questions() {
        let mut session = QuizSession::default();
        for _ in 0..3 {
            session.begin(question("Amani Sunbird", "Sokoke Pipit"));
            session.select_answer("Amani Sunbird").unwrap();
        }
        assert_eq!(session.streak(), 3);
    }

    #[test]
    fn begin_clears_previous_outcome() {
        let mut session = QuizSession::default();
        session.begin(question("Amani Sunbird", "Sokoke Pipit"));
        session.select_answer("Amani Sunbird").unwrap();

        session.begin(question("Sokoke Pipit", "Amani Sunbird"));
        // New question is unanswered: selecting now is a first answer again
        let result = session.select_answer("Sokoke Pipit").unwrap();
        assert!(result.first_answer);
        assert_eq!(result.streak, 2);
    }

    #[test]
    fn reset_zeroes_streak_and_drops_question() {
        let mut session = QuizSession::default();
        session.begin(question("Amani Sunbird", "Sokoke Pipit"));
        session.select_answer("Amani Sunbird").unwrap();

        session.reset();
        assert_eq!(session.streak(), 0);
        assert!(session.question().is_none());
    }
}
