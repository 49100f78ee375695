use std::collections::VecDeque;

use crate::error::SourceError;
use crate::model::Question;

/// Supplier of questions for the coordinator.
///
/// `load_data` must succeed before `request_next_question` is used. A
/// well-formed source only returns `None` once it has served everything it
/// was configured to serve.
pub trait QuestionSource {
    fn load_data(&mut self) -> Result<(), SourceError>;
    fn request_next_question(&mut self) -> Option<Question>;
}

impl<Q: QuestionSource + ?Sized> QuestionSource for Box<Q> {
    fn load_data(&mut self) -> Result<(), SourceError> {
        (**self).load_data()
    }

    fn request_next_question(&mut self) -> Option<Question> {
        (**self).request_next_question()
    }
}

/// Serves a fixed list of questions in order, restarting from the top on
/// every load. Load failures can be queued up front.
#[derive(Debug, Clone, Default)]
pub struct ScriptedQuestionSource {
    questions: Vec<Question>,
    cursor: usize,
    loaded: bool,
    failures: VecDeque<String>,
    loads: usize,
}

impl ScriptedQuestionSource {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            ..Self::default()
        }
    }

    /// Source whose answers follow `answers`, one question per entry
    pub fn from_answers(answers: &[bool]) -> Self {
        let questions = answers
            .iter()
            .enumerate()
            .map(|(i, &answer)| {
                Question::new(
                    format!("movie-{}", i + 1),
                    format!("Scripted question {}?", i + 1),
                    answer,
                )
            })
            .collect();
        Self::new(questions)
    }

    /// Make the next load fail with `message`
    pub fn fail_next_load(mut self, message: impl Into<String>) -> Self {
        self.failures.push_back(message.into());
        self
    }

    /// Number of `load_data` calls so far, failed ones included
    pub fn loads(&self) -> usize {
        self.loads
    }

    pub fn served(&self) -> usize {
        self.cursor
    }
}

impl QuestionSource for ScriptedQuestionSource {
    fn load_data(&mut self) -> Result<(), SourceError> {
        self.loads += 1;
        if let Some(message) = self.failures.pop_front() {
            self.loaded = false;
            return Err(SourceError::Load(message));
        }
        self.cursor = 0;
        self.loaded = true;
        Ok(())
    }

    fn request_next_question(&mut self) -> Option<Question> {
        if !self.loaded {
            return None;
        }
        let question = self.questions.get(self.cursor).cloned()?;
        self.cursor += 1;
        Some(question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_serves_in_order_after_load() {
        let mut source = ScriptedQuestionSource::from_answers(&[true, false]);
        assert!(source.request_next_question().is_none());

        source.load_data().unwrap();
        assert!(source.request_next_question().unwrap().correct_answer);
        assert!(!source.request_next_question().unwrap().correct_answer);
        assert!(source.request_next_question().is_none());
        assert_eq!(source.served(), 2);
    }

    #[test]
    fn test_reload_starts_over() {
        let mut source = ScriptedQuestionSource::from_answers(&[true]);
        source.load_data().unwrap();
        source.request_next_question().unwrap();
        source.load_data().unwrap();
        assert!(source.request_next_question().is_some());
        assert_eq!(source.loads(), 2);
    }

    #[test]
    fn test_queued_failure() {
        let mut source = ScriptedQuestionSource::from_answers(&[true]).fail_next_load("offline");
        assert_matches!(source.load_data(), Err(SourceError::Load(msg)) if msg == "offline");
        assert!(source.request_next_question().is_none());
        assert!(source.load_data().is_ok());
    }
}
