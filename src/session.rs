use chrono::{DateTime, Local};
use tracing::debug;

use crate::error::SessionError;
use crate::model::{AnswerOutcome, GameResult, Question, QUESTIONS_PER_ROUND};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SessionState {
    NotStarted,
    AwaitingQuestion,
    QuestionActive,
    RoundComplete,
}

/// State machine for one round of questions.
///
/// `current_index` counts answered questions, so question N is shown with
/// index N-1 and the index only moves on `submit_answer`.
#[derive(Debug, Clone)]
pub struct QuizSession {
    questions_per_round: usize,
    current_index: usize,
    correct_answers: usize,
    current_question: Option<Question>,
    state: SessionState,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    pub fn new() -> Self {
        Self::with_round_size(QUESTIONS_PER_ROUND)
    }

    /// A round has at least one question; `0` is treated as `1`.
    pub fn with_round_size(questions_per_round: usize) -> Self {
        Self {
            questions_per_round: questions_per_round.max(1),
            current_index: 0,
            correct_answers: 0,
            current_question: None,
            state: SessionState::NotStarted,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn correct_answers(&self) -> usize {
        self.correct_answers
    }

    pub fn questions_per_round(&self) -> usize {
        self.questions_per_round
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current_question.as_ref()
    }

    /// NotStarted -> AwaitingQuestion
    pub fn start(&mut self) -> Result<(), SessionError> {
        self.expect_state(SessionState::NotStarted, "start")?;
        self.state = SessionState::AwaitingQuestion;
        Ok(())
    }

    /// Feed the next question from the source. `None` means the source is
    /// exhausted, which can only happen mid-round with a broken source.
    pub fn load_next_question(&mut self, question: Option<Question>) -> Result<(), SessionError> {
        self.expect_state(SessionState::AwaitingQuestion, "load a question")?;
        let question = question.ok_or(SessionError::QuestionSourceExhausted)?;

        debug!(number = self.current_index + 1, "question active");
        self.current_question = Some(question);
        self.state = SessionState::QuestionActive;
        Ok(())
    }

    pub fn submit_answer(&mut self, answer: bool) -> Result<AnswerOutcome, SessionError> {
        self.expect_state(SessionState::QuestionActive, "submit an answer")?;
        let question = self
            .current_question
            .take()
            .ok_or(SessionError::InvalidState {
                operation: "submit an answer",
                state: self.state,
            })?;

        let is_correct = question.correct_answer == answer;
        if is_correct {
            self.correct_answers += 1;
        }
        self.current_index += 1;

        self.state = if self.current_index == self.questions_per_round {
            SessionState::RoundComplete
        } else {
            SessionState::AwaitingQuestion
        };

        Ok(AnswerOutcome { is_correct })
    }

    /// Zero the counters and wait for a fresh first question. Valid from any state.
    pub fn restart(&mut self) {
        self.current_index = 0;
        self.correct_answers = 0;
        self.current_question = None;
        self.state = SessionState::AwaitingQuestion;
    }

    pub fn is_complete(&self) -> bool {
        self.state == SessionState::RoundComplete
    }

    /// 1-based "N/10" label for the question currently in play
    pub fn question_number_display(&self) -> String {
        let number = (self.current_index + 1).min(self.questions_per_round);
        format!("{}/{}", number, self.questions_per_round)
    }

    /// The finished round, stamped with `timestamp`. `None` until complete.
    pub fn result(&self, timestamp: DateTime<Local>) -> Option<GameResult> {
        self.is_complete()
            .then(|| GameResult::new(self.correct_answers, self.questions_per_round, timestamp))
    }

    fn expect_state(
        &self,
        expected: SessionState,
        operation: &'static str,
    ) -> Result<(), SessionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }
}
