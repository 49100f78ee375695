use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Number of questions in one round
pub const QUESTIONS_PER_ROUND: usize = 10;

/// A single yes/no question shown to the player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub image_ref: String,
    pub text: String,
    pub correct_answer: bool,
}

impl Question {
    pub fn new(image_ref: impl Into<String>, text: impl Into<String>, correct_answer: bool) -> Self {
        Self {
            image_ref: image_ref.into(),
            text: text.into(),
            correct_answer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub is_correct: bool,
}

/// One completed round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub correct: usize,
    pub total: usize,
    pub timestamp: DateTime<Local>,
}

impl GameResult {
    pub fn new(correct: usize, total: usize, timestamp: DateTime<Local>) -> Self {
        Self {
            correct,
            total,
            timestamp,
        }
    }

    /// Strictly more correct answers. Ties are never better, and neither
    /// `total` nor recency breaks them.
    pub fn is_better_than(&self, previous_record: &GameResult) -> bool {
        self.correct > previous_record.correct
    }
}

/// Aggregate statistics across every recorded round
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsSnapshot {
    pub games_played: usize,
    pub total_correct: usize,
    pub best_game: GameResult,
    pub total_accuracy: f64,
}
