use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::model::{GameResult, StatisticsSnapshot, QUESTIONS_PER_ROUND};
use crate::store::{StatKey, StatWrite, StatisticsStore};
use crate::util::accuracy_percent;

const DATE_FORMAT: &str = "%d.%m.%y %H:%M";

/// Cross-round aggregation on top of a `StatisticsStore`
#[derive(Debug)]
pub struct StatisticsEngine<S> {
    store: S,
    questions_per_round: usize,
}

impl<S: StatisticsStore> StatisticsEngine<S> {
    pub fn new(store: S) -> Self {
        Self::with_round_size(store, QUESTIONS_PER_ROUND)
    }

    /// A round has at least one question
    pub fn with_round_size(store: S, questions_per_round: usize) -> Self {
        Self {
            store,
            questions_per_round: questions_per_round.max(1),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Fold one finished round into the persisted counters, stamping a new
    /// best game with the current time. All counters are written together;
    /// on error the store is unchanged.
    pub fn record_game(&mut self, result: &GameResult) -> Result<StatisticsSnapshot, StoreError> {
        self.record_game_at(result, Local::now())
    }

    /// Like `record_game`, with an explicit recording time. A replaced best
    /// game carries `recorded_at`, not the round's own timestamp.
    pub fn record_game_at(
        &mut self,
        result: &GameResult,
        recorded_at: DateTime<Local>,
    ) -> Result<StatisticsSnapshot, StoreError> {
        let games = self.read_count(StatKey::GamesCount) + 1;
        let total_correct = self.read_count(StatKey::TotalCorrectAnswers) + result.correct;

        let mut writes = vec![
            StatWrite::Int(StatKey::GamesCount, games as i64),
            StatWrite::Int(StatKey::TotalCorrectAnswers, total_correct as i64),
        ];

        let previous_best = self.best_game();
        let new_best = result.is_better_than(&previous_best);
        if new_best {
            writes.extend([
                StatWrite::Int(StatKey::BestGameCorrectAnswers, result.correct as i64),
                StatWrite::Int(StatKey::BestGameTotalQuestions, result.total as i64),
                StatWrite::Date(StatKey::BestGameDate, recorded_at),
            ]);
        }

        self.store.write_all(&writes)?;
        if new_best {
            info!(
                correct = result.correct,
                previous = previous_best.correct,
                "new best game"
            );
        }

        let snapshot = self.current_snapshot();
        debug!(
            games = snapshot.games_played,
            accuracy = snapshot.total_accuracy,
            "game recorded"
        );
        Ok(snapshot)
    }

    /// Recompute the snapshot from stored counters without writing anything
    pub fn current_snapshot(&self) -> StatisticsSnapshot {
        let games_played = self.read_count(StatKey::GamesCount);
        let total_correct = self.read_count(StatKey::TotalCorrectAnswers);

        StatisticsSnapshot {
            games_played,
            total_correct,
            best_game: self.best_game(),
            total_accuracy: accuracy_percent(total_correct, self.questions_per_round, games_played),
        }
    }

    /// Stored best game. Without a stored date the current time stands in.
    fn best_game(&self) -> GameResult {
        GameResult::new(
            self.read_count(StatKey::BestGameCorrectAnswers),
            self.read_count(StatKey::BestGameTotalQuestions),
            self.store
                .get_date(StatKey::BestGameDate)
                .unwrap_or_else(Local::now),
        )
    }

    // negative values can only come from a damaged store
    fn read_count(&self, key: StatKey) -> usize {
        usize::try_from(self.store.get_int(key)).unwrap_or(0)
    }
}

/// End-of-round message shown to the player
pub fn format_summary(result: &GameResult, snapshot: &StatisticsSnapshot) -> String {
    format!(
        "Your result: {}/{}\n{}",
        result.correct,
        result.total,
        format_statistics(snapshot)
    )
}

pub fn format_statistics(snapshot: &StatisticsSnapshot) -> String {
    format!(
        "Quizzes played: {}\nRecord: {}/{} ({})\nAverage accuracy: {:.2}%",
        snapshot.games_played,
        snapshot.best_game.correct,
        snapshot.best_game.total,
        format_date(&snapshot.best_game.timestamp),
        snapshot.total_accuracy,
    )
}

pub fn format_date(date: &DateTime<Local>) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Message used when statistics could not be recorded
pub fn fallback_summary(result: &GameResult) -> String {
    if result.correct == result.total {
        format!(
            "Congratulations, you answered {} out of {}!",
            result.correct, result.total
        )
    } else {
        format!(
            "You answered {} out of {}, try again!",
            result.correct, result.total
        )
    }
}
