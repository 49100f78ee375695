use chrono::Local;
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::error::{CoordinatorError, SessionError, SourceError};
use crate::history::GameLog;
use crate::model::StatisticsSnapshot;
use crate::session::QuizSession;
use crate::source::QuestionSource;
use crate::stats::{fallback_summary, format_summary, StatisticsEngine};
use crate::store::StatisticsStore;

/// Pause between judging an answer and moving on
pub const DEFAULT_FEEDBACK_DELAY: Duration = Duration::from_millis(1000);

/// What the presentation layer needs to draw a question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub number: String,
    pub text: String,
    pub image_ref: String,
}

/// Notifications sent to the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum QuizEvent {
    LoadingStarted,
    LoadingFinished,
    QuestionReady(QuestionView),
    AnswerJudged {
        is_correct: bool,
    },
    RoundComplete {
        summary: String,
        snapshot: Option<StatisticsSnapshot>,
    },
    LoadFailed {
        message: String,
    },
}

/// Handle for an outstanding `load_data` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

/// Scheduled `advance` for a judged answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceTicket {
    generation: u64,
    due: Instant,
}

impl AdvanceTicket {
    pub fn due(&self) -> Instant {
        self.due
    }
}

/// Drives a `QuizSession` from a question source and records finished
/// rounds.
///
/// Every restart bumps a generation counter. Load and advance tickets from an
/// older generation are dropped when they come back, so a timer that fires
/// after a restart cannot touch the new round.
pub struct SessionCoordinator<Q, S> {
    session: QuizSession,
    source: Q,
    stats: StatisticsEngine<S>,
    events: Sender<QuizEvent>,
    history: Option<GameLog>,
    feedback_delay: Duration,
    generation: u64,
    loading: Option<LoadTicket>,
    pending_advance: Option<AdvanceTicket>,
}

impl<Q: QuestionSource, S: StatisticsStore> SessionCoordinator<Q, S> {
    pub fn new(source: Q, stats: StatisticsEngine<S>, events: Sender<QuizEvent>) -> Self {
        Self {
            session: QuizSession::new(),
            source,
            stats,
            events,
            history: None,
            feedback_delay: DEFAULT_FEEDBACK_DELAY,
            generation: 0,
            loading: None,
            pending_advance: None,
        }
    }

    pub fn with_feedback_delay(mut self, delay: Duration) -> Self {
        self.feedback_delay = delay;
        self
    }

    pub fn with_history(mut self, history: GameLog) -> Self {
        self.history = Some(history);
        self
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    pub fn source(&self) -> &Q {
        &self.source
    }

    pub fn stats(&self) -> &StatisticsEngine<S> {
        &self.stats
    }

    pub fn snapshot(&self) -> StatisticsSnapshot {
        self.stats.current_snapshot()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    pub fn pending_advance(&self) -> Option<AdvanceTicket> {
        self.pending_advance
    }

    /// The question in play, if any
    pub fn current_view(&self) -> Option<QuestionView> {
        self.session.current_question().map(|q| QuestionView {
            number: self.session.question_number_display(),
            text: q.text.clone(),
            image_ref: q.image_ref.clone(),
        })
    }

    /// Begin the first round: load data and show the first question.
    pub fn start(&mut self) -> Result<(), CoordinatorError> {
        self.session.start()?;
        info!("quiz started");
        self.run_load()
    }

    /// Throw away the current round and load a fresh one. Any pending
    /// advance or outstanding load becomes stale.
    pub fn restart_round(&mut self) -> Result<(), CoordinatorError> {
        self.generation += 1;
        self.pending_advance = None;
        self.loading = None;
        self.session.restart();
        info!(generation = self.generation, "round restarted");
        self.run_load()
    }

    /// Load synchronously against the owned source.
    pub fn run_load(&mut self) -> Result<(), CoordinatorError> {
        let ticket = self.begin_load()?;
        let result = self.source.load_data();
        self.finish_load(ticket, result)
    }

    /// First half of a load. Fails with `Busy` while another load is out.
    pub fn begin_load(&mut self) -> Result<LoadTicket, CoordinatorError> {
        if self.loading.is_some() {
            return Err(CoordinatorError::Busy);
        }
        let ticket = LoadTicket {
            generation: self.generation,
        };
        self.loading = Some(ticket);
        self.emit(QuizEvent::LoadingStarted);
        Ok(ticket)
    }

    /// Second half of a load. Tickets that are no longer current are ignored.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<(), SourceError>,
    ) -> Result<(), CoordinatorError> {
        if self.loading != Some(ticket) {
            debug!(?ticket, "ignoring stale load");
            return Ok(());
        }
        self.loading = None;
        self.emit(QuizEvent::LoadingFinished);

        match result {
            Ok(()) => self.request_question(),
            Err(e) => {
                warn!(error = %e, "question data failed to load");
                self.emit(QuizEvent::LoadFailed {
                    message: e.to_string(),
                });
                Ok(())
            }
        }
    }

    /// Judge the answer for the active question and schedule `advance`.
    ///
    /// Answering with no active question is a caller bug. Debug builds
    /// return the error; release builds log it and carry on.
    pub fn answer(
        &mut self,
        is_yes: bool,
        now: Instant,
    ) -> Result<Option<AdvanceTicket>, CoordinatorError> {
        let outcome = match self.session.submit_answer(is_yes) {
            Ok(outcome) => outcome,
            Err(e) if cfg!(debug_assertions) => return Err(e.into()),
            Err(e) => {
                warn!(error = %e, "answer ignored");
                return Ok(None);
            }
        };

        self.emit(QuizEvent::AnswerJudged {
            is_correct: outcome.is_correct,
        });

        let ticket = AdvanceTicket {
            generation: self.generation,
            due: now + self.feedback_delay,
        };
        self.pending_advance = Some(ticket);
        Ok(Some(ticket))
    }

    /// Fire the pending advance once its delay has passed
    pub fn on_tick(&mut self, now: Instant) -> Result<(), CoordinatorError> {
        match self.pending_advance {
            Some(ticket) if now >= ticket.due => self.advance(ticket),
            _ => Ok(()),
        }
    }

    /// Show the next question, or record the round when it is over.
    pub fn advance(&mut self, ticket: AdvanceTicket) -> Result<(), CoordinatorError> {
        if ticket.generation != self.generation || self.pending_advance != Some(ticket) {
            debug!(?ticket, "ignoring stale advance");
            return Ok(());
        }
        self.pending_advance = None;

        if self.session.is_complete() {
            self.finish_round();
            Ok(())
        } else {
            self.request_question()
        }
    }

    fn request_question(&mut self) -> Result<(), CoordinatorError> {
        let question = self.source.request_next_question();
        match self.session.load_next_question(question) {
            Ok(()) => {
                if let Some(view) = self.current_view() {
                    self.emit(QuizEvent::QuestionReady(view));
                }
                Ok(())
            }
            Err(e @ SessionError::QuestionSourceExhausted) => {
                error!(index = self.session.current_index(), "question source exhausted mid-round");
                self.emit(QuizEvent::LoadFailed {
                    message: e.to_string(),
                });
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn finish_round(&mut self) {
        let Some(result) = self.session.result(Local::now()) else {
            return;
        };

        let (summary, snapshot) = match self.stats.record_game(&result) {
            Ok(snapshot) => (format_summary(&result, &snapshot), Some(snapshot)),
            Err(e) => {
                error!(error = %e, "failed to record game statistics");
                (fallback_summary(&result), None)
            }
        };

        if let Some(history) = &self.history {
            if let Err(e) = history.append(&result) {
                warn!(error = %e, "failed to append round to history");
            }
        }

        info!(correct = result.correct, total = result.total, "round complete");
        self.emit(QuizEvent::RoundComplete { summary, snapshot });
    }

    fn emit(&self, event: QuizEvent) {
        // a dropped receiver just means nobody is listening any more
        let _ = self.events.send(event);
    }
}
