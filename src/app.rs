use std::sync::mpsc::{self, Receiver};
use std::time::Instant;

use crate::coordinator::{QuizEvent, SessionCoordinator};
use crate::error::CoordinatorError;
use crate::runtime::{Command, QuizInput};
use crate::source::QuestionSource;
use crate::stats::StatisticsEngine;
use crate::store::StatisticsStore;
use crate::ui::ViewState;

/// Glue between terminal input, the coordinator and the screen state
pub struct App<Q, S> {
    pub coordinator: SessionCoordinator<Q, S>,
    pub view: ViewState,
    events: Receiver<QuizEvent>,
}

impl<Q: QuestionSource, S: StatisticsStore> App<Q, S> {
    /// Build an app whose coordinator reports into this app's view.
    /// `configure` can adjust the coordinator (delay, history) before use.
    pub fn new(
        source: Q,
        stats: StatisticsEngine<S>,
        configure: impl FnOnce(SessionCoordinator<Q, S>) -> SessionCoordinator<Q, S>,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            coordinator: configure(SessionCoordinator::new(source, stats, tx)),
            view: ViewState::default(),
            events: rx,
        }
    }

    pub fn start(&mut self) -> Result<(), CoordinatorError> {
        self.coordinator.start()?;
        self.sync_view();
        Ok(())
    }

    /// Apply queued coordinator events to the view
    pub fn sync_view(&mut self) {
        for event in self.events.try_iter() {
            self.view.apply(event);
        }
    }

    /// Handle one input. Returns `false` once the player asked to quit.
    pub fn handle(&mut self, input: QuizInput, now: Instant) -> Result<bool, CoordinatorError> {
        match input {
            QuizInput::Tick => self.coordinator.on_tick(now)?,
            QuizInput::Redraw => {}
            QuizInput::Command(Command::Quit) => return Ok(false),
            QuizInput::Command(command @ (Command::Yes | Command::No)) => {
                if self.view.accepts_answer() {
                    self.coordinator.answer(command == Command::Yes, now)?;
                }
            }
            QuizInput::Command(Command::Restart) => self.coordinator.restart_round()?,
        }
        self.sync_view();
        Ok(true)
    }
}
