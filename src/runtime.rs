use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::warn;

/// Player commands understood by the quiz loop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Yes,
    No,
    Restart,
    Quit,
}

impl Command {
    /// Map a key press to a command. `y`/Right answer yes, `n`/Left answer no.
    pub fn from_key(key: KeyEvent) -> Option<Self> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Command::Quit)
            }
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Right => Some(Command::Yes),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Left => Some(Command::No),
            KeyCode::Char('r') | KeyCode::Char('R') | KeyCode::Enter => Some(Command::Restart),
            KeyCode::Esc | KeyCode::Char('q') => Some(Command::Quit),
            _ => None,
        }
    }
}

/// What the quiz loop reacts to. Keys are already mapped to commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizInput {
    Command(Command),
    Redraw,
    /// Nothing arrived within one tick; due feedback delays fire here
    Tick,
}

impl QuizInput {
    /// Terminal event to quiz input. Unmapped keys and mouse events are dropped.
    pub fn from_event(event: Event) -> Option<Self> {
        match event {
            Event::Key(key) => Command::from_key(key).map(QuizInput::Command),
            Event::Resize(_, _) => Some(QuizInput::Redraw),
            _ => None,
        }
    }
}

/// Inputs queued for the quiz loop, read one tick at a time
pub struct InputQueue {
    rx: Receiver<QuizInput>,
    tick: Duration,
}

impl InputQueue {
    /// Read the terminal on a background thread. If the terminal stops
    /// delivering events the quiz is told to quit.
    pub fn terminal(tick: Duration) -> Self {
        let (tx, queue) = Self::channel(tick);

        std::thread::spawn(move || loop {
            let input = match event::read() {
                Ok(event) => match QuizInput::from_event(event) {
                    Some(input) => input,
                    None => continue,
                },
                Err(e) => {
                    warn!(error = %e, "terminal input closed");
                    let _ = tx.send(QuizInput::Command(Command::Quit));
                    break;
                }
            };
            if tx.send(input).is_err() {
                break;
            }
        });

        queue
    }

    /// A queue fed by hand, for driving the quiz without a terminal
    pub fn channel(tick: Duration) -> (Sender<QuizInput>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self { rx, tick })
    }

    /// Wait up to one tick for the next input
    pub fn next(&self) -> QuizInput {
        match self.rx.recv_timeout(self.tick) {
            Ok(input) => input,
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => QuizInput::Tick,
        }
    }
}
