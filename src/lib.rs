// Library surface shared by the binary and the integration tests.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod history;
pub mod logging;
pub mod model;
pub mod movies;
pub mod runtime;
pub mod session;
pub mod source;
pub mod stats;
pub mod store;
pub mod ui;
pub mod util;

pub use coordinator::{QuizEvent, SessionCoordinator};
pub use model::{GameResult, Question, StatisticsSnapshot, QUESTIONS_PER_ROUND};
pub use session::{QuizSession, SessionState};
pub use stats::StatisticsEngine;
