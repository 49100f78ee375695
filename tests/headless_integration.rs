use std::time::{Duration, Instant};

use moviequiz::app::App;
use moviequiz::movies::{BundledMoviesLoader, MovieQuestionFactory};
use moviequiz::runtime::{Command, InputQueue, QuizInput};
use moviequiz::source::ScriptedQuestionSource;
use moviequiz::stats::StatisticsEngine;
use moviequiz::store::MemoryStatisticsStore;

// Headless run through the input queue + App without a TTY.
// Answers are sent one at a time; ticks in between fire the feedback delay.
#[test]
fn headless_round_completes() {
    let mut app = App::new(
        ScriptedQuestionSource::from_answers(&[true; 10]),
        StatisticsEngine::new(MemoryStatisticsStore::new()),
        |c| c.with_feedback_delay(Duration::from_millis(5)),
    );
    app.start().unwrap();

    let (tx, input) = InputQueue::channel(Duration::from_millis(2));

    for _ in 0..2000u32 {
        if app.view.dialog.is_some() {
            break;
        }
        if app.view.accepts_answer() {
            tx.send(QuizInput::Command(Command::Yes)).unwrap();
        }
        assert!(app.handle(input.next(), Instant::now()).unwrap());
    }

    let dialog = app.view.dialog.clone().expect("round should finish");
    assert_eq!(dialog.title, "This round is over!");
    assert!(dialog.message.starts_with("Your result: 10/10"));
    assert_eq!(app.coordinator.snapshot().games_played, 1);

    // play again from the dialog
    tx.send(QuizInput::Command(Command::Restart)).unwrap();
    app.handle(input.next(), Instant::now()).unwrap();
    assert!(app.view.dialog.is_none());
    assert_eq!(app.view.question.as_ref().unwrap().number, "1/10");
}

#[test]
fn headless_bundled_movies_round() {
    let factory = MovieQuestionFactory::new(Box::new(BundledMoviesLoader)).with_seed(3);
    let mut app = App::new(
        factory,
        StatisticsEngine::new(MemoryStatisticsStore::new()),
        |c| c.with_feedback_delay(Duration::ZERO),
    );
    app.start().unwrap();

    let mut answered = 0;
    while app.view.dialog.is_none() && answered < 20 {
        assert!(app.view.accepts_answer());
        app.handle(QuizInput::Command(Command::No), Instant::now()).unwrap();
        app.handle(QuizInput::Tick, Instant::now()).unwrap();
        answered += 1;
    }

    assert_eq!(answered, 10);
    assert!(app.coordinator.session().is_complete());
    let snapshot = app.coordinator.snapshot();
    assert_eq!(snapshot.total_correct, app.coordinator.session().correct_answers());
}
