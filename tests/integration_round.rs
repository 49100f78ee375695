use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use chrono::{Local, TimeZone};
use moviequiz::coordinator::QuizEvent;
use moviequiz::history::GameLog;
use moviequiz::source::ScriptedQuestionSource;
use moviequiz::store::{SqliteStatisticsStore, StatKey, StatisticsStore};
use moviequiz::{GameResult, SessionCoordinator, SessionState, StatisticsEngine, QUESTIONS_PER_ROUND};
use tempfile::tempdir;

type Coordinator = SessionCoordinator<ScriptedQuestionSource, SqliteStatisticsStore>;

fn coordinator(
    answers: &[bool],
    store: SqliteStatisticsStore,
) -> (Coordinator, Receiver<QuizEvent>) {
    let (tx, rx) = mpsc::channel();
    let coordinator = SessionCoordinator::new(
        ScriptedQuestionSource::from_answers(answers),
        StatisticsEngine::new(store),
        tx,
    )
    .with_feedback_delay(Duration::ZERO);
    (coordinator, rx)
}

/// Answer every question, advancing as soon as the answer is judged
fn play_round(coordinator: &mut Coordinator, answers: &[bool]) {
    for &answer in answers {
        let ticket = coordinator
            .answer(answer, Instant::now())
            .expect("question should be active")
            .expect("answer should be accepted");
        coordinator.advance(ticket).unwrap();
    }
}

fn round_complete(rx: &Receiver<QuizEvent>) -> Option<(String, Option<moviequiz::StatisticsSnapshot>)> {
    rx.try_iter().find_map(|event| match event {
        QuizEvent::RoundComplete { summary, snapshot } => Some((summary, snapshot)),
        _ => None,
    })
}

#[test]
fn perfect_round_sets_best_game() {
    let truths = [true, false, true, true, false, true, false, false, true, true];
    let (mut coordinator, rx) = coordinator(&truths, SqliteStatisticsStore::open_in_memory().unwrap());
    coordinator.start().unwrap();

    play_round(&mut coordinator, &truths);

    assert!(coordinator.session().is_complete());
    assert_eq!(coordinator.session().correct_answers(), QUESTIONS_PER_ROUND);

    let (summary, snapshot) = round_complete(&rx).expect("round should complete");
    let snapshot = snapshot.unwrap();
    assert_eq!(snapshot.best_game.correct, 10);
    assert_eq!(snapshot.games_played, 1);
    assert!(summary.contains("Record: 10/10"));
}

#[test]
fn question_numbers_advance_on_answer() {
    let (mut coordinator, rx) = coordinator(&[true; 10], SqliteStatisticsStore::open_in_memory().unwrap());
    coordinator.start().unwrap();

    let mut numbers = Vec::new();
    for _ in 0..QUESTIONS_PER_ROUND {
        numbers.push(coordinator.current_view().unwrap().number);
        assert_eq!(
            coordinator.session().current_index() + 1,
            numbers.len(),
            "question N is shown with index N-1"
        );
        play_round(&mut coordinator, &[false]);
    }

    let expected: Vec<String> = (1..=10).map(|n| format!("{n}/10")).collect();
    assert_eq!(numbers, expected);

    let ready = rx
        .try_iter()
        .filter(|e| matches!(e, QuizEvent::QuestionReady(_)))
        .count();
    assert_eq!(ready, QUESTIONS_PER_ROUND);
}

#[test]
fn restart_mid_round_discards_progress() {
    let (mut coordinator, _rx) = coordinator(&[true; 10], SqliteStatisticsStore::open_in_memory().unwrap());
    coordinator.start().unwrap();
    play_round(&mut coordinator, &[true, true, true, true]);
    assert_eq!(coordinator.session().correct_answers(), 4);

    coordinator.restart_round().unwrap();

    assert_eq!(coordinator.session().current_index(), 0);
    assert_eq!(coordinator.session().correct_answers(), 0);
    assert_eq!(coordinator.session().state(), SessionState::QuestionActive);
    assert_eq!(coordinator.current_view().unwrap().number, "1/10");
    assert_eq!(coordinator.snapshot().games_played, 0);
}

#[test]
fn is_complete_only_after_full_round() {
    let (mut coordinator, _rx) = coordinator(&[true; 10], SqliteStatisticsStore::open_in_memory().unwrap());
    coordinator.start().unwrap();
    for answered in 1..=QUESTIONS_PER_ROUND {
        play_round(&mut coordinator, &[true]);
        assert_eq!(coordinator.session().is_complete(), answered == QUESTIONS_PER_ROUND);
    }
}

#[test]
fn statistics_survive_reopen() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("stats.db");

    {
        let (mut coordinator, _rx) = coordinator(&[true; 10], SqliteStatisticsStore::open(&db).unwrap());
        coordinator.start().unwrap();
        // 7 right, 3 wrong
        play_round(
            &mut coordinator,
            &[true, true, true, true, true, true, true, false, false, false],
        );
        assert_eq!(coordinator.snapshot().games_played, 1);
    }

    let (mut coordinator, rx) = coordinator(&[true; 10], SqliteStatisticsStore::open(&db).unwrap());
    let before = coordinator.snapshot();
    assert_eq!(before.games_played, 1);
    assert_eq!(before.best_game.correct, 7);

    coordinator.start().unwrap();
    // 8 right, 2 wrong
    play_round(
        &mut coordinator,
        &[true, true, true, true, true, true, true, true, false, false],
    );

    let (_, snapshot) = round_complete(&rx).unwrap();
    let snapshot = snapshot.unwrap();
    assert_eq!(snapshot.games_played, 2);
    assert_eq!(snapshot.total_correct, 15);
    assert_eq!(snapshot.total_accuracy, 75.0);
    assert_eq!(snapshot.best_game.correct, 8);
}

#[test]
fn tied_round_keeps_first_record_date() {
    let mut store = SqliteStatisticsStore::open_in_memory().unwrap();
    let record_date = Local.with_ymd_and_hms(2024, 5, 30, 9, 15, 0).unwrap();
    store.set_int(StatKey::GamesCount, 1).unwrap();
    store.set_int(StatKey::TotalCorrectAnswers, 7).unwrap();
    store.set_int(StatKey::BestGameCorrectAnswers, 7).unwrap();
    store.set_int(StatKey::BestGameTotalQuestions, 10).unwrap();
    store.set_date(StatKey::BestGameDate, record_date).unwrap();

    let mut engine = StatisticsEngine::new(store);
    let snapshot = engine
        .record_game(&GameResult::new(7, 10, Local::now()))
        .unwrap();

    assert_eq!(snapshot.best_game.correct, 7);
    assert_eq!(snapshot.best_game.timestamp, record_date);
    assert_eq!(engine.store().get_date(StatKey::BestGameDate), Some(record_date));
}

#[test]
fn finished_rounds_are_logged() {
    let dir = tempdir().unwrap();
    let log = GameLog::new(dir.path().join("history.csv"));

    let (tx, _rx) = mpsc::channel();
    let mut coordinator = SessionCoordinator::new(
        ScriptedQuestionSource::from_answers(&[false; 10]),
        StatisticsEngine::new(SqliteStatisticsStore::open_in_memory().unwrap()),
        tx,
    )
    .with_feedback_delay(Duration::ZERO)
    .with_history(log.clone());

    coordinator.start().unwrap();
    play_round(&mut coordinator, &[false, false, false, true, true, true, true, true, true, true]);

    let rounds = log.recent(10).unwrap();
    assert_eq!(rounds.len(), 1);
    assert_eq!(rounds[0].correct, 3);
    assert_eq!(rounds[0].total, 10);
}

#[test]
fn load_failure_then_retry() {
    let (tx, rx) = mpsc::channel();
    let source = ScriptedQuestionSource::from_answers(&[true; 10])
        .fail_next_load("The Internet connection appears to be offline.");
    let mut coordinator = SessionCoordinator::new(
        source,
        StatisticsEngine::new(SqliteStatisticsStore::open_in_memory().unwrap()),
        tx,
    );

    coordinator.start().unwrap();
    let events: Vec<QuizEvent> = rx.try_iter().collect();
    assert_eq!(
        events,
        vec![
            QuizEvent::LoadingStarted,
            QuizEvent::LoadingFinished,
            QuizEvent::LoadFailed {
                message: "The Internet connection appears to be offline.".to_string()
            },
        ]
    );

    coordinator.restart_round().unwrap();
    assert!(coordinator.current_view().is_some());
    assert_eq!(coordinator.source().loads(), 2);
}
