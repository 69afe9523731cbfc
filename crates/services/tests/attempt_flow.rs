use std::sync::Arc;
use std::time::Duration;

use quiz_core::model::{Answer, Question, QuestionKind, Quiz, QuizDraft, StudentIdentity};
use quiz_core::time::fixed_clock;
use services::{
    AttemptDriver, AttemptEvent, AttemptProgress, DriveOutcome, QuizServices, QuizSettings,
    RecordingNotifier,
};
use storage::repository::Storage;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

fn services(storage: &Storage) -> QuizServices {
    let settings = QuizSettings::from_lookup(|_| None).unwrap();
    QuizServices::build(
        storage,
        &settings,
        fixed_clock(),
        Arc::new(RecordingNotifier::new()),
    )
}

async fn five_second_quiz(services: &QuizServices) -> Quiz {
    services
        .catalog()
        .create(
            QuizDraft::new("Five seconds")
                .with_duration_secs(5)
                .with_question(Question::new(
                    "q1",
                    "Pick A",
                    QuestionKind::MultipleChoice {
                        options: vec!["A".into(), "B".into()],
                        correct_answer: 0,
                    },
                )),
        )
        .await
        .unwrap()
}

fn ana() -> StudentIdentity {
    StudentIdentity::new("Ana", "ana@school.edu")
}

async fn drive(
    services: &QuizServices,
    quiz: &Quiz,
    events: Vec<AttemptEvent>,
) -> DriveOutcome {
    drive_watched(services, quiz, events).await.0
}

async fn drive_watched(
    services: &QuizServices,
    quiz: &Quiz,
    events: Vec<AttemptEvent>,
) -> (DriveOutcome, watch::Receiver<AttemptProgress>) {
    let attempt = services
        .sessions()
        .start(&ana(), quiz.code().as_str())
        .await
        .unwrap();
    let (mut driver, progress) = AttemptDriver::new(services.sessions().clone(), attempt);
    let (tx, mut rx) = mpsc::channel(16);
    for event in events {
        tx.send(event).await.unwrap();
    }
    // keep the sender alive so only the timer or a submit can end the run
    let outcome = driver.run(&mut rx).await.unwrap();
    drop(tx);
    (outcome, progress)
}

#[tokio::test(start_paused = true)]
async fn manual_submit_of_correct_answer() {
    let storage = Storage::in_memory();
    let services = services(&storage);
    let quiz = five_second_quiz(&services).await;

    let (outcome, progress) = drive_watched(
        &services,
        &quiz,
        vec![
            AttemptEvent::AnswerCurrent(Answer::Choice(0)),
            AttemptEvent::Submit,
        ],
    )
    .await;

    let DriveOutcome::Submitted(result) = outcome else {
        panic!("expected submission");
    };
    assert!(progress.borrow().is_finished());
    assert_eq!(result.score().earned, 1);
    assert_eq!(result.total_questions(), 1);
    assert!(!result.auto_submitted());
}

#[tokio::test(start_paused = true)]
async fn timer_expiry_submits_unanswered_attempt() {
    let storage = Storage::in_memory();
    let services = services(&storage);
    let quiz = five_second_quiz(&services).await;

    let started = Instant::now();
    let outcome = drive(&services, &quiz, Vec::new()).await;
    assert_eq!(started.elapsed(), Duration::from_secs(5));

    let DriveOutcome::Submitted(result) = outcome else {
        panic!("expected submission");
    };
    assert_eq!(result.score().earned, 0);
    assert_eq!(result.total_questions(), 1);
    assert!(result.auto_submitted());
}

#[tokio::test(start_paused = true)]
async fn third_violation_submits_before_timer() {
    let storage = Storage::in_memory();
    let services = services(&storage);
    let quiz = five_second_quiz(&services).await;

    let started = Instant::now();
    let outcome = drive(
        &services,
        &quiz,
        vec![
            AttemptEvent::AnswerCurrent(Answer::Choice(0)),
            AttemptEvent::VisibilityLost,
            AttemptEvent::VisibilityLost,
            AttemptEvent::VisibilityLost,
        ],
    )
    .await;
    assert!(started.elapsed() < Duration::from_secs(5));

    let DriveOutcome::Submitted(result) = outcome else {
        panic!("expected submission");
    };
    assert!(result.auto_submitted());
    assert_eq!(result.violations(), 3);
    assert_eq!(result.score().earned, 1);
}

#[tokio::test(start_paused = true)]
async fn double_submit_persists_one_result() {
    let storage = Storage::in_memory();
    let services = services(&storage);
    let quiz = five_second_quiz(&services).await;

    drive(
        &services,
        &quiz,
        vec![
            AttemptEvent::AnswerCurrent(Answer::Choice(1)),
            AttemptEvent::Submit,
            AttemptEvent::Submit,
        ],
    )
    .await;

    let results = services.grading().list_results(quiz.id()).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].score().earned, 0);
}

#[tokio::test(start_paused = true)]
async fn answers_keep_free_text_for_review() {
    let storage = Storage::in_memory();
    let services = services(&storage);
    let quiz = services
        .catalog()
        .create(
            QuizDraft::new("Text")
                .with_duration_secs(30)
                .with_question(Question::new(
                    "q1",
                    "Capital of France?",
                    QuestionKind::Identification {
                        correct_answer: "Paris".into(),
                    },
                ))
                .with_question(Question::new(
                    "q2",
                    "Why?",
                    QuestionKind::Essay { max_points: 10 },
                )),
        )
        .await
        .unwrap();

    let outcome = drive(
        &services,
        &quiz,
        vec![
            AttemptEvent::AnswerCurrent(Answer::text("Paris ")),
            AttemptEvent::Next,
            AttemptEvent::AnswerCurrent(Answer::text("Because.")),
            AttemptEvent::Submit,
        ],
    )
    .await;

    let DriveOutcome::Submitted(result) = outcome else {
        panic!("expected submission");
    };
    assert_eq!((result.score().earned, result.total_questions()), (1, 1));
    assert_eq!(result.answers().len(), 2);
}
