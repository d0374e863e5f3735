//! End-to-end lifecycle tests through the controller with a file-backed store.

use async_trait::async_trait;
use medscan_application::PredictionController;
use medscan_core::classification::{ClassificationResult, Classifier};
use medscan_core::error::{CLASSIFICATION_MESSAGE, MedscanError, Result, VALIDATION_MESSAGE};
use medscan_core::feedback::FeedbackState;
use medscan_core::history::HistoryLog;
use medscan_core::image::{ImageMimeType, UploadedFile};
use medscan_core::lifecycle::LifecycleState;
use medscan_core::store::{HISTORY_KEY, KeyValueStore};
use medscan_infrastructure::{FileKeyValueStore, upload_from_path};
use medscan_interaction::parse_classification;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;
use tokio::sync::Mutex;

const SCENARIO_A_ANSWER: &str = r#"{
    "predictions": [
        {"class": "Pneumonia", "confidence": 0.91},
        {"class": "Normal", "confidence": 0.06},
        {"class": "Cardiomegaly", "confidence": 0.03}
    ],
    "gradCam": {
        "explanation": "Consolidation in the right lower lobe.",
        "focusArea": {"top": 20, "left": 30, "width": 25, "height": 25}
    }
}"#;

const MISSING_PREDICTIONS_ANSWER: &str = r#"{
    "gradCam": {
        "explanation": "Nothing stands out.",
        "focusArea": {"top": 0, "left": 0, "width": 10, "height": 10}
    }
}"#;

/// What the scripted remote model does on one call.
enum Reply {
    Answer(String),
    TransportError,
}

/// Classifier that validates scripted answer text like the real client.
struct ScriptedClassifier {
    replies: Mutex<VecDeque<Reply>>,
    calls: AtomicUsize,
}

impl ScriptedClassifier {
    fn new(replies: impl IntoIterator<Item = Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: AtomicUsize::new(0),
        })
    }

    fn answering(text: &str, times: usize) -> Arc<Self> {
        Self::new((0..times).map(|_| Reply::Answer(text.to_string())))
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Classifier for ScriptedClassifier {
    async fn classify(&self, _: &[u8], _: ImageMimeType) -> Result<ClassificationResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.replies.lock().await.pop_front() {
            Some(Reply::Answer(text)) => parse_classification(&text),
            Some(Reply::TransportError) => Err(MedscanError::classification_failed(
                "connection reset by peer",
            )),
            None => Err(MedscanError::internal("no scripted reply left")),
        }
    }
}

struct Fixture {
    dir: TempDir,
    store: Arc<dyn KeyValueStore>,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let store: Arc<dyn KeyValueStore> =
            Arc::new(FileKeyValueStore::new(dir.path().join("store")));
        Self { dir, store }
    }

    async fn controller(&self, classifier: Arc<ScriptedClassifier>) -> PredictionController {
        PredictionController::load(classifier, self.store.clone()).await
    }

    fn write_file(&self, name: &str, contents: &[u8]) -> UploadedFile {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        upload_from_path(path)
    }

    fn scan(&self) -> UploadedFile {
        self.write_file("scan.png", &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a])
    }

    async fn persisted_history_len(&self) -> usize {
        HistoryLog::load(self.store.clone()).await.len()
    }
}

#[tokio::test]
async fn scenarios_a_to_d() {
    let fixture = Fixture::new();
    let classifier = ScriptedClassifier::new([
        Reply::Answer(SCENARIO_A_ANSWER.to_string()),
        Reply::TransportError,
    ]);
    let controller = fixture.controller(classifier.clone()).await;

    // A: a valid scan is classified and displayed.
    let record = controller.submit_file(vec![fixture.scan()]).await.unwrap();
    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.history.len(), 1);
    let current = snapshot.current_record().unwrap();
    assert_eq!(current.result().predictions()[0].class, "Pneumonia");
    assert_eq!(current.feedback(), FeedbackState::None);
    assert_eq!(fixture.persisted_history_len().await, 1);

    // B: feedback reaches both the current view and the history.
    controller
        .give_feedback(record.id(), FeedbackState::Correct)
        .await
        .unwrap();
    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.history[0].feedback(), FeedbackState::Correct);
    assert_eq!(
        snapshot.current_record().unwrap().feedback(),
        FeedbackState::Correct
    );

    // C: a text file fails validation without touching the history.
    let notes = fixture.write_file("notes.txt", b"not an image");
    let err = controller.submit_file(vec![notes]).await.unwrap_err();
    assert!(err.is_validation());
    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.error_message(), Some(VALIDATION_MESSAGE));
    assert_eq!(snapshot.history.len(), 1);
    assert_eq!(classifier.calls(), 1);

    // D: a transport error fails the submission.
    let err = controller.submit_file(vec![fixture.scan()]).await.unwrap_err();
    assert!(err.is_classification_failed());
    let snapshot = controller.snapshot().await;
    assert!(matches!(snapshot.state, LifecycleState::Failed(_)));
    assert_eq!(snapshot.error_message(), Some(CLASSIFICATION_MESSAGE));
    assert_eq!(snapshot.history.len(), 1);
    assert_eq!(fixture.persisted_history_len().await, 1);
}

#[tokio::test]
async fn history_is_newest_first_with_distinct_ids() {
    let fixture = Fixture::new();
    let controller = fixture
        .controller(ScriptedClassifier::answering(SCENARIO_A_ANSWER, 5))
        .await;

    let mut submitted = Vec::new();
    for _ in 0..5 {
        submitted.push(controller.submit_file(vec![fixture.scan()]).await.unwrap());
    }

    let history = controller.snapshot().await.history;
    assert_eq!(history.len(), 5);
    let expected: Vec<&str> = submitted.iter().rev().map(|r| r.id()).collect();
    let actual: Vec<&str> = history.iter().map(|r| r.id()).collect();
    assert_eq!(actual, expected);
    assert!(
        history
            .windows(2)
            .all(|pair| pair[0].created_at() >= pair[1].created_at())
    );

    let ids: HashSet<&str> = history.iter().map(|r| r.id()).collect();
    assert_eq!(ids.len(), 5);

    let reloaded = HistoryLog::load(fixture.store.clone()).await;
    let reloaded_ids: Vec<&str> = reloaded.records().iter().map(|r| r.id()).collect();
    assert_eq!(reloaded_ids, expected);
}

#[tokio::test]
async fn feedback_changes_only_the_feedback_field() {
    let fixture = Fixture::new();
    let controller = fixture
        .controller(ScriptedClassifier::answering(SCENARIO_A_ANSWER, 2))
        .await;
    let older = controller.submit_file(vec![fixture.scan()]).await.unwrap();
    controller.submit_file(vec![fixture.scan()]).await.unwrap();
    controller.select_history_record(older.id()).await.unwrap();

    for value in [FeedbackState::Incorrect, FeedbackState::Correct, FeedbackState::None] {
        controller.give_feedback(older.id(), value).await.unwrap();

        let snapshot = controller.snapshot().await;
        let current = snapshot.current_record().unwrap();
        let logged = snapshot.history.iter().find(|r| r.id() == older.id()).unwrap();
        assert_eq!(current, logged);
        assert_eq!(current.feedback(), value);
        assert_eq!(current, &older.with_feedback(value));
    }
}

#[tokio::test]
async fn unsupported_upload_never_reaches_the_classifier() {
    let fixture = Fixture::new();
    let classifier = ScriptedClassifier::answering(SCENARIO_A_ANSWER, 1);
    let controller = fixture.controller(classifier.clone()).await;

    for (name, contents) in [
        ("report.pdf", b"%PDF-1.7".as_slice()),
        ("scan.bmp", b"BM".as_slice()),
        ("notes.txt", b"text".as_slice()),
    ] {
        let upload = fixture.write_file(name, contents);
        let err = controller.submit_file(vec![upload]).await.unwrap_err();
        assert!(err.is_validation(), "{name} should be rejected");
        assert!(matches!(
            controller.snapshot().await.state,
            LifecycleState::Failed(_)
        ));
    }

    let mixed = vec![fixture.scan(), fixture.write_file("notes.txt", b"text")];
    assert!(controller.submit_file(mixed).await.unwrap_err().is_validation());
    assert_eq!(classifier.calls(), 0);
}

#[tokio::test]
async fn malformed_answer_leaves_history_unchanged() {
    let fixture = Fixture::new();
    let classifier = ScriptedClassifier::new([
        Reply::Answer(SCENARIO_A_ANSWER.to_string()),
        Reply::Answer(MISSING_PREDICTIONS_ANSWER.to_string()),
    ]);
    let controller = fixture.controller(classifier).await;
    controller.submit_file(vec![fixture.scan()]).await.unwrap();

    let err = controller.submit_file(vec![fixture.scan()]).await.unwrap_err();
    assert!(err.is_malformed_response());

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.error_message(), Some(CLASSIFICATION_MESSAGE));
    assert!(snapshot.current_record().is_none());
    assert_eq!(snapshot.history.len(), 1);
    assert_eq!(fixture.persisted_history_len().await, 1);
}

#[tokio::test]
async fn cleared_history_stays_empty_after_reload() {
    let fixture = Fixture::new();
    let controller = fixture
        .controller(ScriptedClassifier::answering(SCENARIO_A_ANSWER, 2))
        .await;
    controller.submit_file(vec![fixture.scan()]).await.unwrap();
    controller.submit_file(vec![fixture.scan()]).await.unwrap();

    controller.clear_history().await.unwrap();
    controller.clear_history().await.unwrap();

    let reloaded = fixture
        .controller(ScriptedClassifier::answering(SCENARIO_A_ANSWER, 0))
        .await;
    let snapshot = reloaded.snapshot().await;
    assert!(snapshot.history.is_empty());
    assert!(snapshot.current_record().is_none());
    assert_eq!(snapshot.state, LifecycleState::Idle);
}

#[tokio::test]
async fn corrupt_history_recovers_as_empty() {
    let fixture = Fixture::new();
    fixture
        .store
        .set(HISTORY_KEY, "{ not json".to_string())
        .await
        .unwrap();

    let controller = fixture
        .controller(ScriptedClassifier::answering(SCENARIO_A_ANSWER, 1))
        .await;
    assert!(controller.snapshot().await.history.is_empty());

    controller.submit_file(vec![fixture.scan()]).await.unwrap();
    assert_eq!(fixture.persisted_history_len().await, 1);
}

#[tokio::test]
async fn quota_exceeded_keeps_prediction_for_the_session() {
    let dir = TempDir::new().unwrap();
    let store: Arc<dyn KeyValueStore> =
        Arc::new(FileKeyValueStore::new(dir.path().join("store")).with_max_value_bytes(Some(64)));
    let controller = PredictionController::load(
        ScriptedClassifier::answering(SCENARIO_A_ANSWER, 1),
        store.clone(),
    )
    .await;

    let path = dir.path().join("scan.png");
    std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();
    let record = controller
        .submit_file(vec![upload_from_path(path)])
        .await
        .unwrap();

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.current_record(), Some(&record));
    assert_eq!(snapshot.history.len(), 1);
    assert!(snapshot.warning.is_some());
    assert!(HistoryLog::load(store).await.is_empty());
}
