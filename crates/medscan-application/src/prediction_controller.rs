//! Prediction lifecycle controller.
//!
//! `PredictionController` owns the lifecycle state, the history log and the
//! theme preference of one session. Presentation layers call its intent
//! methods (`submit_file`, `select_history_record`, `give_feedback`,
//! `clear_history`, `toggle_theme`) and render [`ControllerSnapshot`]s.

use medscan_core::classification::Classifier;
use medscan_core::error::{MedscanError, Result};
use medscan_core::feedback::FeedbackState;
use medscan_core::history::{HistoryLog, HistoryRecord};
use medscan_core::image::{ImageData, UploadedFile, select_upload};
use medscan_core::lifecycle::{Failure, LifecycleState};
use medscan_core::store::KeyValueStore;
use medscan_core::theme::{Theme, ThemePreference};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, MutexGuard};

/// Warning surfaced when a change could not be written to the local store.
pub const PERSISTENCE_WARNING: &str =
    "Saved for this session only; local history could not be written.";

const ABANDONED_SUBMISSION: &str = "submission was cancelled before the classifier answered";

/// Read-only view of the controller consumed by presentation layers.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSnapshot {
    pub state: LifecycleState,
    /// History, newest first.
    pub history: Vec<HistoryRecord>,
    /// True while a classification call is outstanding, even if the
    /// lifecycle was reset to `Idle` by clearing the history meanwhile.
    pub submission_in_flight: bool,
    /// Set when the last write to the local store failed.
    pub warning: Option<String>,
    pub theme: Theme,
}

impl ControllerSnapshot {
    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    /// Whether the upload affordance should be enabled.
    pub fn can_submit(&self) -> bool {
        !self.submission_in_flight
    }

    pub fn current_record(&self) -> Option<&HistoryRecord> {
        self.state.current_record()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.state.failure().map(|failure| failure.message.as_str())
    }
}

struct ControllerState {
    lifecycle: LifecycleState,
    history: HistoryLog,
    theme: ThemePreference,
    warning: Option<String>,
}

impl ControllerState {
    fn fail(&mut self, error: MedscanError) {
        tracing::error!(kind = error.kind(), error = %error, "Prediction failed");
        self.lifecycle = LifecycleState::Failed(Failure::from(error));
    }

    /// Folds the outcome of a store write into the warning.
    ///
    /// Persistence failures are absorbed (the in-memory change stands);
    /// anything else is returned.
    fn record_write(&mut self, outcome: Result<()>) -> Result<()> {
        match outcome {
            Ok(()) => {
                self.warning = None;
                Ok(())
            }
            Err(e) if e.is_persistence() => {
                tracing::warn!(error = %e, "Local store write failed; keeping in-memory state");
                self.warning = Some(PERSISTENCE_WARNING.to_string());
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

/// Resets the in-flight flag when a submission ends, including when its
/// future is dropped mid-call. A `Loading` lifecycle left behind by a dropped
/// submission is failed by the next [`PredictionController::lock_state`].
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The single prediction lifecycle controller of a session.
pub struct PredictionController {
    classifier: Arc<dyn Classifier>,
    state: Mutex<ControllerState>,
    in_flight: AtomicBool,
}

impl PredictionController {
    /// Restores history and theme from `store` and starts in `Idle`.
    pub async fn load(classifier: Arc<dyn Classifier>, store: Arc<dyn KeyValueStore>) -> Self {
        let history = HistoryLog::load(store.clone()).await;
        let theme = ThemePreference::load(store).await;
        tracing::info!(records = history.len(), theme = %theme.current(), "Controller ready");

        Self {
            classifier,
            state: Mutex::new(ControllerState {
                lifecycle: LifecycleState::Idle,
                history,
                theme,
                warning: None,
            }),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Locks the session state, failing a `Loading` lifecycle whose
    /// submission is no longer in flight.
    async fn lock_state(&self) -> MutexGuard<'_, ControllerState> {
        let mut state = self.state.lock().await;
        if state.lifecycle.is_loading() && !self.in_flight.load(Ordering::Acquire) {
            state.fail(MedscanError::classification_failed(ABANDONED_SUBMISSION));
        }
        state
    }

    /// Classifies the first of `files` and makes the new record current.
    ///
    /// Rejected with `SubmissionInProgress` (state untouched) while another
    /// submission is outstanding. Invalid uploads move straight to `Failed`
    /// without calling the classifier. Every other failure also ends in
    /// `Failed` and is returned; the history is only extended on success.
    /// Dropping the returned future mid-call (e.g. under an outer timeout)
    /// leaves the controller in `Failed` with a classification failure.
    pub async fn submit_file(&self, files: Vec<UploadedFile>) -> Result<HistoryRecord> {
        let (file, mime_type, _guard) = {
            let mut state = self.lock_state().await;
            if self.in_flight.swap(true, Ordering::AcqRel) {
                tracing::warn!("Submission rejected: a classification is already in progress");
                return Err(MedscanError::SubmissionInProgress);
            }
            let guard = InFlightGuard(&self.in_flight);

            let (file, mime_type) = match select_upload(files) {
                Ok(selected) => selected,
                Err(e) => {
                    state.fail(e.clone());
                    return Err(e);
                }
            };

            tracing::info!(file = %file.name, mime_type = %mime_type, "Loading prediction");
            state.lifecycle = LifecycleState::Loading;
            (file, mime_type, guard)
        };

        let outcome = async {
            let bytes = file.read_bytes().await?;
            let result = self.classifier.classify(&bytes, mime_type).await?;
            Ok::<_, MedscanError>((bytes, result))
        }
        .await;

        let mut state = self.lock_state().await;
        let (bytes, result) = match outcome {
            Ok(done) => done,
            Err(e) => {
                state.fail(e.clone());
                return Err(e);
            }
        };

        let record = HistoryRecord::new(ImageData::encode(&bytes, mime_type), result);
        let appended = state.history.append(record.clone()).await;
        if let Err(e) = state.record_write(appended) {
            state.fail(e.clone());
            return Err(e);
        }

        tracing::info!(
            id = record.id(),
            class = %record.top_prediction().class,
            confidence = record.top_prediction().confidence,
            "Displaying prediction"
        );
        state.lifecycle = LifecycleState::Displaying(record.clone());
        Ok(record)
    }

    /// Makes the history record with `id` current, without any network call.
    ///
    /// Allowed while a submission is outstanding; its result replaces the
    /// selection once it completes.
    pub async fn select_history_record(&self, id: &str) -> Result<HistoryRecord> {
        let mut state = self.lock_state().await;
        let record = state
            .history
            .get(id)
            .cloned()
            .ok_or_else(|| MedscanError::not_found(id))?;
        tracing::debug!(id, "Selected history record");
        state.lifecycle = LifecycleState::Displaying(record.clone());
        Ok(record)
    }

    /// Sets the feedback of record `id` in the history and, when it is the
    /// current record, in the current view as well.
    ///
    /// Unknown IDs are ignored and yield `None`.
    pub async fn give_feedback(
        &self,
        id: &str,
        feedback: FeedbackState,
    ) -> Result<Option<HistoryRecord>> {
        let mut guard = self.lock_state().await;
        let state = &mut *guard;

        let (updated, written) = match state.history.update_feedback(id, feedback).await {
            Ok(updated) => (updated, Ok(())),
            Err(e) => (state.history.get(id).cloned(), Err(e)),
        };

        if let LifecycleState::Displaying(current) = &mut state.lifecycle {
            if current.id() == id {
                *current = current.with_feedback(feedback);
            }
        }

        if updated.is_some() {
            state.record_write(written)?;
            tracing::info!(id, %feedback, "Feedback recorded");
        }
        Ok(updated)
    }

    /// Empties the history and returns to `Idle`.
    ///
    /// An outstanding submission keeps running and will still be appended
    /// and displayed when it completes.
    pub async fn clear_history(&self) -> Result<()> {
        let mut state = self.lock_state().await;
        let cleared = state.history.clear().await;
        state.lifecycle = LifecycleState::Idle;
        tracing::info!("Cleared prediction history");
        state.record_write(cleared)
    }

    /// Switches between light and dark themes and returns the new one.
    pub async fn toggle_theme(&self) -> Result<Theme> {
        let mut state = self.lock_state().await;
        let toggled = state.theme.toggle().await.map(|_| ());
        state.record_write(toggled)?;
        Ok(state.theme.current())
    }

    pub async fn snapshot(&self) -> ControllerSnapshot {
        let state = self.lock_state().await;
        ControllerSnapshot {
            state: state.lifecycle.clone(),
            history: state.history.records().to_vec(),
            submission_in_flight: self.in_flight.load(Ordering::Acquire),
            warning: state.warning.clone(),
            theme: state.theme.current(),
        }
    }
}
