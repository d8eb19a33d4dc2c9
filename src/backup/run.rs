use super::outcome::{classify, RunState};
use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

const RUN_ID_LENGTH: usize = 12;

/// Point-in-time view of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
  pub id: String,
  pub started_at: DateTime<Utc>,
  pub finished_at: Option<DateTime<Utc>>,
  pub state: RunState,
  pub total_files: usize,
  pub uploaded_files: usize,
  pub message: Option<String>,
}

#[derive(Debug)]
struct Completion {
  state: RunState,
  finished_at: DateTime<Utc>,
  message: String,
}

/// Shared, read-only side of a run. Progress is only ever advanced through
/// the single [`RunWriter`] created alongside it.
#[derive(Debug)]
pub struct RunHandle {
  id: String,
  started_at: DateTime<Utc>,
  total_files: usize,
  uploaded_files: AtomicUsize,
  completion: OnceLock<Completion>,
}

impl RunHandle {
  pub fn begin(total_files: usize) -> (Arc<RunHandle>, RunWriter) {
    let handle = Arc::new(RunHandle {
      id: generate_run_id(),
      started_at: Utc::now(),
      total_files,
      uploaded_files: AtomicUsize::new(0),
      completion: OnceLock::new(),
    });
    let writer = RunWriter {
      handle: handle.clone(),
    };
    (handle, writer)
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn state(&self) -> RunState {
    self
      .completion
      .get()
      .map_or(RunState::Started, |completion| completion.state)
  }

  pub fn snapshot(&self) -> RunResult {
    // Completion is published after the last counter update.
    let completion = self.completion.get();
    RunResult {
      id: self.id.clone(),
      started_at: self.started_at,
      finished_at: completion.map(|completion| completion.finished_at),
      state: completion.map_or(RunState::Started, |completion| completion.state),
      total_files: self.total_files,
      uploaded_files: self.uploaded_files.load(Ordering::SeqCst),
      message: completion.map(|completion| completion.message.clone()),
    }
  }
}

/// Sole writer of a run's progress. Dropping it without calling `finish`
/// still finalizes the run, so a crashed uploader never leaves it STARTED.
#[derive(Debug)]
pub struct RunWriter {
  handle: Arc<RunHandle>,
}

impl RunWriter {
  pub fn id(&self) -> &str {
    &self.handle.id
  }

  pub fn total_files(&self) -> usize {
    self.handle.total_files
  }

  pub fn record_upload(&self) {
    let previous = self.handle.uploaded_files.fetch_add(1, Ordering::SeqCst);
    debug_assert!(previous < self.handle.total_files);
  }

  pub fn uploaded_files(&self) -> usize {
    self.handle.uploaded_files.load(Ordering::SeqCst)
  }

  pub fn finish(self, message: impl Into<String>) -> RunState {
    self.complete(message.into())
  }

  fn complete(&self, message: String) -> RunState {
    let state = classify(self.total_files(), self.uploaded_files());
    debug_assert!(state.is_terminal());
    // Only the first completion sticks.
    let _ = self.handle.completion.set(Completion {
      state,
      finished_at: Utc::now(),
      message,
    });
    self.handle.state()
  }
}

impl Drop for RunWriter {
  fn drop(&mut self) {
    if self.handle.completion.get().is_none() {
      self.complete("Run ended unexpectedly".to_owned());
    }
  }
}

fn generate_run_id() -> String {
  rand::thread_rng()
    .sample_iter(&Alphanumeric)
    .take(RUN_ID_LENGTH)
    .map(char::from)
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_progress_is_visible_through_handle() {
    let (handle, writer) = RunHandle::begin(3);
    assert_eq!(handle.id().len(), RUN_ID_LENGTH);
    assert_eq!(handle.state(), RunState::Started);

    writer.record_upload();
    writer.record_upload();
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.state, RunState::Started);
    assert_eq!(snapshot.uploaded_files, 2);
    assert_eq!(snapshot.finished_at, None);

    assert_eq!(writer.finish("done"), RunState::PartialFail);
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.state, RunState::PartialFail);
    assert_eq!(snapshot.total_files, 3);
    assert_eq!(snapshot.message.as_deref(), Some("done"));
    assert!(snapshot.finished_at.is_some());
  }

  #[test]
  fn test_dropped_writer_finalizes_run() {
    let (handle, writer) = RunHandle::begin(2);
    writer.record_upload();
    drop(writer);
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.state, RunState::PartialFail);
    assert_eq!(snapshot.message.as_deref(), Some("Run ended unexpectedly"));
  }

  #[test]
  fn test_run_ids_differ() {
    let (first, _) = RunHandle::begin(0);
    let (second, _) = RunHandle::begin(0);
    assert_ne!(first.id(), second.id());
  }

  #[test]
  fn test_result_serialization() {
    let (handle, writer) = RunHandle::begin(0);
    writer.finish("Finished. Duration is 0 ms");
    let json = serde_json::to_value(handle.snapshot()).unwrap();
    assert_eq!(json["state"], "NO_FILE");
    assert_eq!(json["totalFiles"], 0);
    assert_eq!(json["uploadedFiles"], 0);
  }
}
