use super::executor::upload_all;
use super::history::RunHistory;
use super::outcome::RunState;
use super::run::{RunHandle, RunResult, RunWriter};
use super::task::{enumerate, FileFilter, UploadTask};
use crate::file_storage::interface::FileStorage;
use crate::types::{Error, Result};
use chrono::Utc;
use log::{error, info};
use std::sync::Arc;
use std::time::Instant;

/// Entry point for backup runs. Every run is recorded in a bounded in-memory
/// history where it can be looked up while in progress and after it ends.
pub struct BackupAgent<Storage> {
  storage: Arc<Storage>,
  history: Arc<RunHistory<Arc<RunHandle>>>,
  filter: FileFilter,
}

impl<Storage: FileStorage + 'static> BackupAgent<Storage> {
  pub fn new(storage: Storage, filter: FileFilter) -> Self {
    Self {
      storage: Arc::new(storage),
      history: Default::default(),
      filter,
    }
  }

  pub fn storage(&self) -> &Storage {
    &self.storage
  }

  /// Backs up `root` and waits for every upload to be attempted.
  pub async fn run(&self, root: &str) -> Result<RunResult> {
    let (handle, writer, tasks) = self.prepare(root)?;
    match supervise(self.storage.clone(), tasks, writer).await {
      Ok(_) => Ok(handle.snapshot()),
      Err(err) => Err(Error::Aborted {
        result: Box::new(handle.snapshot()),
        source: Box::new(err),
      }),
    }
  }

  /// Backs up `root` in a background task. The returned handle is in the
  /// STARTED state and reflects progress as uploads complete.
  pub fn start(&self, root: &str) -> Result<Arc<RunHandle>> {
    let (handle, writer, tasks) = self.prepare(root)?;
    let storage = self.storage.clone();
    let id = handle.id().to_owned();
    tokio::spawn(async move {
      if let Err(err) = supervise(storage, tasks, writer).await {
        error!("Backup run {} aborted: {}", id, err);
      }
    });
    Ok(handle)
  }

  pub fn get(&self, id: &str) -> Option<RunResult> {
    self.history.get(id).map(|handle| handle.snapshot())
  }

  pub fn list(&self) -> Vec<RunResult> {
    self
      .history
      .list()
      .iter()
      .map(|handle| handle.snapshot())
      .collect()
  }

  fn prepare(&self, root: &str) -> Result<(Arc<RunHandle>, RunWriter, Vec<UploadTask>)> {
    let tasks = enumerate(root, &self.filter)?;
    let (handle, writer) = RunHandle::begin(tasks.len());
    info!("Backup run {} started for {}", handle.id(), root);
    self.history.record(handle.id(), handle.clone());
    Ok((handle, writer, tasks))
  }
}

/// Runs the upload loop on its own task so a panic inside the storage client
/// surfaces as `Error::Internal` instead of tearing down the caller. The
/// writer is dropped with the task, which finalizes the run.
async fn supervise<Storage: FileStorage + 'static>(
  storage: Arc<Storage>,
  tasks: Vec<UploadTask>,
  writer: RunWriter,
) -> Result<RunState> {
  let uploads = tokio::spawn(async move { execute(&*storage, tasks, writer).await });
  match uploads.await {
    Ok(outcome) => outcome,
    Err(err) => Err(Error::Internal(format!("Upload task failed: {}", err))),
  }
}

async fn execute<Storage: FileStorage + ?Sized>(
  storage: &Storage,
  tasks: Vec<UploadTask>,
  writer: RunWriter,
) -> Result<RunState> {
  let id = writer.id().to_owned();
  if tasks.is_empty() {
    // Nothing to send, so storage is never contacted.
    let state = writer.finish("No file was found");
    info!("Backup run {} finished: {:?}", id, state);
    return Ok(state);
  }

  let started = Instant::now();
  info!("Started at: {}", Utc::now());
  let outcome = upload_all(storage, &tasks, &writer).await;
  let duration = started.elapsed().as_millis();
  info!("Finished at: {}", Utc::now());
  info!("Total time spent in milliseconds: {}", duration);

  match outcome {
    Ok(()) => {
      let state = writer.finish(format!("Finished. Duration is {} ms", duration));
      info!("Backup run {} finished: {:?}", id, state);
      Ok(state)
    }
    Err(err) => {
      let state = writer.finish(format!("Aborted after {} ms: {}", duration, err));
      error!("Backup run {} aborted in state {:?}", id, state);
      Err(err)
    }
  }
}
