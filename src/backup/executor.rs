use super::run::RunWriter;
use super::task::{TaskSource, UploadTask};
use crate::file_storage::interface::FileStorage;
use crate::types::{Error, Result};
use log::{error, info};
use std::time::Instant;

/// Uploads `tasks` one after the other, counting successes on `writer`.
///
/// Transfer failures are logged and skipped. Any other error stops the loop
/// and is returned; the counts reached so far stay on the writer.
pub async fn upload_all<Storage: FileStorage + ?Sized>(
  storage: &Storage,
  tasks: &[UploadTask],
  writer: &RunWriter,
) -> Result<()> {
  if tasks.is_empty() {
    return Ok(());
  }
  info!(
    "Detected {} files, begin uploading for run {}",
    tasks.len(),
    writer.id()
  );
  for task in tasks {
    let started = Instant::now();
    info!("Uploading: {}", task.local_path.display());
    match upload_one(storage, task).await {
      Ok(()) => {
        writer.record_upload();
        info!(
          "Successful. Took {} milliseconds",
          started.elapsed().as_millis()
        );
      }
      Err(err) if err.is_transfer_failure() => log_transfer_failure(task, &err),
      Err(err) => {
        error!("Unexpected error uploading {}: {}", task.key, err);
        return Err(err);
      }
    }
  }
  Ok(())
}

async fn upload_one<Storage: FileStorage + ?Sized>(
  storage: &Storage,
  task: &UploadTask,
) -> Result<()> {
  match task.source {
    TaskSource::File => storage.upload_file(&task.local_path, &task.key).await,
    TaskSource::Resource => {
      let bytes = tokio::fs::read(&task.local_path).await?;
      storage.upload_buffer(&bytes, &task.key).await
    }
  }
}

fn log_transfer_failure(task: &UploadTask, err: &Error) {
  match err {
    Error::Rejected { status, .. } => {
      error!(
        "Upload of {} reached the storage service but was rejected",
        task.key
      );
      error!("HTTP Status Code: {}", status);
    }
    Error::Storage(err) => {
      error!(
        "Storage client failed to communicate while uploading {}",
        task.key
      );
      error!("Error Message: {}", err);
    }
    _ => error!(
      "Couldn't read {} for upload: {}",
      task.local_path.display(),
      err
    ),
  }
}
