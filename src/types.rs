use crate::backup::run::RunResult;
use s3::error::S3Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("Invalid input: {0}")]
  InvalidInput(String),
  #[error("{0}")]
  NotFound(String),
  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),
  #[error("Storage error: {0}")]
  Storage(#[from] S3Error),
  #[error("Upload of {key} rejected with status {status}")]
  Rejected { key: String, status: u16 },
  #[error("Configuration error: {0}")]
  Config(String),
  /// Carries the run as it stood when it was stopped.
  #[error(
    "Run {} aborted with {}/{} files uploaded: {}",
    .result.id,
    .result.uploaded_files,
    .result.total_files,
    .source
  )]
  Aborted {
    result: Box<RunResult>,
    source: Box<Error>,
  },
  /// A defect outside the transfer family, such as a panicked upload task.
  #[error("Internal error: {0}")]
  Internal(String),
}

impl Error {
  /// Failures of a single transfer. A run isolates these per item and keeps
  /// going; anything else aborts it.
  pub fn is_transfer_failure(&self) -> bool {
    matches!(
      self,
      Error::Io(_) | Error::Storage(_) | Error::Rejected { .. }
    )
  }
}
