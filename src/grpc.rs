use crate::backup::agent::BackupAgent;
use crate::backup::outcome::RunState;
use crate::backup::run::RunResult;
use crate::file_storage::interface::FileStorage;
use crate::proto::{self, backup_agent_service_server::BackupAgentService};
use crate::types::Error;
use log::info;
use std::sync::Arc;
use tonic::{Request, Response, Status};

pub struct GrpcService<Storage> {
  agent: Arc<BackupAgent<Storage>>,
  // Used when a request doesn't name a path
  default_path: String,
}

impl<Storage: FileStorage + 'static> GrpcService<Storage> {
  pub fn new(agent: Arc<BackupAgent<Storage>>, default_path: impl Into<String>) -> Self {
    GrpcService {
      agent,
      default_path: default_path.into(),
    }
  }

  fn backup_path<'a>(&'a self, requested: &'a str) -> &'a str {
    if requested.trim().is_empty() {
      self.default_path.as_str()
    } else {
      requested
    }
  }
}

#[tonic::async_trait]
impl<Storage: FileStorage + 'static> BackupAgentService for GrpcService<Storage> {
  async fn trigger_backup(
    &self,
    request: Request<proto::TriggerBackupRequest>,
  ) -> Result<Response<proto::BackupRun>, Status> {
    let request = request.into_inner();
    let path = self.backup_path(&request.path);
    info!("On demand backup of {} requested", path);
    let result = if request.wait {
      self.agent.run(path).await?
    } else {
      self.agent.start(path)?.snapshot()
    };
    Ok(Response::new(result.into()))
  }

  async fn get_backup(
    &self,
    request: Request<proto::GetBackupRequest>,
  ) -> Result<Response<proto::BackupRun>, Status> {
    let id = request.into_inner().id;
    let result = self
      .agent
      .get(&id)
      .ok_or_else(|| Error::NotFound(format!("Backup {} not found", id)))?;
    Ok(Response::new(result.into()))
  }

  async fn list_backups(
    &self,
    _request: Request<proto::ListBackupsRequest>,
  ) -> Result<Response<proto::ListBackupsResponse>, Status> {
    Ok(Response::new(proto::ListBackupsResponse {
      runs: self.agent.list().into_iter().map(From::from).collect(),
    }))
  }
}

impl From<RunState> for proto::RunState {
  fn from(state: RunState) -> Self {
    match state {
      RunState::Started => Self::Started,
      RunState::Success => Self::Success,
      RunState::NoFile => Self::NoFile,
      RunState::Fail => Self::Fail,
      RunState::PartialFail => Self::PartialFail,
    }
  }
}

impl From<RunResult> for proto::BackupRun {
  fn from(result: RunResult) -> Self {
    Self {
      id: result.id,
      started_at: result.started_at.timestamp_millis(),
      finished_at: result
        .finished_at
        .map_or(0, |finished_at| finished_at.timestamp_millis()),
      state: proto::RunState::from(result.state) as i32,
      total_files: result.total_files as u64,
      uploaded_files: result.uploaded_files as u64,
      message: result.message.unwrap_or_default(),
    }
  }
}

impl From<Error> for Status {
  fn from(err: Error) -> Self {
    match err {
      Error::InvalidInput(message) => Self::invalid_argument(message),
      Error::NotFound(message) => Self::not_found(message),
      err @ Error::Aborted { .. } => Self::aborted(err.to_string()),
      err => Self::internal(err.to_string()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::backup::task::FileFilter;
  use crate::file_storage::memory::MemoryFileStorage;
  use tempfile::tempdir;
  use tonic::Code;

  fn service(default_path: &str) -> GrpcService<MemoryFileStorage> {
    let agent = BackupAgent::new(MemoryFileStorage::new(), FileFilter::default());
    GrpcService::new(Arc::new(agent), default_path)
  }

  #[tokio::test]
  async fn test_trigger_and_get() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("a.txt"), "a").unwrap();
    let service = service(dir.path().to_str().unwrap());

    let run = service
      .trigger_backup(Request::new(proto::TriggerBackupRequest {
        path: String::new(),
        wait: true,
      }))
      .await
      .unwrap()
      .into_inner();
    assert_eq!(run.state, proto::RunState::Success as i32);
    assert_eq!(run.total_files, 1);
    assert_eq!(run.uploaded_files, 1);
    assert!(run.finished_at >= run.started_at);

    let fetched = service
      .get_backup(Request::new(proto::GetBackupRequest { id: run.id.clone() }))
      .await
      .unwrap()
      .into_inner();
    assert_eq!(fetched, run);

    let listed = service
      .list_backups(Request::new(proto::ListBackupsRequest {}))
      .await
      .unwrap()
      .into_inner();
    assert_eq!(listed.runs, vec![run]);
  }

  #[tokio::test]
  async fn test_trigger_without_wait_returns_started() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("a.txt"), "a").unwrap();
    let agent = Arc::new(BackupAgent::new(
      MemoryFileStorage::new().gated(),
      FileFilter::default(),
    ));
    let service = GrpcService::new(agent.clone(), "unused");

    let run = service
      .trigger_backup(Request::new(proto::TriggerBackupRequest {
        path: dir.path().to_str().unwrap().to_owned(),
        wait: false,
      }))
      .await
      .unwrap()
      .into_inner();
    assert_eq!(run.state, proto::RunState::Started as i32);
    assert_eq!(run.finished_at, 0);
    agent.storage().release(1);
  }

  #[tokio::test]
  async fn test_unknown_id() {
    let status = service("/data")
      .get_backup(Request::new(proto::GetBackupRequest {
        id: "missing".to_owned(),
      }))
      .await
      .unwrap_err();
    assert_eq!(status.code(), Code::NotFound);
  }

  #[tokio::test]
  async fn test_blank_default_path() {
    let status = service(" ")
      .trigger_backup(Request::new(proto::TriggerBackupRequest {
        path: String::new(),
        wait: true,
      }))
      .await
      .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
  }

  #[tokio::test]
  async fn test_aborted_run_reports_counts() {
    let dir = tempdir().unwrap();
    for name in ["a.txt", "b.txt", "c.txt"] {
      std::fs::write(dir.path().join(name), name).unwrap();
    }
    let agent = Arc::new(BackupAgent::new(
      MemoryFileStorage::new().broken_on("b.txt"),
      FileFilter::default(),
    ));
    let service = GrpcService::new(agent.clone(), dir.path().to_str().unwrap());

    let status = service
      .trigger_backup(Request::new(proto::TriggerBackupRequest {
        path: String::new(),
        wait: true,
      }))
      .await
      .unwrap_err();
    assert_eq!(status.code(), Code::Aborted);
    assert!(status.message().contains("1/3 files uploaded"));
    let run = &agent.list()[0];
    assert!(status.message().contains(&run.id));
  }

  #[test]
  fn test_error_status_codes() {
    let rejected = Status::from(Error::Rejected {
      key: "a".to_owned(),
      status: 500,
    });
    assert_eq!(rejected.code(), Code::Internal);
  }
}
