use backup::agent::BackupAgent;
use backup::task::FileFilter;
use clap::Parser;
use config::Config;
use file_storage::s3::S3FileStorage;
use grpc::GrpcService;
use log::{error, info};
use proto::backup_agent_service_server::BackupAgentServiceServer;
use std::sync::Arc;
use tonic::transport::Server;

mod backup;
mod config;
mod file_storage;
mod grpc;
mod logging;
mod proto;
mod scheduler;
mod types;
mod utils;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  let config = Config::parse();
  logging::init(config.log_level, config.log_file.as_deref())?;

  let storage = S3FileStorage::connect(&config.s3_settings())?;
  let agent = Arc::new(BackupAgent::new(
    storage,
    FileFilter::new(&config.include_extensions),
  ));

  if config.once {
    let result = agent.run(&config.backup_path).await.map_err(|err| {
      error!("Backup failed: {}", err);
      err
    })?;
    info!("{}", serde_json::to_string(&result)?);
    return Ok(());
  }

  if let Some(period) = config.schedule {
    scheduler::spawn(agent.clone(), config.backup_path.clone(), period);
  }

  let service = GrpcService::new(agent, config.backup_path.clone());
  info!("Listening on {}", config.listen);

  Server::builder()
    .add_service(BackupAgentServiceServer::new(service))
    .serve(config.listen)
    .await?;

  Ok(())
}
