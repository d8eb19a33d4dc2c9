use crate::backup::agent::BackupAgent;
use crate::file_storage::interface::FileStorage;
use log::{error, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Runs a backup of `backup_path` every `period`, first one period from now.
pub fn spawn<Storage: FileStorage + 'static>(
  agent: Arc<BackupAgent<Storage>>,
  backup_path: String,
  period: Duration,
) -> JoinHandle<()> {
  info!("Scheduling backups of {} every {:?}", backup_path, period);
  tokio::spawn(async move {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
      ticker.tick().await;
      info!("Backup triggered by scheduler.");
      match agent.run(&backup_path).await {
        Ok(result) => match serde_json::to_string(&result) {
          Ok(json) => info!("{}", json),
          Err(err) => error!("Couldn't serialize run {}: {}", result.id, err),
        },
        Err(err) => error!("Scheduled backup failed: {}", err),
      }
    }
  })
}
