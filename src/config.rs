use crate::file_storage::s3::S3Settings;
use crate::utils::duration::parse_period;
use clap::Parser;
use log::LevelFilter;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[clap(name = "backup-agent", version, about = "Backs up a local directory to an S3 bucket")]
pub struct Config {
  /// Directory (or single file) to back up when no path is given
  #[clap(long, env = "BACKUP_PATH")]
  pub backup_path: String,

  #[clap(long, env = "BACKUP_BUCKET_NAME")]
  pub bucket_name: String,

  /// Properties file with `accessKey` and `secretKey`. Defaults to the
  /// environment / profile credential chain.
  #[clap(long, env = "BACKUP_CREDENTIAL_FILE")]
  pub credential_file: Option<PathBuf>,

  /// Timeout of a single storage request
  #[clap(
    long,
    env = "BACKUP_REQUEST_TIMEOUT",
    default_value = "25m",
    parse(try_from_str = parse_period)
  )]
  pub request_timeout: Duration,

  #[clap(long, env = "BACKUP_REGION", default_value = "ap-southeast-2")]
  pub region: String,

  /// Custom endpoint for S3 compatible storage
  #[clap(long, env = "BACKUP_ENDPOINT")]
  pub endpoint: Option<String>,

  /// Period between scheduled backups, e.g. "24h". No scheduled backups if unset.
  #[clap(long, env = "BACKUP_SCHEDULE", parse(try_from_str = parse_period))]
  pub schedule: Option<Duration>,

  /// Only back up files with this extension. Repeat for several.
  #[clap(long = "include-ext", env = "BACKUP_INCLUDE_EXT")]
  pub include_extensions: Vec<String>,

  #[clap(long, env = "BACKUP_LISTEN", default_value = "[::1]:50051")]
  pub listen: SocketAddr,

  #[clap(long, env = "BACKUP_LOG_LEVEL", default_value = "info")]
  pub log_level: LevelFilter,

  #[clap(long, env = "BACKUP_LOG_FILE")]
  pub log_file: Option<PathBuf>,

  /// Run a single backup and exit
  #[clap(long)]
  pub once: bool,
}

impl Config {
  pub fn s3_settings(&self) -> S3Settings {
    S3Settings {
      bucket_name: self.bucket_name.clone(),
      region: self.region.clone(),
      endpoint: self.endpoint.clone(),
      credential_file: self.credential_file.clone(),
      request_timeout: self.request_timeout,
    }
  }
}
