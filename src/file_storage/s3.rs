use super::interface::FileStorage;
use crate::types::{Error, Result};
use async_trait::async_trait;
use log::info;
use s3::creds::Credentials;
use s3::{Bucket, Region};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket_name: String,
    pub region: String,
    /// Custom endpoint for S3 compatible services, addressed path-style
    pub endpoint: Option<String>,
    pub credential_file: Option<PathBuf>,
    /// Upper bound on a single request; large objects need minutes
    pub request_timeout: Duration,
}

pub struct S3FileStorage {
    bucket: Bucket,
}

impl S3FileStorage {
    pub fn new(s3_bucket: Bucket) -> Self {
        Self { bucket: s3_bucket }
    }

    pub fn connect(settings: &S3Settings) -> Result<Self> {
        let credentials = match &settings.credential_file {
            Some(path) => {
                let contents = std::fs::read_to_string(path).map_err(|err| {
                    Error::Config(format!("Couldn't read {}: {}", path.display(), err))
                })?;
                let (access_key, secret_key) = parse_credentials(&contents)?;
                Credentials::new(Some(&access_key), Some(&secret_key), None, None, None)
            }
            None => Credentials::default(),
        }
        .map_err(|err| Error::Config(format!("Couldn't resolve credentials: {}", err)))?;

        let mut bucket = match &settings.endpoint {
            Some(endpoint) => {
                let region = Region::Custom {
                    region: settings.region.clone(),
                    endpoint: endpoint.clone(),
                };
                Bucket::new(&settings.bucket_name, region, credentials)?.with_path_style()
            }
            None => {
                let region: Region = settings.region.parse().map_err(|_| {
                    Error::Config(format!("Unknown region: {}", settings.region))
                })?;
                Bucket::new(&settings.bucket_name, region, credentials)?
            }
        };
        bucket.set_request_timeout(Some(settings.request_timeout));
        info!(
            "Using bucket {} in region {} with request timeout {:?}",
            settings.bucket_name, settings.region, settings.request_timeout
        );
        Ok(Self::new(bucket))
    }
}

/// Reads `accessKey` and `secretKey` out of a properties style credential file.
fn parse_credentials(contents: &str) -> Result<(String, String)> {
    let mut access_key = None;
    let mut secret_key = None;
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        let (name, value) = match line.split_once(|c: char| c == '=' || c == ':') {
            Some((name, value)) => (name.trim(), value.trim()),
            None => continue,
        };
        match name {
            "accessKey" => access_key = Some(value.to_owned()),
            "secretKey" => secret_key = Some(value.to_owned()),
            _ => {}
        }
    }
    match (access_key, secret_key) {
        (Some(access_key), Some(secret_key)) => Ok((access_key, secret_key)),
        _ => Err(Error::Config(
            "Credential file must define accessKey and secretKey".to_owned(),
        )),
    }
}

fn check_status(key: &str, status: u16) -> Result<()> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(Error::Rejected {
            key: key.to_owned(),
            status,
        })
    }
}

#[async_trait]
impl FileStorage for S3FileStorage {
    async fn upload_file(&self, path: &Path, key: &str) -> Result<()> {
        let mut file = tokio::fs::File::open(path).await?;
        let status = self.bucket.put_object_stream(&mut file, key).await?;
        check_status(key, status)
    }

    async fn upload_buffer(&self, bytes: &[u8], key: &str) -> Result<()> {
        let response = self.bucket.put_object(key, bytes).await?;
        check_status(key, response.status_code())
    }
}
