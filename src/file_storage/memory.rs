use super::interface::FileStorage;
use crate::types::{Error, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;
use tokio::sync::Semaphore;

/// Test double which keeps uploaded objects in memory.
#[derive(Default)]
pub struct MemoryFileStorage {
    objects: Mutex<Vec<(String, Vec<u8>)>>,
    rejected_keys: HashSet<String>,
    broken_keys: HashSet<String>,
    panicking_keys: HashSet<String>,
    gate: Option<Semaphore>,
}

impl MemoryFileStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads to `key` fail as a remote rejection.
    pub fn rejecting(mut self, key: &str) -> Self {
        self.rejected_keys.insert(key.to_owned());
        self
    }

    /// Uploads to `key` fail with an error outside the transfer family.
    pub fn broken_on(mut self, key: &str) -> Self {
        self.broken_keys.insert(key.to_owned());
        self
    }

    /// Uploads to `key` panic.
    pub fn panicking_on(mut self, key: &str) -> Self {
        self.panicking_keys.insert(key.to_owned());
        self
    }

    /// Every upload waits for a permit released through `release`.
    pub fn gated(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    pub fn release(&self, uploads: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(uploads);
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .unwrap()
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .iter()
            .find(|(stored, _)| stored == key)
            .map(|(_, bytes)| bytes.clone())
    }

    async fn store(&self, bytes: Vec<u8>, key: &str) -> Result<()> {
        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|err| Error::Internal(err.to_string()))?
                .forget();
        }
        if self.panicking_keys.contains(key) {
            panic!("storage client crashed on {}", key);
        }
        if self.broken_keys.contains(key) {
            return Err(Error::Internal(format!("storage defect on {}", key)));
        }
        if self.rejected_keys.contains(key) {
            return Err(Error::Rejected {
                key: key.to_owned(),
                status: 403,
            });
        }
        self.objects.lock().unwrap().push((key.to_owned(), bytes));
        Ok(())
    }
}

#[async_trait]
impl FileStorage for MemoryFileStorage {
    async fn upload_file(&self, path: &Path, key: &str) -> Result<()> {
        let bytes = tokio::fs::read(path).await?;
        self.store(bytes, key).await
    }

    async fn upload_buffer(&self, bytes: &[u8], key: &str) -> Result<()> {
        self.store(bytes.to_owned(), key).await
    }
}
