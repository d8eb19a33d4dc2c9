use crate::types::{Error, Result};
use log::{info, warn};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSource {
  /// Regular file found under a backup directory, streamed from disk.
  File,
  /// Backup root that is a single resource; read fully into memory.
  Resource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTask {
  pub local_path: PathBuf,
  pub key: String,
  pub source: TaskSource,
}

/// Case-insensitive extension allow-list. Empty accepts every file.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
  extensions: Vec<String>,
}

impl FileFilter {
  pub fn new<Ext: AsRef<str>>(extensions: &[Ext]) -> Self {
    let extensions = extensions
      .iter()
      .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_lowercase())
      .filter(|ext| !ext.is_empty())
      .collect();
    Self { extensions }
  }

  pub fn accepts(&self, path: &Path) -> bool {
    if self.extensions.is_empty() {
      return true;
    }
    path
      .extension()
      .and_then(OsStr::to_str)
      .map(str::to_lowercase)
      .map_or(false, |ext| self.extensions.contains(&ext))
  }
}

/// Lists what a run against `root` has to upload.
///
/// Directories are walked depth-first with entries of each directory sorted
/// by name. A root that is not a directory becomes a single task keyed by
/// the root string exactly as given.
pub fn enumerate(root: &str, filter: &FileFilter) -> Result<Vec<UploadTask>> {
  info!("Reading files from file path: {}", root);
  if root.trim().is_empty() {
    return Err(Error::InvalidInput("Backup path is blank".to_owned()));
  }

  let path = Path::new(root);
  if !path.exists() {
    info!("No file was found in file path: {}", root);
    return Ok(Vec::new());
  }
  if path.is_file() {
    return Ok(vec![UploadTask {
      local_path: path.to_owned(),
      key: root.to_owned(),
      source: TaskSource::Resource,
    }]);
  }
  if !path.is_dir() {
    warn!("Skipping {}: neither a file nor a directory", root);
    return Ok(Vec::new());
  }

  let mut tasks = Vec::new();
  for entry in WalkDir::new(path).sort_by_file_name() {
    let entry = match entry {
      Ok(entry) => entry,
      Err(err) => {
        let location = err.path().map(|path| path.display().to_string());
        warn!(
          "Skipping unreadable entry {}: {}",
          location.as_deref().unwrap_or(root),
          err
        );
        continue;
      }
    };
    // Links are kept and resolved when opened; pipes, sockets and devices
    // would block or never end.
    let file_type = entry.file_type();
    if !(file_type.is_file() || file_type.is_symlink()) || !filter.accepts(entry.path()) {
      continue;
    }
    let entry_path = entry.into_path();
    let key = derive_key(path, &entry_path);
    tasks.push(UploadTask {
      local_path: entry_path,
      key,
      source: TaskSource::File,
    });
  }
  if tasks.is_empty() {
    info!("No file was found in file path: {}", root);
  }
  Ok(tasks)
}

/// Object key for `entry`: its path below `root` joined with `/`, or its
/// file name when nothing is left after stripping the root.
fn derive_key(root: &Path, entry: &Path) -> String {
  let relative = entry
    .strip_prefix(root)
    .map(|relative| {
      relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
    })
    .unwrap_or_default();
  if !relative.is_empty() {
    return relative;
  }
  entry
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .unwrap_or_default()
}
