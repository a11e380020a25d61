//! Whole-file JSON snapshot I/O.
//!
//! Writes never touch the target in place: the new snapshot goes to a
//! sibling `.tmp` file, is fsynced, and then renamed over the target, so a
//! reader (or a crash) sees either the old file or the new one.

use std::{
  ffi::OsString,
  io::ErrorKind,
  path::{Path, PathBuf},
};

use booth_core::record::Snapshot;
use tokio::{fs, io::AsyncWriteExt as _};

use crate::{Error, Result};

/// Read the snapshot at `path`. A missing file is an empty store.
pub async fn load(path: &Path) -> Result<Snapshot> {
  match fs::read(path).await {
    Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Snapshot::default()),
    Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
    Err(e) if e.kind() == ErrorKind::NotFound => Ok(Snapshot::default()),
    Err(e) => Err(Error::io(path, e)),
  }
}

/// Create the parent directory of `path` if needed.
pub async fn ensure_parent(path: &Path) -> Result<()> {
  match path.parent() {
    Some(dir) if !dir.as_os_str().is_empty() => {
      fs::create_dir_all(dir).await.map_err(|e| Error::io(dir, e))
    }
    _ => Ok(()),
  }
}

/// Absolute, symlink-free form of `path`. The parent must exist; the file
/// itself need not.
pub async fn canonical(path: &Path) -> Result<PathBuf> {
  let dir = match path.parent() {
    Some(dir) if !dir.as_os_str().is_empty() => dir,
    _ => Path::new("."),
  };
  let dir = fs::canonicalize(dir).await.map_err(|e| Error::io(dir, e))?;
  Ok(match path.file_name() {
    Some(name) => dir.join(name),
    None => dir,
  })
}

/// Replace the file at `path` with the serialised `snapshot`.
pub async fn write_atomic(path: &Path, snapshot: &Snapshot) -> Result<()> {
  let bytes = serde_json::to_vec_pretty(snapshot)?;
  let tmp = temp_path(path);

  if let Err(e) = write_and_sync(&tmp, &bytes).await {
    let _ = fs::remove_file(&tmp).await;
    return Err(e);
  }
  if let Err(e) = fs::rename(&tmp, path).await {
    let _ = fs::remove_file(&tmp).await;
    return Err(Error::io(path, e));
  }
  Ok(())
}

async fn write_and_sync(tmp: &Path, bytes: &[u8]) -> Result<()> {
  let mut file = fs::File::create(tmp).await.map_err(|e| Error::io(tmp, e))?;
  file.write_all(bytes).await.map_err(|e| Error::io(tmp, e))?;
  file.sync_all().await.map_err(|e| Error::io(tmp, e))?;
  Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
  let mut name: OsString = path.file_name().unwrap_or_default().to_os_string();
  name.push(".tmp");
  path.with_file_name(name)
}
