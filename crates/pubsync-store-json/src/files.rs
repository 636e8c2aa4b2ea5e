//! Whole-file JSON array reads and atomic writes.

use std::{
  ffi::OsString,
  io::ErrorKind,
  path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, Result};

/// Read and decode the JSON document at `path`. Returns `None` if the file
/// does not exist.
pub(crate) async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
  let bytes = match tokio::fs::read(path).await {
    Ok(bytes) => bytes,
    Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
    Err(e) => return Err(Error::io(path, e)),
  };
  let items = serde_json::from_slice(&bytes).map_err(|e| Error::json(path, e))?;
  Ok(Some(items))
}

/// Serialise `value` as pretty JSON and atomically replace `path` with it.
///
/// The document is written to a sibling temporary file first and renamed
/// over the target, so readers see either the old or the new collection.
pub(crate) async fn write_atomic<T: Serialize + ?Sized>(
  path: &Path,
  value: &T,
) -> Result<()> {
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    tokio::fs::create_dir_all(parent)
      .await
      .map_err(|e| Error::io(parent, e))?;
  }

  let bytes = serde_json::to_vec_pretty(value).map_err(|e| Error::json(path, e))?;
  let tmp = temp_path(path);

  if let Err(e) = tokio::fs::write(&tmp, &bytes).await {
    return Err(Error::io(&tmp, e));
  }
  if let Err(e) = tokio::fs::rename(&tmp, path).await {
    let _ = tokio::fs::remove_file(&tmp).await;
    return Err(Error::io(path, e));
  }
  Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
  let mut name = path.file_name().map(OsString::from).unwrap_or_default();
  name.push(".tmp");
  path.with_file_name(name)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn temp_path_is_a_sibling() {
    let tmp = temp_path(Path::new("/data/publications.json"));
    assert_eq!(tmp, PathBuf::from("/data/publications.json.tmp"));
  }

  #[tokio::test]
  async fn missing_file_reads_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let read: Option<Vec<u32>> =
      read_json(&dir.path().join("absent.json")).await.unwrap();
    assert!(read.is_none());
  }

  #[tokio::test]
  async fn write_creates_parent_and_leaves_no_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("numbers.json");

    write_atomic(&path, &[1, 2, 3]).await.unwrap();

    let read: Vec<u32> = read_json(&path).await.unwrap().unwrap();
    assert_eq!(read, vec![1, 2, 3]);
    assert!(!temp_path(&path).exists());
  }
}
