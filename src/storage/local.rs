//! Local JSON spool used when the primary store is unavailable.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;

use crate::data::Data;

use super::SinkError;

/// Writes each failed batch to `<dir>/<unix_nanos>.json`.
///
/// File names strictly increase within a process even when the wall clock
/// stalls or steps back.
#[derive(Debug)]
pub struct LocalStore {
    dir: PathBuf,
    last: Mutex<i64>,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            last: Mutex::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn next_stamp(&self) -> i64 {
        let now = Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX);
        let mut last = self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *last = now.max(last.saturating_add(1));
        *last
    }

    /// Serialize `batch` as a pretty JSON array and write it atomically.
    pub async fn persist(&self, batch: &[Data]) -> Result<PathBuf, SinkError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let body = serde_json::to_vec_pretty(batch)?;
        let stamp = self.next_stamp();
        let path = self.dir.join(format!("{stamp}.json"));
        let partial = self.dir.join(format!("{stamp}.json.part"));

        tokio::fs::write(&partial, body).await?;
        tokio::fs::rename(&partial, &path).await?;
        Ok(path)
    }
}

/// Read one spooled batch back.
pub fn read_batch(path: impl AsRef<Path>) -> Result<Vec<Data>, SinkError> {
    let content = std::fs::read(path.as_ref())?;
    Ok(serde_json::from_slice(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamps_strictly_increase() {
        let store = LocalStore::new("/unused");
        let mut previous = store.next_stamp();
        for _ in 0..1000 {
            let next = store.next_stamp();
            assert!(next > previous);
            previous = next;
        }
    }

    #[tokio::test]
    async fn test_persist_creates_dir_and_round_trips() {
        let root = tempfile::tempdir().unwrap();
        let store = LocalStore::new(root.path().join("spool").join("nested"));

        let mut data = Data::new();
        data.add_tag("device_name", "routera");
        data.metric_mut("uptime_info").add_field("0", "uptime_seconds", 12345i64);
        data.seal(Utc::now());
        let batch = vec![data];

        let first = store.persist(&batch).await.unwrap();
        let second = store.persist(&batch).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(first.extension().and_then(|e| e.to_str()), Some("json"));
        assert_eq!(read_batch(&first).unwrap(), batch);

        let names: Vec<_> = std::fs::read_dir(store.dir()).unwrap().collect();
        assert_eq!(names.len(), 2);
    }
}
