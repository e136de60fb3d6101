//! The persisted slot: one named location holding the JSON array of workouts.

use crate::dlog;
use crate::error::Result;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub trait Storage {
    /// Contents of `slot`, or `None` if nothing was ever saved there or the
    /// contents are not text.
    fn load(&self, slot: &str) -> Result<Option<String>>;

    /// Overwrite `slot`. Completes before returning.
    fn save(&mut self, slot: &str, contents: &str) -> Result<()>;

    fn clear(&mut self, slot: &str) -> Result<()>;
}

/// Slots kept in memory only.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot(slot: &str, contents: impl Into<String>) -> Self {
        let mut s = Self::new();
        s.slots.insert(slot.to_string(), contents.into());
        s
    }

    pub fn get(&self, slot: &str) -> Option<&str> {
        self.slots.get(slot).map(String::as_str)
    }
}

impl Storage for MemoryStorage {
    fn load(&self, slot: &str) -> Result<Option<String>> {
        Ok(self.slots.get(slot).cloned())
    }

    fn save(&mut self, slot: &str, contents: &str) -> Result<()> {
        self.slots.insert(slot.to_string(), contents.to_string());
        Ok(())
    }

    fn clear(&mut self, slot: &str) -> Result<()> {
        self.slots.remove(slot);
        Ok(())
    }
}

/// One `<slot>.json` file per slot under a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn slot_path(&self, slot: &str) -> PathBuf {
        self.dir.join(format!("{slot}.json"))
    }
}

impl Storage for FileStorage {
    fn load(&self, slot: &str) -> Result<Option<String>> {
        let path = self.slot_path(slot);
        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match String::from_utf8(bytes) {
            Ok(s) => Ok(Some(s)),
            Err(e) => {
                // Same as a slot that never held an array: start empty.
                tracing::warn!(path = %path.display(), error = %e, "slot is not UTF-8, ignoring");
                Ok(None)
            }
        }
    }

    fn save(&mut self, slot: &str, contents: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.slot_path(slot);

        // Write next to the target then rename, so readers never see half a file.
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.persist(&path).map_err(|e| e.error)?;

        dlog!("slot_saved path={} bytes={}", path.display(), contents.len());
        Ok(())
    }

    fn clear(&mut self, slot: &str) -> Result<()> {
        match fs::remove_file(self.slot_path(slot)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_slot_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let mut s = FileStorage::new(tmp.path().join("state"));

        assert_eq!(s.load("workouts").unwrap(), None);
        s.save("workouts", "[]").unwrap();
        assert_eq!(s.load("workouts").unwrap().as_deref(), Some("[]"));
        s.save("workouts", "[1]").unwrap();
        assert_eq!(s.load("workouts").unwrap().as_deref(), Some("[1]"));

        s.clear("workouts").unwrap();
        assert_eq!(s.load("workouts").unwrap(), None);
        s.clear("workouts").unwrap();
    }

    #[test]
    fn undecodable_slot_reads_as_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let s = FileStorage::new(tmp.path());
        fs::write(s.slot_path("workouts"), [0xff, 0xfe, b'[', b']']).unwrap();
        assert_eq!(s.load("workouts").unwrap(), None);
    }

    #[test]
    fn memory_slots_are_independent() {
        let mut s = MemoryStorage::with_slot("a", "x");
        s.save("b", "y").unwrap();
        assert_eq!(s.get("a"), Some("x"));
        assert_eq!(s.load("b").unwrap().as_deref(), Some("y"));
    }
}
