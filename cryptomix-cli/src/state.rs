use anyhow::{Context, Result};
use cryptomix_core::{Assignment, AssignmentStore};
use std::fs;
use std::path::{Path, PathBuf};

/// `$CRYPTOMIX_HOME`, or `~/.cryptomix`.
pub fn cryptomix_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("CRYPTOMIX_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".cryptomix"))
}

pub fn ensure_cryptomix_home() -> Result<PathBuf> {
    let dir = cryptomix_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn assignments_path() -> Result<PathBuf> {
    Ok(ensure_cryptomix_home()?.join("assignments.json"))
}

/// Assignment history kept as a JSON array on disk.
///
/// `put` only updates memory; call `save` to persist.
#[derive(Debug)]
pub struct JsonAssignmentStore {
    path: PathBuf,
    records: Vec<Assignment>,
    dirty: bool,
}

impl JsonAssignmentStore {
    pub fn open(path: &Path) -> Result<Self> {
        let records = if path.exists() {
            let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
            serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))?
        } else {
            Vec::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            records,
            dirty: false,
        })
    }

    #[cfg(test)]
    pub fn records(&self) -> &[Assignment] {
        &self.records
    }

    pub fn save(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let json = serde_json::to_string_pretty(&self.records)?;
        fs::write(&self.path, json).with_context(|| format!("write {}", self.path.display()))?;
        self.dirty = false;
        Ok(())
    }
}

impl AssignmentStore for JsonAssignmentStore {
    fn get(&self, experiment_id: &str, subject_id: &str) -> Option<Assignment> {
        self.records
            .iter()
            .find(|a| a.experiment_id == experiment_id && a.subject_id == subject_id)
            .cloned()
    }

    fn put(&mut self, assignment: Assignment) {
        self.records.retain(|a| {
            !(a.experiment_id == assignment.experiment_id && a.subject_id == assignment.subject_id)
        });
        self.records.push(assignment);
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use cryptomix_core::{assign, Experiment, Variant};

    fn temp_file(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cryptomix-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let p = dir.join(name);
        let _ = fs::remove_file(&p);
        p
    }

    #[test]
    fn test_json_store_round_trip() {
        let path = temp_file("assignments.json");
        let exp = Experiment::new("exp", 1.0)
            .with_variant(Variant::control("control"), 1)
            .with_variant(Variant::control("other"), 1);
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap();

        let mut store = JsonAssignmentStore::open(&path).unwrap();
        let first = assign(&exp, "subject-1", &mut store, now).unwrap().unwrap();
        store.save().unwrap();

        let mut reopened = JsonAssignmentStore::open(&path).unwrap();
        assert_eq!(reopened.records().len(), 1);
        let later = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        let again = assign(&exp, "subject-1", &mut reopened, later).unwrap().unwrap();
        assert_eq!(again, first);
    }
}
