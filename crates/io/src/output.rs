// Output directories

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::IoError;

/// What to do when the charge diagram directory is already there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeDirPolicy {
    /// Refuse to run, so diagrams from an earlier run are never mixed in.
    #[default]
    FailIfExists,
    /// Write into the existing directory, creating it when absent.
    Reuse,
}

/// Create the charge diagram directory once, at the start of a run.
pub fn prepare_charge_dir(path: &Path, policy: ChargeDirPolicy) -> Result<(), IoError> {
    match (path.exists(), policy) {
        (true, ChargeDirPolicy::FailIfExists) => Err(IoError::DirectoryExists(path.to_path_buf())),
        (true, ChargeDirPolicy::Reuse) => {
            log::info!("reusing {}", path.display());
            Ok(())
        }
        (false, _) => ensure_dir(path),
    }
}

/// Create `path` and any missing parents; an existing directory is fine.
pub fn ensure_dir(path: &Path) -> Result<(), IoError> {
    std::fs::create_dir_all(path).map_err(|e| IoError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_second_run_fails_fast() {
        let dir = tempdir().unwrap();
        let charges = dir.path().join("ChargeDist");
        prepare_charge_dir(&charges, ChargeDirPolicy::FailIfExists).unwrap();
        assert!(charges.is_dir());

        let err = prepare_charge_dir(&charges, ChargeDirPolicy::FailIfExists).unwrap_err();
        assert!(matches!(err, IoError::DirectoryExists(_)));
    }

    #[test]
    fn test_reuse_policy() {
        let dir = tempdir().unwrap();
        let charges = dir.path().join("ChargeDist");
        prepare_charge_dir(&charges, ChargeDirPolicy::Reuse).unwrap();
        prepare_charge_dir(&charges, ChargeDirPolicy::Reuse).unwrap();
        assert!(charges.is_dir());
    }
}
