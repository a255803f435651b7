// Run manifest
// Written last, once every artifact of a run exists.

use std::path::{Path, PathBuf};

use ringscan_recon::RejectedRecord;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::IoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Summary,
    Matrix,
    Figure,
    ChargeDiagram,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunCounts {
    pub records: usize,
    pub rejected: usize,
    pub substituents: usize,
    pub quantities: usize,
    pub charge_rows: usize,
}

/// Provenance record of one batch run.
#[derive(Debug, Clone, Serialize)]
pub struct RunManifest {
    pub engine_version: String,
    pub run_at: String,
    pub input: PathBuf,
    /// `sha256:<hex>` of the input file bytes.
    pub dataset_sha256: String,
    pub counts: RunCounts,
    pub rejected: Vec<RejectedRecord>,
    pub artifacts: Vec<Artifact>,
}

impl RunManifest {
    pub fn new(input: &Path) -> Result<Self, IoError> {
        Ok(Self {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            input: input.to_path_buf(),
            dataset_sha256: sha256_file(input)?,
            counts: RunCounts::default(),
            rejected: Vec::new(),
            artifacts: Vec::new(),
        })
    }

    pub fn record(&mut self, kind: ArtifactKind, path: impl Into<PathBuf>) {
        self.artifacts.push(Artifact { kind, path: path.into() });
    }

    pub fn write(&self, path: &Path) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| IoError::Json(e.to_string()))?;
        std::fs::write(path, json + "\n").map_err(|e| IoError::io(path, e))
    }
}

/// SHA-256 of a file's contents, as `sha256:<hex>`.
pub fn sha256_file(path: &Path) -> Result<String, IoError> {
    let bytes = std::fs::read(path).map_err(|e| IoError::io(path, e))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("sha256:{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_sha256_of_known_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("abc.csv");
        fs::write(&path, "abc").unwrap();
        assert_eq!(
            sha256_file(&path).unwrap(),
            "sha256:ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_manifest_json() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("ScanLibrary.csv");
        fs::write(&input, "x").unwrap();

        let mut manifest = RunManifest::new(&input).unwrap();
        manifest.counts.records = 3;
        manifest.rejected.push(RejectedRecord { index: "7".into(), reason: "blank".into() });
        manifest.record(ArtifactKind::Summary, "Statistical_Activation.csv");
        manifest.record(ArtifactKind::ChargeDiagram, "ChargeDist/NO2_3charges.png");

        let out = dir.path().join("run_manifest.json");
        manifest.write(&out).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(value["counts"]["records"], 3);
        assert_eq!(value["rejected"][0]["index"], "7");
        assert_eq!(value["artifacts"][1]["kind"], "charge_diagram");
        assert!(value["dataset_sha256"].as_str().unwrap().starts_with("sha256:"));
        assert!(value["run_at"].as_str().unwrap().contains('T'));
    }
}
