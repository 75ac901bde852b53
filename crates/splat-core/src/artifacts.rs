use crate::error::PipelineResult;
use crate::job::JobId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// A trained `.ply` splat export.
    Splat,
    /// A COLMAP sparse model directory.
    SparseModel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineArtifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub sha256: String,
    pub size_bytes: u64,
}

/// Record of one completed run, written to `splat_manifest.json` in the
/// workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineManifest {
    pub job_id: JobId,
    pub created_at: DateTime<Utc>,
    pub video: PathBuf,
    pub frame_count: usize,
    pub steps: u32,
    pub remote: bool,
    pub artifacts: Vec<PipelineArtifact>,
}

pub fn sha256_file(path: &Path) -> PipelineResult<String> {
    let bytes = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

pub fn make_artifact(kind: ArtifactKind, path: PathBuf) -> PipelineResult<PipelineArtifact> {
    let size_bytes = std::fs::metadata(&path)?.len();
    let sha256 = sha256_file(&path)?;
    Ok(PipelineArtifact {
        kind,
        path,
        sha256,
        size_bytes,
    })
}

/// Lists the `.ply` exports directly under `dir`, sorted by name.
pub fn scan_splats(dir: &Path) -> PipelineResult<Vec<PathBuf>> {
    let pattern = dir.join("*.ply");
    let mut splats = Vec::new();
    if let Ok(matches) = glob::glob(&pattern.to_string_lossy()) {
        splats.extend(matches.flatten());
    }
    splats.sort();
    Ok(splats)
}

pub fn write_manifest(path: &Path, manifest: &PipelineManifest) -> PipelineResult<()> {
    let json = serde_json::to_string_pretty(manifest)?;
    std::fs::write(path, json)?;
    tracing::debug!("wrote manifest to {}", path.display());
    Ok(())
}

pub fn read_manifest(path: &Path) -> PipelineResult<PipelineManifest> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_scan_splats_sorted_ply_only() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("export_30000.ply"), b"b").unwrap();
        std::fs::write(temp.path().join("export_05000.ply"), b"a").unwrap();
        std::fs::write(temp.path().join("database.db"), b"x").unwrap();

        let splats = scan_splats(temp.path()).unwrap();
        assert_eq!(splats.len(), 2);
        assert!(splats[0].ends_with("export_05000.ply"));
        assert!(splats[1].ends_with("export_30000.ply"));
    }

    #[test]
    fn test_scan_splats_empty_dir() {
        let temp = TempDir::new().unwrap();
        assert!(scan_splats(temp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_make_artifact_records_digest_and_size() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("export.ply");
        std::fs::write(&path, b"ply data").unwrap();

        let artifact = make_artifact(ArtifactKind::Splat, path).unwrap();
        assert_eq!(artifact.size_bytes, 8);
        assert_eq!(artifact.sha256.len(), 64);
        assert_eq!(artifact.sha256, sha256_file(&artifact.path).unwrap());
    }

    #[test]
    fn test_manifest_round_trips() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("splat_manifest.json");
        let manifest = PipelineManifest {
            job_id: JobId("job_1700000000".to_string()),
            created_at: Utc::now(),
            video: PathBuf::from("clip.mp4"),
            frame_count: 120,
            steps: 30000,
            remote: false,
            artifacts: Vec::new(),
        };

        write_manifest(&path, &manifest).unwrap();
        let loaded = read_manifest(&path).unwrap();
        assert_eq!(loaded.job_id, manifest.job_id);
        assert_eq!(loaded.frame_count, 120);
        assert_eq!(loaded.steps, 30000);
        assert!(!loaded.remote);
    }
}
