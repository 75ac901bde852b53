use std::path::{Path, PathBuf};

/// Filesystem layout of a pipeline workspace.
///
/// ```text
/// <output>/
///   images/            extracted (and downscaled) frames
///   images_original/   full-resolution copies before downscaling
///   database.db        COLMAP feature database
///   sparse/<n>/        COLMAP sparse models
///   *.ply              exported splats
///   splat_manifest.json
/// ```
#[derive(Debug, Clone)]
pub struct WorkspaceLayout {
    root: PathBuf,
}

impl WorkspaceLayout {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn images_dir(&self) -> PathBuf {
        self.root.join("images")
    }

    #[must_use]
    pub fn originals_dir(&self) -> PathBuf {
        self.root.join("images_original")
    }

    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.root.join("database.db")
    }

    #[must_use]
    pub fn sparse_dir(&self) -> PathBuf {
        self.root.join("sparse")
    }

    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join("splat_manifest.json")
    }
}
