//! External tool probing and Brush discovery.
//!
//! The pipeline never reimplements its collaborators; it only needs to
//! know, before any stage runs, that the binaries for the stages that
//! WILL run are present. Each probe is independent and idempotent, and
//! missing tools are reported together rather than one at a time.

use crate::error::{PipelineError, PipelineResult};
use crate::job::JobSpec;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Environment variable naming the Brush binary.
pub const BRUSH_PATH_ENV: &str = "BRUSH_PATH";

/// Locations checked for Brush when no explicit path is given.
fn brush_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("/Applications/brush_app"),
        PathBuf::from("/Applications/Brush.app/Contents/MacOS/brush_app"),
    ];
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join("Applications/brush_app"));
        paths.push(home.join("brush-app-aarch64-apple-darwin/brush_app"));
        paths.push(home.join("Downloads/brush-app-aarch64-apple-darwin/brush_app"));
    }
    paths
}

/// A subprocess collaborator the pipeline shells out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalTool {
    Ffmpeg,
    Colmap,
    Magick,
}

impl ExternalTool {
    /// Binary name looked up on `PATH`.
    #[must_use]
    pub const fn binary(self) -> &'static str {
        match self {
            Self::Ffmpeg => "ffmpeg",
            Self::Colmap => "colmap",
            Self::Magick => "magick",
        }
    }

    /// How to install the tool when it is missing.
    #[must_use]
    pub const fn install_hint(self) -> &'static str {
        match self {
            Self::Ffmpeg => "brew install ffmpeg",
            Self::Colmap => "brew install colmap",
            Self::Magick => "brew install imagemagick",
        }
    }

    /// Argument that makes the binary exit quickly during a probe.
    const fn probe_arg(self) -> &'static str {
        match self {
            Self::Ffmpeg | Self::Magick => "-version",
            Self::Colmap => "help",
        }
    }

    /// True when the binary can be spawned. The exit status is irrelevant;
    /// only a failure to start counts as missing.
    pub async fn probe(self) -> bool {
        Command::new(self.binary())
            .arg(self.probe_arg())
            .output()
            .await
            .is_ok()
    }
}

impl std::fmt::Display for ExternalTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.binary())
    }
}

/// Tools needed by the stages this job will actually run.
#[must_use]
pub fn required_for(spec: &JobSpec) -> Vec<ExternalTool> {
    let mut tools = Vec::new();
    if !spec.skip.extract {
        tools.push(ExternalTool::Ffmpeg);
        tools.push(ExternalTool::Magick);
    }
    if !spec.skip.colmap {
        tools.push(ExternalTool::Colmap);
    }
    tools
}

/// Probes every tool and reports all missing ones at once.
///
/// # Errors
/// Returns `MissingDependencies` naming each absent tool with its install
/// hint
pub async fn check_tools(tools: &[ExternalTool]) -> PipelineResult<()> {
    let mut missing = Vec::new();
    for tool in tools {
        if tool.probe().await {
            tracing::debug!("found {tool}");
        } else {
            missing.push(*tool);
        }
    }
    if missing.is_empty() {
        return Ok(());
    }
    let listing = missing
        .iter()
        .map(|t| format!("{t} (install with `{}`)", t.install_hint()))
        .collect::<Vec<_>>()
        .join(", ");
    Err(PipelineError::MissingDependencies(listing))
}

/// Locates the Brush binary: explicit path, then `BRUSH_PATH`, then the
/// usual install locations, then a glob under the home directory.
///
/// # Errors
/// Returns `BrushNotFound` with recovery options when nothing matches
pub fn find_brush(explicit: Option<&Path>) -> PipelineResult<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(PipelineError::BrushNotFound(format!(
            "no such file: {}",
            path.display()
        )));
    }

    if let Ok(env_path) = std::env::var(BRUSH_PATH_ENV) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
    }

    if let Some(found) = first_existing(&brush_search_paths()).or_else(glob_for_brush) {
        return Ok(found);
    }

    Err(PipelineError::BrushNotFound(
        "set BRUSH_PATH, pass --brush-path, download it from \
         https://github.com/ArthurBrussee/brush/releases, or train with --remote"
            .to_string(),
    ))
}

fn first_existing(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates.iter().find(|p| p.exists()).cloned()
}

fn glob_for_brush() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    for pattern in ["**/brush_app", "**/brush-app*/brush_app"] {
        let full = home.join(pattern);
        let matches = glob::glob(&full.to_string_lossy()).ok()?;
        if let Some(found) = matches.flatten().next() {
            return Some(found);
        }
    }
    None
}
