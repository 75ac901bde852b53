//! Persisted remote training configuration.
//!
//! One TOML file holds the connection details for the GPU host so that
//! `--remote` runs do not need `--remote-host`/`--remote-user` every time.
//! The file is replaced wholesale on every save; fields are never merged
//! across saves.

use crate::error::{RemoteError, RemoteResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the config directory (used by tests).
pub const CONFIG_DIR_ENV: &str = "SPLAT_CONFIG_DIR";

/// Base directory on the remote host under which job directories are created.
pub const DEFAULT_REMOTE_JOBS_DIR: &str = "/c/splat/jobs";

/// Training entry point expected on the remote host.
pub const DEFAULT_TRAIN_SCRIPT: &str = "C:/splat/windows_train.py";

const CONFIG_FILE: &str = "remote.toml";

/// Connection details for the remote GPU host, as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Hostname or IP of the GPU machine.
    pub host: String,
    /// SSH user on the GPU machine.
    pub user: String,
    /// Identity file passed to ssh via `-i`, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_path: Option<PathBuf>,
    /// Base directory for job uploads (default `/c/splat/jobs`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_path: Option<String>,
    /// Training script path on the remote host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub train_script: Option<String>,
}

/// Loads and saves the single [`RemoteConfig`] for this installation.
#[derive(Debug, Clone)]
pub struct RemoteConfigStore {
    dir: PathBuf,
}

impl RemoteConfigStore {
    /// Store rooted at an explicit directory.
    #[must_use]
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store at the default location: `$SPLAT_CONFIG_DIR`, else `~/.splat`.
    #[must_use]
    pub fn default_location() -> Self {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Self::at(dir);
        }
        let dir = dirs::home_dir()
            .map_or_else(|| PathBuf::from(".splat"), |home| home.join(".splat"));
        Self::at(dir)
    }

    /// Directory this store is rooted at.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the config file this store reads and writes.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    /// Load the persisted config.
    ///
    /// A missing file is not an error and yields `None`; a file that exists
    /// but cannot be decoded is reported so a typo does not silently send
    /// jobs to the wrong host.
    pub fn load(&self) -> RemoteResult<Option<RemoteConfig>> {
        let path = self.path();
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let config = toml::from_str(&content).map_err(|e| RemoteError::Parse {
            path,
            message: e.to_string(),
        })?;
        Ok(Some(config))
    }

    /// Persist `config`, overwriting any previous file.
    ///
    /// The write goes to a temp file in the same directory which is then
    /// renamed over the destination, so an interrupted save never leaves a
    /// truncated config behind.
    pub fn save(&self, config: &RemoteConfig) -> RemoteResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        let content = toml::to_string_pretty(config)
            .map_err(|e| RemoteError::Config(format!("failed to encode config: {e}")))?;

        let path = self.path();
        let tmp = self.dir.join(format!("{CONFIG_FILE}.tmp"));
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &path)?;
        tracing::debug!("saved remote config to {}", path.display());
        Ok(())
    }
}

/// Remote connection values given explicitly on the command line.
#[derive(Debug, Clone, Default)]
pub struct RemoteTargetFlags {
    pub host: Option<String>,
    pub user: Option<String>,
    pub key_path: Option<PathBuf>,
    pub remote_path: Option<String>,
}

/// Fully resolved remote target for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    pub host: String,
    pub user: String,
    pub key_path: Option<PathBuf>,
    pub remote_path: String,
    pub train_script: String,
}

impl RemoteTarget {
    /// `user@host` form used by ssh and in log lines.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    /// Snapshot of this target in persistable form.
    #[must_use]
    pub fn to_config(&self) -> RemoteConfig {
        RemoteConfig {
            host: self.host.clone(),
            user: self.user.clone(),
            key_path: self.key_path.clone(),
            remote_path: Some(self.remote_path.clone()),
            train_script: Some(self.train_script.clone()),
        }
    }
}

/// Merge explicit flags over a stored config over built-in defaults.
///
/// Flags always win for the invocation. Host and user have no defaults; if
/// neither flags nor a stored config provide them the result is a usage
/// error telling the caller which flags to pass.
pub fn resolve_target(
    flags: &RemoteTargetFlags,
    stored: Option<&RemoteConfig>,
) -> RemoteResult<RemoteTarget> {
    let host = flags
        .host
        .clone()
        .or_else(|| stored.map(|c| c.host.clone()));
    let user = flags
        .user
        .clone()
        .or_else(|| stored.map(|c| c.user.clone()));

    let (Some(host), Some(user)) = (host, user) else {
        return Err(RemoteError::Config(
            "remote training requires --remote-host and --remote-user \
             (or a config saved earlier with --save-remote-config), \
             e.g. --remote --remote-host 192.168.1.100 --remote-user kris"
                .to_string(),
        ));
    };

    let key_path = flags
        .key_path
        .clone()
        .or_else(|| stored.and_then(|c| c.key_path.clone()));
    let remote_path = flags
        .remote_path
        .clone()
        .or_else(|| stored.and_then(|c| c.remote_path.clone()))
        .unwrap_or_else(|| DEFAULT_REMOTE_JOBS_DIR.to_string());
    let train_script = stored
        .and_then(|c| c.train_script.clone())
        .unwrap_or_else(|| DEFAULT_TRAIN_SCRIPT.to_string());

    Ok(RemoteTarget {
        host,
        user,
        key_path,
        remote_path,
        train_script,
    })
}
