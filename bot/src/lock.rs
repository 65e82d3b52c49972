//! Single-instance lock file.
//!
//! Two pollers hammering the same database and Telegram chat is worse than
//! none, so startup takes an exclusive lock file and refuses to run if it
//! already exists. The file is removed when the guard drops.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

pub struct InstanceLock {
    path: PathBuf,
}

impl InstanceLock {
    pub fn acquire(path: &str) -> Result<Self> {
        let path = PathBuf::from(path);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating lock directory {}", parent.display()))?;
            }
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                bail!(
                    "lock file {} already exists; another instance is running \
                     (delete it if that instance crashed)",
                    path.display()
                );
            }
            Err(e) => {
                return Err(e).with_context(|| format!("creating lock file {}", path.display()))
            }
        };

        // The pid inside is informational only.
        let _ = writeln!(file, "{}", std::process::id());
        info!("Acquired instance lock at {}", path.display());
        Ok(InstanceLock { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!("Could not remove lock file {}: {}", self.path.display(), e);
        }
    }
}
