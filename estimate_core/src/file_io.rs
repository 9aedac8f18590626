//! # File I/O Module
//!
//! Handles project file operations with safety features:
//! - **Atomic saves**: Write to .tmp, sync, rename to prevent corruption
//! - **File locking**: Prevent concurrent edits on shared drives
//! - **Version validation**: Ensure schema compatibility
//!
//! ## File Format
//!
//! Projects are saved as `.fwe` files containing JSON.
//! Lock files use the `.fwe.lock` extension with metadata about who holds the lock.
//!
//! ## Example
//!
//! ```rust,no_run
//! use estimate_core::file_io::{save_project, load_project, FileLock};
//! use estimate_core::project::Project;
//! use std::path::Path;
//!
//! let project = Project::new("Estimator", "25-001", "Client");
//! let path = Path::new("house.fwe");
//!
//! let lock = FileLock::acquire(path, "sam@framer.co").unwrap();
//! save_project(&project, path).unwrap();
//! drop(lock);
//!
//! let loaded = load_project(path).unwrap();
//! assert_eq!(loaded.meta.job_id, "25-001");
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{EstimateError, EstimateResult};
use crate::project::{Project, SCHEMA_VERSION};

/// Project file extension
pub const PROJECT_EXTENSION: &str = "fwe";

/// Locks older than this are taken over
const STALE_LOCK_HOURS: i64 = 24;

/// Lock file metadata stored in .fwe.lock files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// User identifier (email or username)
    pub user_id: String,
    /// Machine name where lock was acquired
    pub machine: String,
    /// Process ID that holds the lock
    pub pid: u32,
    /// When the lock was acquired
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Lock info for the current process
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME").ok().or_else(|| std::env::var("HOST").ok())
    }
}

/// File lock guard that releases the lock when dropped.
///
/// Holds an OS advisory lock (via fs2) on a `.lock` sidecar that also
/// records who holds it.
pub struct FileLock {
    project_path: PathBuf,
    lock_path: PathBuf,
    /// Keeps the OS lock alive
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire an exclusive lock on a project file.
    ///
    /// Fails with [`EstimateError::FileLocked`] while another live process
    /// holds it. Stale locks are taken over.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> EstimateResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        if lock_path.exists() {
            if let Ok(existing) = read_lock_info(&lock_path) {
                if !is_lock_stale(&existing) {
                    return Err(EstimateError::file_locked(
                        path.display().to_string(),
                        format!("{} ({})", existing.user_id, existing.machine),
                        existing.locked_at.to_rfc3339(),
                    ));
                }
                warn!(path = %path.display(), holder = %existing.user_id, "Taking over stale lock");
            }
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| {
                let lock_display = lock_path.display().to_string();
                EstimateError::file_error("create lock", lock_display, e.to_string())
            })?;

        lock_file.try_lock_exclusive().map_err(|_| {
            EstimateError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;

        let lock_json = serde_json::to_string_pretty(&info)
            .map_err(|e| EstimateError::serialization(e.to_string()))?;

        lock_file.write_all(lock_json.as_bytes()).map_err(|e| {
            EstimateError::file_error("write lock", lock_path.display().to_string(), e.to_string())
        })?;

        lock_file.sync_all().map_err(|e| {
            EstimateError::file_error("sync lock", lock_path.display().to_string(), e.to_string())
        })?;

        debug!(path = %path.display(), user = %info.user_id, "Acquired project lock");
        Ok(FileLock {
            project_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Current holder of a live lock, if any. Does not acquire.
    pub fn check(path: &Path) -> Option<LockInfo> {
        let lock_path = lock_path_for(path);
        if !lock_path.exists() {
            return None;
        }
        read_lock_info(&lock_path).ok().filter(|info| !is_lock_stale(info))
    }

    pub fn project_path(&self) -> &Path {
        &self.project_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

fn lock_path_for(project_path: &Path) -> PathBuf {
    let mut lock_path = project_path.to_path_buf();
    let extension = lock_path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    lock_path.set_extension(extension);
    lock_path
}

fn read_lock_info(lock_path: &Path) -> EstimateResult<LockInfo> {
    let contents = read_to_string(lock_path, "read lock")?;
    serde_json::from_str(&contents).map_err(|e| EstimateError::serialization(e.to_string()))
}

/// A lock is stale when its process is gone from this machine, or it is
/// older than a day.
fn is_lock_stale(info: &LockInfo) -> bool {
    if hostname().is_some_and(|ours| ours == info.machine) {
        #[cfg(windows)]
        {
            use std::process::Command;
            let output = Command::new("tasklist")
                .args(["/FI", &format!("PID eq {}", info.pid), "/NH"])
                .output();
            if let Ok(output) = output {
                let stdout = String::from_utf8_lossy(&output.stdout);
                if stdout.contains("No tasks") || !stdout.contains(&info.pid.to_string()) {
                    return true;
                }
            }
        }
        #[cfg(unix)]
        {
            if fs::metadata(format!("/proc/{}", info.pid)).is_err() {
                return true;
            }
        }
    }

    (Utc::now() - info.locked_at).num_hours() > STALE_LOCK_HOURS
}

fn read_to_string(path: &Path, operation: &str) -> EstimateResult<String> {
    let mut file = File::open(path).map_err(|e| {
        EstimateError::file_error(operation, path.display().to_string(), e.to_string())
    })?;
    let mut contents = String::new();
    file.read_to_string(&mut contents).map_err(|e| {
        EstimateError::file_error(operation, path.display().to_string(), e.to_string())
    })?;
    Ok(contents)
}

/// Save a project with atomic write semantics.
///
/// 1. Serialize project to JSON
/// 2. Write to a temporary file (.tmp)
/// 3. Sync to disk (fsync)
/// 4. Rename .tmp over the target
pub fn save_project(project: &Project, path: &Path) -> EstimateResult<()> {
    let json = serde_json::to_string_pretty(project)
        .map_err(|e| EstimateError::serialization(e.to_string()))?;

    let tmp_path = path.with_extension(format!("{PROJECT_EXTENSION}.tmp"));
    let tmp_display = tmp_path.display().to_string();
    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        EstimateError::file_error("create temp file", tmp_display.clone(), e.to_string())
    })?;
    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        EstimateError::file_error("write temp file", tmp_display.clone(), e.to_string())
    })?;
    tmp_file.sync_all().map_err(|e| {
        EstimateError::file_error("sync temp file", tmp_display.clone(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        EstimateError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    debug!(path = %path.display(), levels = project.levels.len(), "Saved project");
    Ok(())
}

/// Load a project from a file.
///
/// Validates the schema version and re-runs the headers infill rule so a
/// hand-edited file comes back consistent.
pub fn load_project(path: &Path) -> EstimateResult<Project> {
    let contents = read_to_string(path, "open")?;

    let mut project: Project = serde_json::from_str(&contents).map_err(|e| {
        EstimateError::serialization(format!("Invalid JSON in {}: {}", path.display(), e))
    })?;

    validate_version(&project.meta.version)?;
    project.settings.validate()?;
    project.reconcile();

    debug!(path = %path.display(), levels = project.levels.len(), "Loaded project");
    Ok(project)
}

/// Load a project along with the holder of any live lock on it.
pub fn load_project_with_lock_check(path: &Path) -> EstimateResult<(Project, Option<LockInfo>)> {
    let project = load_project(path)?;
    let lock_info = FileLock::check(path);
    Ok((project, lock_info))
}

/// Major must match; in 0.x a newer minor is rejected.
fn validate_version(file_version: &str) -> EstimateResult<()> {
    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.parse().ok()).collect() };
    let file_parts = parse(file_version);
    let current_parts = parse(SCHEMA_VERSION);

    let mismatch = || EstimateError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    match (file_parts.first(), current_parts.first()) {
        (Some(file_major), Some(current_major)) if file_major == current_major => {}
        _ => return Err(mismatch()),
    }

    if current_parts[0] == 0 {
        if let (Some(file_minor), Some(current_minor)) = (file_parts.get(1), current_parts.get(1)) {
            if file_minor > current_minor {
                return Err(mismatch());
            }
        }
    }

    Ok(())
}
