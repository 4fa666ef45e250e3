use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const LOCK_FILE: &str = ".lock";
const POLL_INTERVAL: Duration = Duration::from_millis(10);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Exclusive writer lock for one project's sources and ledger.
///
/// Held as an flock on `<state_dir>/.lock`. The lock file itself is
/// permanent: every writer locks the same inode, and the flock goes away
/// when the handle closes on drop.
#[derive(Debug)]
pub struct WriterLock {
    _file: File,
    path: PathBuf,
}

/// Error type for lock operations
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not open lock file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("timed out waiting for {path}: another todo-actions process is writing")]
    Timeout { path: PathBuf },
}

impl WriterLock {
    /// Take the writer lock in `state_dir`, polling until `timeout` runs out.
    pub fn acquire(state_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let path = state_dir.join(LOCK_FILE);
        let file = open_lock_file(state_dir, &path).map_err(|source| LockError::Open {
            path: path.clone(),
            source,
        })?;

        let deadline = Instant::now() + timeout;
        while !try_flock(&file) {
            if Instant::now() >= deadline {
                return Err(LockError::Timeout { path });
            }
            std::thread::sleep(POLL_INTERVAL);
        }
        tracing::debug!(path = %path.display(), "writer lock taken");
        Ok(WriterLock { _file: file, path })
    }

    pub fn acquire_default(state_dir: &Path) -> Result<Self, LockError> {
        Self::acquire(state_dir, DEFAULT_TIMEOUT)
    }
}

impl Drop for WriterLock {
    fn drop(&mut self) {
        tracing::debug!(path = %self.path.display(), "writer lock released");
    }
}

fn open_lock_file(state_dir: &Path, path: &Path) -> std::io::Result<File> {
    fs::create_dir_all(state_dir)?;
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)
}

/// Non-blocking exclusive flock; `false` while someone else holds it.
#[cfg(unix)]
fn try_flock(file: &File) -> bool {
    use std::os::unix::io::AsRawFd;
    unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) == 0 }
}

#[cfg(not(unix))]
fn try_flock(_file: &File) -> bool {
    true
}
