use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

/// Name of the lock file inside the data directory
pub const LOCK_FILE: &str = ".lock";

const RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// Exclusive advisory lock on a data directory, held until dropped.
///
/// Every load-mutate-persist sequence, from the TUI or any `jt` command,
/// runs while holding one of these.
pub struct FileLock {
    _file: File,
}

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not open lock file {path}: {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("{path} is held by another jt process (waited {waited_ms} ms)")]
    Busy { path: PathBuf, waited_ms: u128 },
    #[error("could not lock {path}: {source}")]
    Flock { path: PathBuf, source: io::Error },
}

impl FileLock {
    /// Take the lock on `data_dir`, retrying until `timeout` has passed.
    pub fn acquire(data_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let path = data_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|source| LockError::Open {
                path: path.clone(),
                source,
            })?;

        let deadline = Instant::now() + timeout;
        loop {
            match try_flock(&file) {
                Ok(true) => return Ok(FileLock { _file: file }),
                Ok(false) if Instant::now() < deadline => thread::sleep(RETRY_INTERVAL),
                Ok(false) => {
                    return Err(LockError::Busy {
                        path,
                        waited_ms: timeout.as_millis(),
                    });
                }
                Err(source) => return Err(LockError::Flock { path, source }),
            }
        }
    }
}

/// `Ok(false)` when another descriptor holds the lock. Closing the file
/// releases it.
#[cfg(unix)]
fn try_flock(file: &File) -> io::Result<bool> {
    use std::os::unix::io::AsRawFd;
    if unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) } == 0 {
        return Ok(true);
    }
    let err = io::Error::last_os_error();
    if err.kind() == io::ErrorKind::WouldBlock {
        Ok(false)
    } else {
        Err(err)
    }
}

#[cfg(not(unix))]
fn try_flock(_file: &File) -> io::Result<bool> {
    Ok(true)
}
