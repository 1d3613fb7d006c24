use thiserror::Error;

/// Failures surfaced by the arena and its regions.
///
/// Every variant is reported before any chain link is touched, so an arena
/// that returned an error is still structurally valid.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArenaError {
  #[error("mmap refused a mapping of {size} bytes (errno {errno})")]
  MapFailed { size: usize, errno: i32 },

  #[error("munmap refused to release {size} bytes at 0x{address:x} (errno {errno})")]
  UnmapFailed {
    address: usize,
    size: usize,
    errno: i32,
  },

  #[error("arena has no regions, call init first")]
  Uninitialized,

  #[error("arena already owns regions, destroy it before calling init again")]
  AlreadyInitialized,

  #[error("requested size {requested} overflows the region sizing arithmetic")]
  SizeOverflow { requested: usize },

  #[error("invalid arena configuration: {0}")]
  InvalidConfig(String),
}

pub type ArenaResult<T> = Result<T, ArenaError>;

/// Reads the calling thread's errno after a failed libc call.
pub(crate) fn last_errno() -> i32 {
  std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
}
