use std::{
  fmt, mem,
  ptr::{self, NonNull},
};

use libc::{MAP_ANONYMOUS, MAP_FAILED, MAP_PRIVATE, PROT_READ, PROT_WRITE, c_void, mmap, munmap};
use log::debug;

use crate::error::{ArenaError, ArenaResult, last_errno};

/// Bytes taken by the header at the start of every region mapping.
pub const HEADER_SIZE: usize = mem::size_of::<Region>();

/// Bookkeeping header written at the start of an OS mapping.
///
/// The usable storage starts right after the header and spans `capacity`
/// bytes. `used + remaining == capacity` holds between every public call.
#[repr(C)]
pub(crate) struct Region {
  pub next: Option<NonNull<Region>>,
  pub capacity: usize,
  pub used: usize,
  pub remaining: usize,
}

impl Region {
  /// Maps `size_bytes` of anonymous memory and writes a fresh header into it.
  ///
  /// `size_bytes` must be larger than [`HEADER_SIZE`].
  pub fn create(
    size_bytes: usize,
  ) -> ArenaResult<NonNull<Region>> {
    debug_assert!(size_bytes > HEADER_SIZE);

    let address = unsafe {
      mmap(
        ptr::null_mut(),
        size_bytes,
        PROT_READ | PROT_WRITE,
        MAP_ANONYMOUS | MAP_PRIVATE,
        -1,
        0,
      )
    };

    if address == MAP_FAILED {
      return Err(ArenaError::MapFailed {
        size: size_bytes,
        errno: last_errno(),
      });
    }

    let capacity = size_bytes - HEADER_SIZE;
    // SAFETY: mmap without MAP_FIXED reports failure as MAP_FAILED, never null.
    let region = unsafe { NonNull::new_unchecked(address as *mut Region) };

    unsafe {
      region.write(Region {
        next: None,
        capacity,
        used: 0,
        remaining: capacity,
      });
    }

    debug!("mapped region at {:p}: {} bytes, capacity {}", region, size_bytes, capacity);

    Ok(region)
  }

  /// Releases the whole mapping behind `region`, header included.
  ///
  /// # Safety
  ///
  /// `region` must come from [`Region::create`] and must not have been
  /// destroyed already. Nothing may touch the region or its storage afterwards.
  pub unsafe fn destroy(
    region: NonNull<Region>,
  ) -> ArenaResult<()> {
    let size = HEADER_SIZE + unsafe { region.as_ref() }.capacity;
    let ret = unsafe { munmap(region.as_ptr() as *mut c_void, size) };

    if ret != 0 {
      return Err(ArenaError::UnmapFailed {
        address: region.as_ptr() as usize,
        size,
        errno: last_errno(),
      });
    }

    debug!("unmapped region at {:p}: {} bytes", region, size);
    Ok(())
  }

  /// First byte of the storage that follows the header.
  pub fn storage(
    region: NonNull<Region>,
  ) -> *mut u8 {
    unsafe { (region.as_ptr() as *mut u8).add(HEADER_SIZE) }
  }

  /// Carves `size` bytes off the front of the free space, if they fit.
  pub fn bump(
    region: NonNull<Region>,
    size: usize,
  ) -> Option<NonNull<u8>> {
    if size > unsafe { region.as_ref() }.remaining {
      return None;
    }

    Some(Self::carve(region, size))
  }

  /// Carves `size` bytes the caller already knows to fit.
  pub fn carve(
    region: NonNull<Region>,
    size: usize,
  ) -> NonNull<u8> {
    let header = unsafe { &mut *region.as_ptr() };
    debug_assert!(size <= header.remaining);

    let address = unsafe { region.cast::<u8>().add(HEADER_SIZE + header.used) };
    header.used += size;
    header.remaining -= size;

    address
  }

  pub fn clear(
    &mut self,
  ) {
    self.used = 0;
    self.remaining = self.capacity;
  }
}

/// Point-in-time copy of one region's header, as seen by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionInfo {
  /// Position in the chain, 0 being the head.
  pub index: usize,
  /// Address of the region header (start of the mapping).
  pub address: usize,
  /// Address of the next region header, `None` for the tail.
  pub next: Option<usize>,
  /// Address of the first storage byte.
  pub storage: usize,
  pub capacity: usize,
  pub used: usize,
  pub remaining: usize,
}

impl RegionInfo {
  pub(crate) fn snapshot(
    index: usize,
    region: NonNull<Region>,
  ) -> Self {
    let header = unsafe { region.as_ref() };

    Self {
      index,
      address: region.as_ptr() as usize,
      next: header.next.map(|next| next.as_ptr() as usize),
      storage: Region::storage(region) as usize,
      capacity: header.capacity,
      used: header.used,
      remaining: header.remaining,
    }
  }

  /// Total bytes mapped for this region, header included.
  pub fn mapping_size(
    &self,
  ) -> usize {
    HEADER_SIZE + self.capacity
  }

  /// Whether `address` falls inside this region's storage.
  pub fn contains(
    &self,
    address: *const u8,
  ) -> bool {
    let address = address as usize;
    address >= self.storage && address < self.storage + self.capacity
  }
}

impl fmt::Display for RegionInfo {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    writeln!(f, "Address:    {:#x}", self.address)?;
    match self.next {
      Some(next) => writeln!(f, "Next:       {:#x}", next)?,
      None => writeln!(f, "Next:       none")?,
    }
    writeln!(f, "Capacity:   {} bytes", self.capacity)?;
    writeln!(f, "Used:       {} bytes", self.used)?;
    writeln!(f, "Free:       {} bytes", self.remaining)
  }
}
