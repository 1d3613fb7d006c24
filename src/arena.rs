use std::{
  io::{self, Write},
  marker::PhantomData,
  ptr::{self, NonNull},
};

use log::{error, info, trace};

use crate::{
  align::align_size,
  config::ArenaConfig,
  error::{ArenaError, ArenaResult},
  region::{Region, RegionInfo},
};

/// Bump allocator over a chain of OS mapped regions.
///
/// Allocations are served first-fit from the oldest region onwards. When no
/// region has room, a new one is mapped and appended after the tail. Memory
/// only comes back through [`Arena::reset`], [`Arena::destroy`] or drop.
///
/// The arena hands out raw addresses. They stay valid until the next reset,
/// destroy or drop; dereferencing them is up to the caller.
pub struct Arena {
  head: Option<NonNull<Region>>,
  tail: Option<NonNull<Region>>,
  config: ArenaConfig,
}

impl Arena {
  /// Uninitialized arena sized after the OS page size.
  pub fn new() -> Self {
    Self {
      head: None,
      tail: None,
      config: ArenaConfig::from_os(),
    }
  }

  pub fn with_config(
    config: ArenaConfig,
  ) -> ArenaResult<Self> {
    config.validate()?;

    Ok(Self {
      head: None,
      tail: None,
      config,
    })
  }

  pub fn config(
    &self,
  ) -> &ArenaConfig {
    &self.config
  }

  pub fn is_initialized(
    &self,
  ) -> bool {
    self.head.is_some()
  }

  /// Maps the first region, large enough to hold `size` bytes and never
  /// smaller than the default region capacity.
  pub fn init(
    &mut self,
    size: usize,
  ) -> ArenaResult<()> {
    if self.is_initialized() {
      return Err(ArenaError::AlreadyInitialized);
    }

    let region = Region::create(self.region_size_for(size)?)?;
    self.head = Some(region);
    self.tail = Some(region);

    info!(
      "arena initialized with {} usable bytes",
      unsafe { region.as_ref() }.capacity
    );
    Ok(())
  }

  /// Hands out `size` bytes from the first region that can hold them,
  /// appending a new region when none can.
  pub fn alloc(
    &mut self,
    size: usize,
  ) -> ArenaResult<NonNull<u8>> {
    if !self.is_initialized() {
      return Err(ArenaError::Uninitialized);
    }

    if let Some(address) = self.find_fit(size) {
      return Ok(address);
    }

    let region = self.append_region(size)?;
    trace!("grew arena to fit {} bytes", size);

    // The fresh region is sized for `size`, so the carve always fits.
    Ok(Region::carve(region, size))
  }

  /// Best-effort resize of a block previously returned by this arena.
  ///
  /// Shrinking hands `old` back untouched. Growing allocates a fresh block of
  /// `new_size` bytes and copies the first `old_size` bytes over; the old block
  /// stays counted as used until the arena is reset or destroyed.
  ///
  /// # Safety
  ///
  /// `old` must be valid for reads of `old_size` bytes and must not overlap
  /// the block allocated for `new_size`. Blocks handed out before the last
  /// reset break that second condition, since their bytes are up for reuse.
  pub unsafe fn grow(
    &mut self,
    old: NonNull<u8>,
    old_size: usize,
    new_size: usize,
  ) -> ArenaResult<NonNull<u8>> {
    if new_size < old_size {
      return Ok(old);
    }

    let new = self.alloc(new_size)?;
    unsafe { ptr::copy_nonoverlapping(old.as_ptr(), new.as_ptr(), old_size) };

    Ok(new)
  }

  /// Marks every region empty without giving any memory back to the OS.
  pub fn reset(
    &mut self,
  ) {
    let mut current = self.head;

    while let Some(region) = current {
      let header = unsafe { &mut *region.as_ptr() };
      header.clear();
      current = header.next;
    }

    info!("arena reset, {} bytes reusable", self.total_capacity());
  }

  /// Unmaps every region and returns the arena to its uninitialized state.
  ///
  /// All regions are released even when one of them fails; the first failure
  /// is reported. Calling this on an uninitialized arena does nothing.
  pub fn destroy(
    &mut self,
  ) -> ArenaResult<()> {
    let mut current = self.head.take();
    self.tail = None;

    let mut released = 0;
    let mut first_error = None;

    while let Some(region) = current {
      current = unsafe { region.as_ref() }.next;

      match unsafe { Region::destroy(region) } {
        Ok(()) => released += 1,
        Err(err) => {
          first_error.get_or_insert(err);
        }
      }
    }

    if released > 0 {
      info!("arena destroyed, released {} regions", released);
    }

    match first_error {
      Some(err) => Err(err),
      None => Ok(()),
    }
  }

  /// Writes a human-readable report of every region to `out`.
  pub fn dump<W: Write>(
    &self,
    out: &mut W,
  ) -> io::Result<()> {
    writeln!(out, "=============================")?;
    for region in self.regions() {
      writeln!(out, "===> Region {}:", region.index)?;
      writeln!(out, "{}", region)?;
    }
    writeln!(out, "=============================")?;
    writeln!(out)
  }

  /// Snapshots of the chain, head to tail.
  pub fn regions(
    &self,
  ) -> Regions<'_> {
    Regions {
      current: self.head,
      index: 0,
      _arena: PhantomData,
    }
  }

  pub fn head(
    &self,
  ) -> Option<RegionInfo> {
    self.head.map(|region| RegionInfo::snapshot(0, region))
  }

  pub fn tail(
    &self,
  ) -> Option<RegionInfo> {
    let index = self.region_count().saturating_sub(1);
    self.tail.map(|region| RegionInfo::snapshot(index, region))
  }

  pub fn region_count(
    &self,
  ) -> usize {
    self.regions().count()
  }

  /// Usable bytes across all regions.
  pub fn total_capacity(
    &self,
  ) -> usize {
    self.regions().map(|region| region.capacity).sum()
  }

  pub fn total_used(
    &self,
  ) -> usize {
    self.regions().map(|region| region.used).sum()
  }

  fn region_size_for(
    &self,
    size: usize,
  ) -> ArenaResult<usize> {
    let aligned = align_size(size, self.config.page_size)
      .ok_or(ArenaError::SizeOverflow { requested: size })?;

    Ok(aligned.max(self.config.default_region_capacity))
  }

  fn find_fit(
    &mut self,
    size: usize,
  ) -> Option<NonNull<u8>> {
    let mut current = self.head;
    let mut index = 0;

    while let Some(region) = current {
      if let Some(address) = Region::bump(region, size) {
        trace!("first fit for {} bytes in region {}", size, index);
        return Some(address);
      }
      current = unsafe { region.as_ref() }.next;
      index += 1;
    }

    None
  }

  /// Maps a region for `size` bytes and links it after the tail. The chain is
  /// only touched once the mapping succeeded.
  fn append_region(
    &mut self,
    size: usize,
  ) -> ArenaResult<NonNull<Region>> {
    let tail = self.tail.ok_or(ArenaError::Uninitialized)?;
    let region = Region::create(self.region_size_for(size)?)?;

    unsafe { (*tail.as_ptr()).next = Some(region) };
    self.tail = Some(region);

    Ok(region)
  }
}

impl Default for Arena {
  fn default() -> Self {
    Self::new()
  }
}

impl Drop for Arena {
  fn drop(
    &mut self,
  ) {
    if let Err(err) = self.destroy() {
      error!("failed to release arena regions on drop: {}", err);
    }
  }
}

/// Iterator over [`RegionInfo`] snapshots, returned by [`Arena::regions`].
pub struct Regions<'a> {
  current: Option<NonNull<Region>>,
  index: usize,
  _arena: PhantomData<&'a Arena>,
}

impl Iterator for Regions<'_> {
  type Item = RegionInfo;

  fn next(
    &mut self,
  ) -> Option<Self::Item> {
    let region = self.current?;
    let info = RegionInfo::snapshot(self.index, region);

    self.current = unsafe { region.as_ref() }.next;
    self.index += 1;

    Some(info)
  }
}
