use crate::{
  error::{ArenaError, ArenaResult},
  region::HEADER_SIZE,
};

/// Sizing parameters shared by every region of one arena.
///
/// The page size is resolved once and carried here, so that all sizing
/// decisions of an arena agree with each other and can be exercised in tests
/// without depending on the live OS value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaConfig {
  /// Mapping granularity. Every region mapping is a multiple of it.
  pub page_size: usize,
  /// Mapping size, header included, of regions created for small requests.
  pub default_region_capacity: usize,
}

impl ArenaConfig {
  /// Configuration with the given page size and the default region capacity
  /// of two pages.
  pub const fn new(
    page_size: usize,
  ) -> Self {
    Self {
      page_size,
      default_region_capacity: page_size.saturating_mul(2),
    }
  }

  /// Queries the OS page size through `sysconf`.
  pub fn from_os() -> Self {
    Self::new(os_page_size())
  }

  pub const fn with_default_region_capacity(
    mut self,
    bytes: usize,
  ) -> Self {
    self.default_region_capacity = bytes;
    self
  }

  /// Usable bytes of a default sized region, 0 when the capacity cannot
  /// even hold the header.
  pub const fn default_usable_capacity(
    &self,
  ) -> usize {
    self.default_region_capacity.saturating_sub(HEADER_SIZE)
  }

  pub fn validate(
    &self,
  ) -> ArenaResult<()> {
    if self.page_size == 0 || !self.page_size.is_power_of_two() {
      return Err(ArenaError::InvalidConfig(format!(
        "page size {} is not a power of two",
        self.page_size
      )));
    }

    if self.page_size <= HEADER_SIZE {
      return Err(ArenaError::InvalidConfig(format!(
        "page size {} cannot hold the {} byte region header",
        self.page_size, HEADER_SIZE
      )));
    }

    if self.default_region_capacity % self.page_size != 0 {
      return Err(ArenaError::InvalidConfig(format!(
        "default region capacity {} is not a multiple of the page size {}",
        self.default_region_capacity, self.page_size
      )));
    }

    if self.default_region_capacity <= HEADER_SIZE {
      return Err(ArenaError::InvalidConfig(format!(
        "default region capacity {} leaves no room after the header",
        self.default_region_capacity
      )));
    }

    Ok(())
  }
}

impl Default for ArenaConfig {
  fn default() -> Self {
    Self::from_os()
  }
}

fn os_page_size() -> usize {
  let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };

  // sysconf reports -1 when the value is indeterminate.
  if size <= 0 { 4096 } else { size as usize }
}
