use crate::region::HEADER_SIZE;

/// Rounds `value` up to the next multiple of `granularity`.
///
/// `granularity` must be a power of two, and `value + granularity - 1` must
/// not overflow.
///
/// # Examples
///
/// ```rust
/// use regionalloc::align_to;
///
/// assert_eq!(align_to!(1, 4096), 4096);
/// assert_eq!(align_to!(4096, 4096), 4096);
/// assert_eq!(align_to!(4097, 4096), 8192);
/// ```
#[macro_export]
macro_rules! align_to {
  ($value:expr, $granularity:expr) => {
    ($value + $granularity - 1) & !($granularity - 1)
  };
}

/// Total mapping size for a region whose storage must hold `size` bytes:
/// the header plus `size`, rounded up to whole pages.
///
/// `page_size` must be a non-zero power of two. Returns `None` when the
/// rounding would overflow `usize`.
pub fn align_size(
  size: usize,
  page_size: usize,
) -> Option<usize> {
  let total = HEADER_SIZE.checked_add(size)?;
  total.checked_add(page_size - 1)?;

  Some(align_to!(total, page_size))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_align_to() {
    let page = 4096;

    for i in 0..10 {
      let sizes = (page * i + 1)..=(page * (i + 1));
      let expected = page * (i + 1);

      for size in sizes.step_by(97) {
        assert_eq!(expected, align_to!(size, page));
      }
      assert_eq!(expected, align_to!(page * (i + 1), page));
    }
  }

  #[test]
  fn test_align_size_includes_header() {
    assert_eq!(align_size(0, 4096), Some(4096));
    assert_eq!(align_size(4096 - HEADER_SIZE, 4096), Some(4096));
    assert_eq!(align_size(4096 - HEADER_SIZE + 1, 4096), Some(8192));
    assert_eq!(align_size(10_000, 16384), Some(16384));
  }

  #[test]
  fn test_align_size_is_smallest_multiple() {
    for page in [512usize, 4096, 16384, 65536] {
      for size in [0usize, 1, 31, 100, 4000, 70_000, 1 << 20] {
        let aligned = align_size(size, page).unwrap();
        assert_eq!(aligned % page, 0);
        assert!(aligned >= HEADER_SIZE + size);
        assert!(aligned - page < HEADER_SIZE + size);
      }
    }
  }

  #[test]
  fn test_align_size_overflow() {
    assert_eq!(align_size(usize::MAX, 4096), None);
    assert_eq!(align_size(usize::MAX - HEADER_SIZE, 4096), None);
  }
}
