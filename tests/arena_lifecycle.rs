use pretty_assertions::assert_eq;
use proptest::prelude::*;
use regionalloc::{Arena, ArenaConfig, HEADER_SIZE, RegionInfo};

fn assert_chain(
  arena: &Arena,
) {
  let regions: Vec<RegionInfo> = arena.regions().collect();

  for window in regions.windows(2) {
    assert_eq!(window[0].next, Some(window[1].address));
  }
  for region in &regions {
    assert_eq!(region.used + region.remaining, region.capacity);
  }

  let tail = arena.tail();
  assert_eq!(regions.last().copied(), tail);
  if let Some(tail) = tail {
    assert_eq!(tail.next, None);
  }
}

#[test]
fn end_to_end() {
  let config = ArenaConfig::from_os();
  let mut arena = Arena::with_config(config).unwrap();

  arena.init(64).unwrap();
  assert_eq!(arena.region_count(), 1);
  assert_eq!(
    arena.head().unwrap().capacity,
    config.default_region_capacity - HEADER_SIZE
  );

  let a = arena.alloc(16).unwrap().as_ptr() as usize;
  let b = arena.alloc(32).unwrap().as_ptr() as usize;
  let c = arena.alloc(64).unwrap().as_ptr() as usize;

  assert_eq!(arena.head().unwrap().used, 112);
  assert!(a + 16 <= b);
  assert!(b + 32 <= c);

  let remaining = arena.head().unwrap().remaining;
  let big = arena.alloc(remaining + 1).unwrap();

  assert_eq!(arena.region_count(), 2);
  assert!(arena.tail().unwrap().contains(big.as_ptr()));
  assert!(!arena.head().unwrap().contains(big.as_ptr()));
  assert_chain(&arena);

  arena.reset();
  assert_eq!(arena.alloc(8).unwrap().as_ptr() as usize, a);
  assert_chain(&arena);

  arena.destroy().unwrap();
  assert!(arena.head().is_none());
  assert!(arena.tail().is_none());
  arena.destroy().unwrap();
}

#[test]
fn custom_default_capacity() {
  let page_size = ArenaConfig::from_os().page_size;
  let config = ArenaConfig::new(page_size).with_default_region_capacity(page_size * 4);
  let mut arena = Arena::with_config(config).unwrap();

  arena.init(0).unwrap();
  arena.alloc(arena.head().unwrap().capacity).unwrap();
  arena.alloc(1).unwrap();

  let sizes: Vec<usize> = arena.regions().map(|region| region.mapping_size()).collect();
  assert_eq!(sizes, vec![page_size * 4, page_size * 4]);
}

#[test]
fn drop_releases_regions() {
  let mut arena = Arena::new();
  arena.init(0).unwrap();
  for _ in 0..8 {
    arena.alloc(arena.config().default_region_capacity).unwrap();
  }

  assert_eq!(arena.region_count(), 9);
  drop(arena);
}

#[derive(Debug, Clone)]
enum Op {
  Alloc(usize),
  Grow(usize),
  Reset,
}

fn op() -> impl Strategy<Value = Op> {
  prop_oneof![
    6 => (0usize..20_000).prop_map(Op::Alloc),
    2 => (0usize..20_000).prop_map(Op::Grow),
    1 => Just(Op::Reset),
  ]
}

proptest! {
  #![proptest_config(ProptestConfig::with_cases(64))]

  #[test]
  fn bookkeeping_holds(ops in proptest::collection::vec(op(), 1..40)) {
    let mut arena = Arena::new();
    arena.init(0).unwrap();

    let mut last: Option<(std::ptr::NonNull<u8>, usize)> = None;

    for op in ops {
      let regions_before = arena.region_count();
      let used_before = arena.total_used();

      match op {
        Op::Alloc(size) => {
          let address = arena.alloc(size).unwrap();
          prop_assert_eq!(arena.total_used(), used_before + size);
          prop_assert!(arena.region_count() <= regions_before + 1);
          prop_assert!(arena.regions().any(|region| {
            region.contains(address.as_ptr()) || address.as_ptr() as usize == region.storage + region.capacity
          }), "allocation not within any region");
          last = Some((address, size));
        }
        Op::Grow(new_size) => {
          if let Some((old, old_size)) = last {
            unsafe {
              for i in 0..old_size {
                old.as_ptr().add(i).write(i as u8);
              }
            }

            let new = unsafe { arena.grow(old, old_size, new_size) }.unwrap();
            if new_size < old_size {
              prop_assert_eq!(new, old);
              prop_assert_eq!(arena.total_used(), used_before);
              last = Some((old, old_size));
            } else {
              let copied = unsafe { std::slice::from_raw_parts(new.as_ptr(), old_size) };
              prop_assert!(copied.iter().enumerate().all(|(i, byte)| *byte == i as u8));
              prop_assert_eq!(arena.total_used(), used_before + new_size);
              last = Some((new, new_size));
            }
          }
        }
        Op::Reset => {
          arena.reset();
          prop_assert_eq!(arena.total_used(), 0);
          prop_assert_eq!(arena.region_count(), regions_before);
          last = None;
        }
      }

      assert_chain(&arena);
    }
  }
}
