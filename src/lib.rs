//! # regionalloc - A Region-Based Arena Allocator
//!
//! This crate provides a **region allocator**: a bump allocator that carves
//! allocations out of large, page-aligned regions mapped straight from the OS
//! with `mmap(2)`, and that only gives memory back in bulk.
//!
//! ## Overview
//!
//! ```text
//!   Arena Layout:
//!
//!     head                                                  tail
//!      │                                                     │
//!      ▼                                                     ▼
//!   ┌────────┬───────────────────┐   ┌────────┬──────────────────────────┐
//!   │ header │ A1 │ A2 │  free   │──▶│ header │ A3        │    free      │──▶ none
//!   └────────┴───────────────────┘   └────────┴──────────────────────────┘
//!       Region 0 (2 pages)               Region 1 (sized for A3)
//!
//!   Allocation walks the chain from the head and bumps the first region
//!   with enough room. When none fits, a new region is mapped and appended.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   regionalloc
//!   ├── align      - Page rounding (align_to!, align_size)
//!   ├── arena      - Arena: region chain, first-fit allocation, grow, reset, destroy
//!   ├── config     - ArenaConfig: page size and default region capacity
//!   ├── error      - ArenaError and ArenaResult
//!   └── region     - Region header, mmap/munmap lifecycle, RegionInfo snapshots
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use regionalloc::Arena;
//!
//! let mut arena = Arena::new();
//! arena.init(0).expect("failed to map the first region");
//!
//! let numbers = arena.alloc(10 * size_of::<u32>()).unwrap().as_ptr() as *mut u32;
//! unsafe {
//!   for i in 0..10 {
//!     numbers.add(i).write_unaligned((i * i) as u32);
//!   }
//!   assert_eq!(numbers.add(3).read_unaligned(), 9);
//! }
//!
//! arena.dump(&mut std::io::stdout()).unwrap();
//! arena.destroy().unwrap();
//! ```
//!
//! ## How It Works
//!
//! Every region is a single anonymous mapping. Its bookkeeping header sits at
//! the start of the mapping and the usable storage follows it:
//!
//! ```text
//!   Single Region:
//!   ┌───────────────────────┬──────────────────────────────────────┐
//!   │    Region Header      │            Storage                   │
//!   │  ┌─────────────────┐  │  ┌────────────┬───────────────────┐  │
//!   │  │ next: ptr/none  │  │  │  used      │    remaining      │  │
//!   │  │ capacity: N     │  │  │            │                   │  │
//!   │  │ used            │  │  └────────────┴───────────────────┘  │
//!   │  │ remaining       │  │               ▲                      │
//!   │  └─────────────────┘  │               └── next allocation    │
//!   └───────────────────────┴──────────────────────────────────────┘
//!   │◀──────────── header + N, a whole number of pages ──────────▶│
//! ```
//!
//! Regions created for small requests span `default_region_capacity` bytes
//! (two pages unless configured otherwise). Larger requests get a region
//! rounded up to the next page boundary.
//!
//! ## Reclamation
//!
//! - [`Arena::reset`] marks every region empty but keeps the mappings.
//! - [`Arena::destroy`] unmaps every region; the arena must be initialized
//!   again before reuse. Dropping an arena destroys it.
//! - [`Arena::grow`] never frees: the old block stays orphaned until the
//!   next reset or destroy.
//!
//! ## Limitations
//!
//! - **Single-threaded only**: `Arena` is neither `Send` nor `Sync`
//! - **No individual free**: memory only comes back in bulk
//! - **Byte alignment**: allocations are packed back to back; only region
//!   starts are page aligned
//! - **Unix-only**: requires `libc`, `mmap` and `munmap`
//!
//! ## Safety
//!
//! Allocation itself is safe, but the arena hands out raw addresses. Reading
//! or writing through them is `unsafe`, and they dangle after a reset,
//! destroy or drop.

pub mod align;
mod arena;
mod config;
mod error;
mod region;

pub use arena::{Arena, Regions};
pub use config::ArenaConfig;
pub use error::{ArenaError, ArenaResult};
pub use region::{HEADER_SIZE, RegionInfo};
