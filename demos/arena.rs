use std::{error::Error, io, ptr};

use regionalloc::Arena;

fn main() -> Result<(), Box<dyn Error>> {
  // RUST_LOG=debug shows regions being mapped and unmapped.
  env_logger::init();

  let mut arena = Arena::new();
  let default_capacity = arena.config().default_region_capacity;
  arena.init(default_capacity)?;

  // --------------------------------------------------------------------
  // 1) Ten u32 values and a short string, packed into the first region.
  // --------------------------------------------------------------------
  let numbers = arena.alloc(10 * size_of::<u32>())?.as_ptr() as *mut u32;
  let text = "Hello from the arena allocator!";
  let block = arena.alloc(100)?;
  let string = block.as_ptr();

  unsafe {
    for i in 0..10 {
      numbers.add(i).write_unaligned((i * i) as u32);
    }
    ptr::copy_nonoverlapping(text.as_ptr(), string, text.len());

    print!("Numbers: ");
    for i in 0..10 {
      print!("{} ", numbers.add(i).read_unaligned());
    }
    let bytes = std::slice::from_raw_parts(string, text.len());
    println!("\nString: {}", String::from_utf8_lossy(bytes));
  }

  // --------------------------------------------------------------------
  // 2) A request larger than the default capacity maps a second region.
  // --------------------------------------------------------------------
  arena.alloc(default_capacity * 2)?;

  // --------------------------------------------------------------------
  // 3) Grow the string block. The old 100 bytes stay orphaned.
  // --------------------------------------------------------------------
  let string = unsafe { arena.grow(block, 100, 200)? };
  let bytes = unsafe { std::slice::from_raw_parts(string.as_ptr(), text.len()) };
  println!("Grown string: {}", String::from_utf8_lossy(bytes));

  arena.dump(&mut io::stdout())?;

  // --------------------------------------------------------------------
  // 4) Release every region at once.
  // --------------------------------------------------------------------
  arena.destroy()?;

  Ok(())
}
