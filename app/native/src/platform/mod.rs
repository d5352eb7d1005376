//! Platform helpers: path expansion, named threads, interrupts, file manager integration.

pub mod interrupt;
pub mod path;
pub mod reveal;
pub mod thread;

pub use interrupt::{Interrupted, on_interrupt};
pub use reveal::reveal_in_file_manager;
pub use thread::spawn_named_thread;
