//! Data directory layout and file helpers shared by the insights crates

mod io;
mod paths;

pub use io::{append_jsonl, atomic_write, read_jsonl};
pub use paths::{Paths, HOME_ENV};
