//! Parsing and rewriting of Makefile-style dependency files ("depfiles"), as
//! written by compilers when passed `-MD`, `-MMD`, `-MF` and friends.
//!
//! The [`depfile`] module tokenizes depfiles into targets and prerequisites,
//! and [`rewrite`] makes absolute prerequisite paths under a base directory
//! relative, so that cached compilation results do not depend on where the
//! source tree happens to live.

mod config;
pub mod depfile;
mod error;
mod io;
mod normalize;
pub mod rewrite;

pub use config::*;
pub use depfile::{escape_filename, tokenize};
pub use error::*;
pub use io::*;
pub use normalize::*;
pub use rewrite::rewrite_source_paths;

pub use depfix_fs::{Absolute, RelativePathContext};
