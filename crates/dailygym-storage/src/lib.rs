//! Daily English Gym Storage - path resolution and scoped file access
//!
//! Every path handed to the file primitives comes out of [`LogRoot`], which
//! normalizes it and refuses anything that would land outside the log root.

mod files;
mod paths;

pub use files::{
    append_text, exists, list_files, list_month_dirs, read_bytes, read_text, write_bytes,
    write_text,
};
pub use paths::{AudioKind, LogRoot};
