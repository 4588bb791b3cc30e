//! Cross-platform utilities shared by the engines.
//!
//! - [`fs`] - file system operations with atomic writes and recursive copy

pub mod fs;

pub use fs::{atomic_write, copy_dir, ensure_dir, read_text_file, remove_dir_if_empty,
    write_json_document};
