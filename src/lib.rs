//! Lupa decodes a JVM `.class` file into a structured, immutable model and
//! re-serializes it as a human-oriented JSON document in which every
//! constant-pool index is inlined next to the entry it resolves to.
//!
//! The crate is a pure library: no I/O, no threads, no state beyond the call.
//! Feed it bytes, get back either a [`Classfile`] to traverse or, through
//! [`inspect`], the finished JSON text.
//!
//! ```no_run
//! let bytes = std::fs::read("HelloWorld.class").unwrap();
//! let document = lupa::inspect(&bytes).unwrap();
//! println!("{document}");
//! ```

pub mod classfile;
pub mod json;

pub use classfile::{Classfile, ClassfileError};

use bumpalo::Bump;

/// Parses `bytes` as a class file and renders the resolving JSON document,
/// pretty-printed with a two-space indent.
pub fn inspect(bytes: &[u8]) -> Result<String, ClassfileError> {
    let arena = Bump::new();
    let classfile = Classfile::new(bytes, &arena)?;
    let document = json::render(&classfile);

    Ok(serde_json::to_string_pretty(&document)?)
}
