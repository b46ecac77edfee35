//! Structure
//!
//! Indentation-driven views over a list of lines. Nothing here owns storage: blocks
//! and fields are recomputed from the current lines whenever they are needed, so any
//! insertion invalidates previously computed extents below the insertion point.
//!
//! The layers build on each other:
//! 1. indentation: depth and classification of a single line
//! 2. block: extent of the block rooted at a line
//! 3. query: fields at a block's parameter depth
//! 4. inject: deterministic insertion of a new field
//!
//! All functions are generic over `S: AsRef<str>` so they work on `&[String]` as
//! well as on `&[&str]` fixtures.

pub mod block;
pub mod indentation;
pub mod inject;
pub mod query;

pub use block::{enclosing_start, extent_of, Extent};
pub use indentation::{classify, depth_of, inline_value, key_of, LineClass};
pub use inject::{inject_field, insertion_index, render_field, Anchors};
pub use query::{field_value, fields, has_field, param_depth, Field};
