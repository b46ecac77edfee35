//! # blockfix-engine
//!
//! A structural block editor for indentation-delimited configuration documents
//! (Ansible task files being the motivating case).
//!
//! The engine never parses the document grammar. It reads a document as an ordered
//! list of lines and infers structure purely from leading whitespace:
//!
//!     - name: Create the data directory        <- block start (list item)
//!       ansible.builtin.file:                  <- block start (module key)
//!         path: /srv/data                      <- field at parameter depth
//!         state: directory
//!       when: data_enabled                     <- sibling of the module key
//!
//! File Layout
//!
//!     src
//!     ├── document.rs        Document: lines + line ending + final newline
//!     ├── structure          Indentation model, block scanner, field query/injector
//!     ├── rules              Rule traits and the generic rule kinds
//!     ├── pass.rs            Document pass runner
//!     └── catalog            Built-in rule sets and the RuleRegistry
//!
//! Every edit is scoped to a block and every rule set is idempotent: running a
//! pass over its own output reports no change.

pub mod catalog;
pub mod document;
pub mod error;
pub mod pass;
pub mod rules;
pub mod structure;

pub use catalog::{RuleOptions, RuleRegistry};
pub use document::{Document, LineEnding};
pub use error::{EncodingError, PassError, RegistryError, StructuralError};
pub use pass::{apply_pass, apply_sets, Applied, PassOutcome};
pub use rules::{PathScope, Rule, RuleSet};
