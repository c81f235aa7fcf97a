//! # Pilum
//!
//! A boolean-expression retrieval index for targeting and rule matching.
//!
//! Documents describe targeting rules as conjunctions of `IN` / `NOT IN`
//! predicates over named fields; queries describe a live context as a
//! field→values assignment; retrieval returns every document whose rule
//! matches. Posting lists follow the K-Groups layout of the Indexing
//! Boolean Expressions paper, walked by a skip-to-frontier multi-cursor
//! algorithm.
//!
//! ## Features
//!
//! - Build-once, read-many: the built index is immutable and queryable from
//!   any number of threads
//! - Pluggable value parsers and posting-list holders, selected per field
//! - Exclusion (`NOT IN`) semantics and wildcard (always-on) rules
//! - Optional build cache replaying parsed conjunctions across rebuilds
//!
//! ## Example
//!
//! ```
//! use pilum::document::{Assignment, Conjunction, Document, int_values, str_values};
//! use pilum::index::{BEIndex, IndexerBuilder};
//!
//! # fn main() -> pilum::error::Result<()> {
//! let mut builder = IndexerBuilder::new();
//! builder.add_document(
//!     &Document::new(1).with_conjunction(
//!         Conjunction::new()
//!             .include("age", int_values([18, 19, 20]))
//!             .exclude("city", str_values(["bj"])),
//!     ),
//! )?;
//! let index = builder.build_index()?;
//!
//! let mut assigns = Assignment::new();
//! assigns.insert("age".to_string(), int_values([19]));
//! assert_eq!(index.retrieve(&assigns)?, vec![1]);
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod error;
pub mod index;
pub mod parser;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
