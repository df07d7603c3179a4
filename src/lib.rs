//! # Sieve
//!
//! Typed entity filters from a compact micro-syntax.
//!
//! Sieve provides:
//! - A filter-string syntax (`">18,<65"`, `"~smith"`, `"!draft"`, `"ISNULL"`)
//! - Entity and enum registration macros
//! - Compilation to in-memory predicates or to expressions for a query translator
//! - Locale-aware number and natural-language date parsing
//! - Serde and query-string wire formats
//!
//! ## Quick Start
//!
//! ```rust
//! use sieve::prelude::*;
//!
//! pub struct Book {
//!     pub title: String,
//!     pub pages: u32,
//! }
//!
//! filterable! {
//!     Book {
//!         title: String,
//!         pages: u32,
//!     }
//! }
//!
//! let filter = entity_filter!(Book { title: "rust", pages: ">100" }).unwrap();
//! let books = vec![
//!     Book { title: "Programming Rust".into(), pages: 700 },
//!     Book { title: "Rust in a Nutshell".into(), pages: 80 },
//! ];
//! let found: Vec<&Book> = filter
//!     .apply(&FilterContext::default(), books.iter())
//!     .unwrap()
//!     .collect();
//! assert_eq!(found.len(), 1);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]

pub use sieve_query::*;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use sieve_query::prelude::*;
}
