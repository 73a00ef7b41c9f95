//! Key indexing: dense positions for sparse ids, and name interning.
//!
//! # Quick Start
//!
//! ```
//! use mfkit::index::KeyIndexBuilder;
//!
//! let mut users = KeyIndexBuilder::new();
//! assert_eq!(users.intern(1001), 0);
//! assert_eq!(users.intern(1002), 1);
//! assert_eq!(users.intern(1001), 0);
//!
//! let users = users.build();
//! assert_eq!(users.id_at(1).expect("in range"), 1002);
//! ```

mod keys;
mod symbol;

pub use keys::{KeyIndex, KeyIndexBuilder};
pub use symbol::{Symbol, SymbolTable};
