//! Showtape-Common: shared catalog types and the pipeline error taxonomy.
//!
//! This crate provides the types every other showtape crate agrees on:
//!
//! - **Formats**: [`FormatCode`] and [`EncodingCandidate`] for the catalog's audio encodings
//! - **Authorization**: [`StreamParams`], the read-only context sent with every stream request
//! - **Item references**: [`ItemRef`] parsed from catalog URLs
//! - **Path utilities**: filename sanitising and length capping
//! - **Error handling**: [`Error`] and the [`Result`] alias
//!
//! # Examples
//!
//! ```
//! use showtape_common::{FormatCode, ItemRef};
//!
//! let item = ItemRef::parse("https://play.nugs.net/release/23329").unwrap();
//! assert_eq!(item, ItemRef::Release("23329".to_string()));
//!
//! assert_eq!(FormatCode::try_from(3).unwrap(), FormatCode::Mqa24);
//! ```

pub mod error;
pub mod items;
pub mod paths;
pub mod types;

pub use error::{Error, Result};
pub use items::ItemRef;
pub use types::*;
