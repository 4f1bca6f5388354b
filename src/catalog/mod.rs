//! Catalog collaborator: stream-metadata and release-metadata endpoints.

mod client;
mod types;

pub use client::{CatalogClient, StreamRequest};
pub use types::*;
