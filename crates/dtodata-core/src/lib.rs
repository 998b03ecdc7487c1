#![forbid(unsafe_code)]
//! dtodata-core: settings, column descriptors, inbound table request types,
//! identifiers, and the shared error type.
//!
//! Pure data and validation. The query grammar lives in `dtodata-query`,
//! the network seam and response shaping in `dtodata-exec`.

pub mod column;
pub mod config;
pub mod error;
pub mod id;
pub mod prelude;
pub mod request;

pub use error::{Error, Result};
