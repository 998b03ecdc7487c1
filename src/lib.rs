//! dtodata: drive a server-side-processing data table from an OData service.
//!
//! Facade over the workspace crates:
//! - `dtodata_core`: settings, column descriptors, table request types, errors
//! - `dtodata_query`: operator translation, search grammar, query building
//! - `dtodata_exec`: table instances, registry, transports, result normalization

#![forbid(unsafe_code)]

pub use dtodata_core;
pub use dtodata_exec;
pub use dtodata_query;

pub use dtodata_core::{Error, Result};
pub use dtodata_exec::{Instance, InstanceRegistry, TableResult, Transport};
