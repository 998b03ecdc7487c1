#![forbid(unsafe_code)]
//! dtodata-exec: bound table instances, the host-owned registry, the
//! transport seam, and response normalization.
//!
//! A fetch is one synchronous round trip: snapshot the table request, build
//! the query, call the transport, normalize the envelope. Failures never
//! escape `fetch`; they come back as an error-shaped `TableResult`.

pub mod instance;
pub mod metrics;
pub mod normalize;
pub mod registry;
pub mod transport;

pub use instance::{Callback, Instance};
pub use normalize::{normalize, Envelope, RowMode, TableResult, NO_DATA_MESSAGE};
pub use registry::InstanceRegistry;
pub use transport::{MemoryTransport, Transport, TransportError, TransportResponse};

#[cfg(feature = "http")]
pub use transport::HttpTransport;
