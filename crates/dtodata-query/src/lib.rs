#![forbid(unsafe_code)]
//! dtodata-query: table state → OData query string.
//!
//! - `operators`: UI comparison tokens ↔ canonical OData operators
//! - `value`: literal rendering by declared column type
//! - `search`: per-column search grammar (`age>=21 and age<65`)
//! - `builder`: fixed-order `$count/$format/$select/$orderby/$top/$skip/$filter`
//!
//! Everything here is pure and synchronous; the network lives in `dtodata-exec`.

pub mod builder;
pub mod operators;
pub mod search;
pub mod value;

pub use builder::{ODataQuery, QueryBuilder};
pub use operators::{Operator, OperatorMap, OperatorMatch};
pub use search::{column_clause, transform_search, Combinator};
pub use value::format_value;
