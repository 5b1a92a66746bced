//! Configuration source abstraction.
//!
//! Every backend kind implements [`ConfigSource`], which is what lets the
//! composite merge heterogeneous backends generically.

mod query;
mod snapshot;
mod traits;

pub use query::ConfigQuery;
pub use snapshot::ConfigSnapshot;
pub use traits::ConfigSource;
