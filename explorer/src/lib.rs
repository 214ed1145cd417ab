//! Client side of the catalog: resolves the active filter dimension from a
//! set of mutually exclusive inputs and drives paginated requests for it.

pub mod client;
pub mod context;
pub mod errors;
pub mod selector;

pub use client::{CatalogClient, PageSource};
pub use context::{ContextKind, QueryContext, QueryInputs};
pub use errors::ExplorerError;
pub use selector::{PageTicket, QueryView, UnifiedQuery};
