//! Driftwave connector: search and URL content extraction as a plug-in
//! component for a workflow-automation host.
//!
//! - Parameter catalog (`catalog`) the host renders as its config surface
//! - One-pass structural validation (`schema`) for options and responses
//! - Request shaping per operation (`search`, `contents`)
//! - Per-item batch execution with error isolation (`runner`)
//! - Transport seam (`transport`) over the shared HTTP client
//!
//! The host owns credential storage, parameter collection, and the outer
//! execution loop; this crate owns everything between "here are the raw
//! item parameters" and "here is a validated result or a classified,
//! index-correlated error".

pub mod catalog;
pub mod contents;
pub mod runner;
pub mod schema;
pub mod search;
pub mod transport;

pub use runner::{BatchError, ExecutionItem, ItemError, ItemRecord, Payload, run_batch};
pub use transport::{ApiTransport, Transport};
