//! Browse javadoc archives published to Maven repositories.
//!
//! Archives are downloaded from the first mirror that has them, cached on
//! disk forever, and served entry by entry straight out of the jar.

pub mod archive;
pub mod cache;
pub mod config;
pub mod coordinate;
pub mod error;
pub mod fetcher;
pub mod mirrors;
pub mod remote;
pub mod resolver;
pub mod server;
pub mod service;

pub use config::DocsConfig;
pub use coordinate::{ArchiveLayout, Coordinate};
pub use error::{DocsError, Result};
pub use service::DocService;
