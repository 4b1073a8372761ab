//! Resource abstraction layer
//!
//! Maps Admin API objects onto a tree of typed [`Node`]s. Endpoints are
//! derived from the parent chain, list endpoints are paginated lazily, and
//! every owner keeps a cache of the children it has seen.
//!
//! # Architecture
//!
//! - [`registry`] - Static descriptors: fields and children of every type
//! - [`node`] - The resource node: addressing, save/pull/delete, equality
//! - [`children`] - Generic child accessors and the per-pair method generator
//! - [`fetcher`] - Pagination over `{"data": [...], "next": ...}` responses
//! - [`types`] - One record per resource type
//!
//! # Example
//!
//! ```ignore
//! use futures::TryStreamExt;
//! use inpanzee::{Gateway, Route, Service};
//!
//! async fn example() -> inpanzee::Result<()> {
//!     let kong = Gateway::new("http", "localhost", 8001)?;
//!
//!     let service = kong.add_service(Service::from_url("http://mockbin.org/request")?);
//!     service.save(false).await?;
//!
//!     let route = service.add_route(Route {
//!         paths: Some(vec!["/mock".to_string()]),
//!         ..Default::default()
//!     });
//!     route.save(false).await?;
//!
//!     let services: Vec<_> = kong.list_services()?.try_collect().await?;
//!     Ok(())
//! }
//! ```

mod actions;
pub mod children;
pub mod fetcher;
pub mod node;
pub mod registry;
pub mod types;

pub use children::{ChildOf, NodeStream};
pub use fetcher::{paginate, Page};
pub use node::{ChildCache, Entity, Node};
pub use registry::{get_descriptor, get_registry, pluralize, Descriptor};
pub use types::*;
