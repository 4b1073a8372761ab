//! Client SDK for the Kong gateway Admin API
//!
//! A [`Gateway`] is the root of an object tree mirroring the Admin API:
//! services own routes, upstreams own targets, and consumers, plugins, SNIs
//! and certificates hang off the root. Each [`Node`] saves, pulls and
//! deletes itself against an endpoint derived from its parent chain.

pub mod config;
pub mod error;
pub mod gateway;
pub mod resource;

pub use error::{Error, ErrorDetails, Result};
pub use gateway::client::Gateway;
pub use gateway::http::HttpTransport;
pub use gateway::url::{compose, decompose, UrlParts};
pub use resource::{
    Certificate, ChildOf, Consumer, Entity, Node, NodeStream, Plugin, Route, Service, Sni, Target,
    Upstream,
};
