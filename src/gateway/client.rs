//! Gateway Client
//!
//! The root of the resource tree: holds the Admin API address and the shared
//! HTTP transport, and owns the top-level resources.

use super::http::HttpTransport;
use super::url;
use crate::error::Result;
use crate::resource::node::{ChildCache, ParentNode};
use serde_json::Value;
use std::sync::{Arc, Weak};

/// State every node carries: the shared transport and a way back to the root
#[derive(Clone, Debug)]
pub(crate) struct Context {
    pub(crate) transport: HttpTransport,
    root: Weak<GatewayInner>,
    base_url: Arc<str>,
}

impl Context {
    /// Base address of the gateway, without a trailing slash
    pub(crate) fn base_url(&self) -> String {
        self.base_url.to_string()
    }

    /// The gateway this resource belongs to, if it is still alive
    pub(crate) fn gateway(&self) -> Option<Gateway> {
        self.root.upgrade().map(|inner| Gateway { inner })
    }
}

pub(crate) struct GatewayInner {
    pub(crate) context: Context,
    base_url: String,
    pub(crate) children: ChildCache,
}

impl std::fmt::Debug for GatewayInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayInner")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ParentNode for GatewayInner {
    fn detail_endpoint(&self) -> Result<String> {
        Ok(self.base_url.clone())
    }

    fn children(&self) -> &ChildCache {
        &self.children
    }
}

/// Connection to a gateway Admin API
///
/// Cloning is cheap and shares the child cache and the connection pool.
#[derive(Clone, Debug)]
pub struct Gateway {
    pub(crate) inner: Arc<GatewayInner>,
}

impl Gateway {
    /// Connect to the Admin API at `scheme://host:port`
    pub fn new(scheme: &str, host: &str, port: u16) -> Result<Self> {
        Self::with_transport(scheme, host, port, HttpTransport::new()?)
    }

    /// Connect with a caller-provided transport
    pub fn with_transport(
        scheme: &str,
        host: &str,
        port: u16,
        transport: HttpTransport,
    ) -> Result<Self> {
        let origin = url::origin(scheme, host, Some(port))?;
        Ok(Self::build(origin.as_str(), transport))
    }

    /// Connect to an Admin API given as one address, keeping any path prefix
    pub fn from_url(address: &str) -> Result<Self> {
        Self::from_url_with_transport(address, HttpTransport::new()?)
    }

    pub fn from_url_with_transport(address: &str, transport: HttpTransport) -> Result<Self> {
        let parts = url::decompose(address)?;
        let base = url::compose(&parts.scheme, &parts.host, parts.port, &parts.path)?;
        Ok(Self::build(&base, transport))
    }

    fn build(base: &str, transport: HttpTransport) -> Self {
        let base_url = base.trim_end_matches('/').to_string();
        tracing::debug!("gateway at {}", base_url);

        let inner = Arc::new_cyclic(|root| GatewayInner {
            context: Context {
                transport,
                root: root.clone(),
                base_url: Arc::from(base_url.as_str()),
            },
            base_url,
            children: ChildCache::default(),
        });
        Self { inner }
    }

    /// Base address, without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// The root's detail endpoint is its base address
    pub fn detail_endpoint(&self) -> String {
        self.inner.base_url.clone()
    }

    /// Locally cached top-level resources
    pub fn cache(&self) -> &ChildCache {
        &self.inner.children
    }

    /// Node information (version, plugins, configuration)
    pub async fn info(&self) -> Result<Value> {
        self.inner.context.transport.get(self.base_url()).await
    }

    /// Server and database status
    pub async fn status(&self) -> Result<Value> {
        let url = format!("{}/status", self.base_url());
        self.inner.context.transport.get(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_has_no_trailing_slash() {
        let gateway = Gateway::new("http", "localhost", 8001).unwrap();
        assert_eq!(gateway.base_url(), "http://localhost:8001");
        assert_eq!(gateway.detail_endpoint(), "http://localhost:8001");
    }

    #[test]
    fn test_default_port_is_dropped() {
        let gateway = Gateway::new("https", "kong.internal", 443).unwrap();
        assert_eq!(gateway.base_url(), "https://kong.internal");
    }

    #[test]
    fn test_from_url_keeps_prefix() {
        let gateway = Gateway::from_url("http://edge:8001/admin/").unwrap();
        assert_eq!(gateway.base_url(), "http://edge:8001/admin");
    }

    #[test]
    fn test_invalid_address() {
        tokio_test::assert_err!(Gateway::from_url("localhost"));
        tokio_test::assert_err!(Gateway::new("http", "", 8001));
    }

    #[test]
    fn test_context_reaches_root() {
        let gateway = Gateway::new("http", "localhost", 8001).unwrap();
        let root = gateway.inner.context.gateway().unwrap();
        assert!(Arc::ptr_eq(&root.inner, &gateway.inner));
    }
}
